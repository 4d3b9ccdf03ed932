use effects::EffectKind;

use crate::error::BackendError;
use crate::types::{InstanceId, PixelSize};

/// Notable lifecycle transitions. Observers are informational only; the
/// manager never changes behaviour based on them.
#[derive(Debug)]
pub enum LifecycleEvent<'a> {
    Created {
        id: &'a InstanceId,
        effect: EffectKind,
        size: PixelSize,
    },
    EffectFallback {
        id: &'a InstanceId,
        requested: &'a str,
        bound: EffectKind,
    },
    Resized {
        id: &'a InstanceId,
        from: PixelSize,
        to: PixelSize,
    },
    FrameSkipped {
        id: &'a InstanceId,
        reason: &'a str,
    },
    ReleaseFailed {
        id: &'a InstanceId,
        error: &'a BackendError,
    },
    TornDown {
        instances: usize,
    },
}

pub trait LifecycleObserver {
    fn on_event(&mut self, event: &LifecycleEvent<'_>);
}

/// Default observer: forwards every event to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl LifecycleObserver for TracingObserver {
    fn on_event(&mut self, event: &LifecycleEvent<'_>) {
        match event {
            LifecycleEvent::Created { id, effect, size } => {
                tracing::info!(instance = %id, effect = %effect, width = size.width, height = size.height, "instance created");
            }
            LifecycleEvent::EffectFallback {
                id,
                requested,
                bound,
            } => {
                tracing::warn!(instance = %id, requested, bound = %bound, "unknown effect; using default");
            }
            LifecycleEvent::Resized { id, from, to } => {
                tracing::debug!(instance = %id, from = %from, to = %to, "instance resized");
            }
            LifecycleEvent::FrameSkipped { id, reason } => {
                tracing::debug!(instance = %id, reason, "frame skipped");
            }
            LifecycleEvent::ReleaseFailed { id, error } => {
                tracing::warn!(instance = %id, %error, "failed to release instance resources");
            }
            LifecycleEvent::TornDown { instances } => {
                tracing::info!(instances, "all instances destroyed");
            }
        }
    }
}
