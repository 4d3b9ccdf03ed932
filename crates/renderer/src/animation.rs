//! Per-instance frame step: elapsed time → `uniforms.time` → one draw.
//!
//! Rescheduling is the manager's job; this module only decides what a frame
//! does to a single instance.

use std::time::Duration;

use crate::backend::{GraphicsBackend, GraphicsContext};
use crate::error::BackendError;
use crate::instance::RenderingInstance;

#[derive(Debug)]
pub enum FrameOutcome {
    /// Time advanced and one draw was submitted.
    Drawn { time: f32 },
    /// The clock has not moved past the last written time; nothing written.
    Stalled { time: f32 },
    /// Time advanced but the draw was skipped because resources are gone.
    Skipped { time: f32, reason: SkipReason },
    /// The frame did not belong to any live animation.
    Ignored,
}

#[derive(Debug)]
pub enum SkipReason {
    ContextUnavailable,
    Render(BackendError),
}

impl SkipReason {
    pub fn describe(&self) -> String {
        match self {
            SkipReason::ContextUnavailable => "context unavailable".to_string(),
            SkipReason::Render(err) => err.to_string(),
        }
    }
}

pub(crate) fn step<B: GraphicsBackend>(
    instance: &mut RenderingInstance<B>,
    now: Duration,
) -> FrameOutcome {
    let elapsed = now.saturating_sub(instance.created_at());
    let time = elapsed.as_secs_f32();

    // Compared on the clock reading; `time` loses sub-frame precision after
    // a few days of uptime.
    if instance.last_elapsed.is_some_and(|last| elapsed <= last) {
        return FrameOutcome::Stalled { time };
    }
    instance.uniforms.time = time;
    instance.last_elapsed = Some(elapsed);

    if !instance.context.is_available() {
        return FrameOutcome::Skipped {
            time,
            reason: SkipReason::ContextUnavailable,
        };
    }

    let uniforms = instance.uniforms;
    match instance.context.render(&mut instance.bundle, &uniforms) {
        Ok(()) => {
            instance.frames_drawn += 1;
            tracing::trace!(instance = %instance.id(), time, "frame drawn");
            FrameOutcome::Drawn { time }
        }
        Err(err) => FrameOutcome::Skipped {
            time,
            reason: SkipReason::Render(err),
        },
    }
}
