//! Lifecycle façade over the instance directory.
//!
//! ```text
//!   create_instance ──▶ context ──▶ set_size ──▶ allocate ──▶ directory ──▶ request_frame
//!   frame(id)       ──▶ animation::step ──▶ request_frame
//!   resize_all      ──▶ resize::reconcile (per instance)
//!   destroy_all     ──▶ cancel every frame ──▶ release every instance ──▶ clear
//! ```

use effects::EffectId;
use scheduler::{FrameId, FrameScheduler};

use crate::animation::{self, FrameOutcome};
use crate::backend::{GraphicsBackend, GraphicsContext};
use crate::compile::ShaderProgram;
use crate::directory::InstanceDirectory;
use crate::error::LifecycleError;
use crate::instance::RenderingInstance;
use crate::observer::{LifecycleEvent, LifecycleObserver, TracingObserver};
use crate::resize::{self, ResizeOutcome};
use crate::runtime::{BoxedClock, Clock};
use crate::surface::{DrawingSurface, SurfaceProvider};
use crate::types::{InstanceId, SurfaceId, Uniforms};

/// Outcome of attaching one discovered surface.
pub type Attachment = (SurfaceId, Result<InstanceId, LifecycleError>);

pub struct LifecycleManager<B, S>
where
    B: GraphicsBackend,
    S: FrameScheduler<InstanceId>,
{
    backend: B,
    scheduler: S,
    clock: BoxedClock,
    observer: Box<dyn LifecycleObserver>,
    directory: InstanceDirectory<B>,
}

impl<B, S> LifecycleManager<B, S>
where
    B: GraphicsBackend,
    S: FrameScheduler<InstanceId>,
{
    pub fn new(backend: B, scheduler: S, clock: impl Clock + 'static) -> Self {
        Self::with_observer(backend, scheduler, clock, TracingObserver)
    }

    pub fn with_observer(
        backend: B,
        scheduler: S,
        clock: impl Clock + 'static,
        observer: impl LifecycleObserver + 'static,
    ) -> Self {
        Self {
            backend,
            scheduler,
            clock: Box::new(clock),
            observer: Box::new(observer),
            directory: InstanceDirectory::new(),
        }
    }

    /// Builds the rendering pipeline for `surface` and starts its animation.
    ///
    /// Unknown effect tokens bind the default effect. A duplicate id is
    /// rejected before any backend resource is acquired.
    pub fn create_instance(
        &mut self,
        mut surface: B::Surface,
        effect_id: impl Into<EffectId>,
    ) -> Result<InstanceId, LifecycleError> {
        let effect_id = effect_id.into();
        let surface_id = surface.id();
        if !surface.is_attached() {
            return Err(LifecycleError::SurfaceUnavailable {
                surface: surface_id,
                reason: "surface is not attached".into(),
            });
        }

        let effect = effects::lookup(&effect_id);
        let size = surface.pixel_size();
        let id = InstanceId::new(surface_id.clone(), effect_id);
        if self.directory.contains(&id) {
            return Err(LifecycleError::DuplicateInstance(id));
        }

        let mut context = self.backend.create_context(&surface).map_err(|err| {
            LifecycleError::SurfaceUnavailable {
                surface: surface_id.clone(),
                reason: err.to_string(),
            }
        })?;
        let applied = context.set_size(size);
        surface.set_backing_size(applied);

        let uniforms = Uniforms::new(applied);
        let program = ShaderProgram::for_effect(effect.kind());
        let bundle = match context.allocate(&program, &uniforms) {
            Ok(bundle) => bundle,
            Err(err) => {
                if let Err(release_err) = context.release() {
                    tracing::warn!(surface = %surface_id, error = %release_err, "failed to release context after allocation failure");
                }
                return Err(LifecycleError::SurfaceUnavailable {
                    surface: surface_id,
                    reason: err.to_string(),
                });
            }
        };

        let created_at = self.clock.now();
        let instance = RenderingInstance::new(
            id.clone(),
            effect,
            surface,
            size,
            uniforms,
            context,
            bundle,
            created_at,
        );
        let instance = match self.directory.insert(instance) {
            Ok(instance) => instance,
            Err(rejected) => {
                // Checked above; only reachable if the directory changed underneath us.
                if let Err(err) = rejected.release() {
                    tracing::warn!(instance = %id, error = %err, "failed to release rejected instance");
                }
                return Err(LifecycleError::DuplicateInstance(id));
            }
        };
        let handle = self.scheduler.request_frame(&id);
        instance.start_animation(handle);

        self.observer.on_event(&LifecycleEvent::Created {
            id: &id,
            effect: effect.kind(),
            size: applied,
        });
        if effect.is_fallback() {
            self.observer.on_event(&LifecycleEvent::EffectFallback {
                id: &id,
                requested: id.effect().as_str(),
                bound: effect.kind(),
            });
        }
        Ok(id)
    }

    /// Creates one instance per discovered surface, using each surface's
    /// requested effect. Failures are reported per surface and do not stop
    /// the remaining attachments.
    pub fn attach_discovered<P>(&mut self, provider: &mut P) -> Vec<Attachment>
    where
        P: SurfaceProvider<Surface = B::Surface>,
    {
        provider
            .discover()
            .into_iter()
            .map(|surface| {
                let surface_id = surface.id();
                let effect_id = surface.requested_effect().unwrap_or_default();
                let result = self.create_instance(surface, effect_id);
                if let Err(err) = &result {
                    tracing::warn!(surface = %surface_id, error = %err, "failed to attach surface");
                }
                (surface_id, result)
            })
            .collect()
    }

    /// Delivers one frame. Frames that do not match a live animation handle
    /// are ignored and schedule nothing.
    pub fn frame(&mut self, frame: FrameId) -> FrameOutcome {
        let now = self.clock.now();
        let Some(instance) = self.directory.find_by_frame(frame) else {
            tracing::trace!(%frame, "frame for unknown or cancelled handle");
            return FrameOutcome::Ignored;
        };

        // The delivered handle is spent; the loop continues on a fresh one.
        let _spent = instance.take_animation();
        let outcome = animation::step(instance, now);
        let next = self.scheduler.request_frame(instance.id());
        instance.start_animation(next);

        match &outcome {
            FrameOutcome::Skipped { reason, .. } => {
                let reason = reason.describe();
                self.observer.on_event(&LifecycleEvent::FrameSkipped {
                    id: instance.id(),
                    reason: &reason,
                });
            }
            FrameOutcome::Stalled { time } => {
                tracing::trace!(instance = %instance.id(), time, "clock did not advance; frame stalled");
            }
            FrameOutcome::Drawn { .. } | FrameOutcome::Ignored => {}
        }
        outcome
    }

    /// Reconciles every instance with its surface's current pixel size.
    /// Returns how many instances changed.
    pub fn resize_all(&mut self) -> usize {
        let mut resized = 0;
        for instance in self.directory.iter_mut() {
            if let ResizeOutcome::Resized { from, to } = resize::reconcile(instance) {
                resized += 1;
                self.observer.on_event(&LifecycleEvent::Resized {
                    id: instance.id(),
                    from,
                    to,
                });
            }
        }
        resized
    }

    /// Stops every animation, then releases every instance, then empties the
    /// directory. Release failures are logged and do not stop the sweep.
    pub fn destroy_all(&mut self) {
        if self.directory.is_empty() {
            return;
        }

        for instance in self.directory.iter_mut() {
            if let Some(handle) = instance.take_animation() {
                self.scheduler.cancel_frame(handle);
            }
        }

        let instances = self.directory.drain();
        let count = instances.len();
        for instance in instances {
            let id = instance.id().clone();
            if let Err(err) = instance.release() {
                self.observer.on_event(&LifecycleEvent::ReleaseFailed {
                    id: &id,
                    error: &err,
                });
            }
        }

        self.observer
            .on_event(&LifecycleEvent::TornDown { instances: count });
    }

    pub fn len(&self) -> usize {
        self.directory.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directory.is_empty()
    }

    pub fn instance(&self, id: &InstanceId) -> Option<&RenderingInstance<B>> {
        self.directory.get(id)
    }

    pub fn instance_ids(&self) -> Vec<InstanceId> {
        self.directory.ids()
    }

    /// Mutable access so hosts can update a surface's layout before
    /// calling [`resize_all`](Self::resize_all).
    pub fn surface_mut(&mut self, id: &InstanceId) -> Option<&mut B::Surface> {
        self.directory
            .get_mut(id)
            .map(|instance| instance.surface_mut())
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }
}

impl<B, S> Drop for LifecycleManager<B, S>
where
    B: GraphicsBackend,
    S: FrameScheduler<InstanceId>,
{
    fn drop(&mut self) {
        self.destroy_all();
    }
}
