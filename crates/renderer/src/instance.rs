//! One surface, one effect, and the backend resources drawing it.

use std::time::Duration;

use effects::Effect;
use scheduler::{FrameHandle, FrameId};

use crate::backend::{GraphicsBackend, GraphicsContext};
use crate::error::BackendError;
use crate::surface::DrawingSurface;
use crate::types::{InstanceId, PixelSize, Uniforms};

type Bundle<B> = <<B as GraphicsBackend>::Context as GraphicsContext>::Bundle;

pub struct RenderingInstance<B: GraphicsBackend> {
    id: InstanceId,
    effect: Effect,
    surface: B::Surface,
    pub(crate) uniforms: Uniforms,
    pub(crate) context: B::Context,
    pub(crate) bundle: Bundle<B>,
    animation: Option<FrameHandle>,
    created_at: Duration,
    /// Layout size last handed to the context, before any backend clamp.
    pub(crate) requested: PixelSize,
    pub(crate) last_elapsed: Option<Duration>,
    pub(crate) frames_drawn: u64,
}

impl<B: GraphicsBackend> RenderingInstance<B> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        id: InstanceId,
        effect: Effect,
        surface: B::Surface,
        requested: PixelSize,
        uniforms: Uniforms,
        context: B::Context,
        bundle: Bundle<B>,
        created_at: Duration,
    ) -> Self {
        Self {
            id,
            effect,
            surface,
            requested,
            uniforms,
            context,
            bundle,
            animation: None,
            created_at,
            last_elapsed: None,
            frames_drawn: 0,
        }
    }

    pub fn id(&self) -> &InstanceId {
        &self.id
    }

    pub fn effect(&self) -> Effect {
        self.effect
    }

    pub fn surface(&self) -> &B::Surface {
        &self.surface
    }

    pub(crate) fn surface_mut(&mut self) -> &mut B::Surface {
        &mut self.surface
    }

    pub fn uniforms(&self) -> Uniforms {
        self.uniforms
    }

    pub fn created_at(&self) -> Duration {
        self.created_at
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    pub fn animation_id(&self) -> Option<FrameId> {
        self.animation.as_ref().map(FrameHandle::id)
    }

    pub(crate) fn start_animation(&mut self, handle: FrameHandle) {
        self.animation = Some(handle);
    }

    pub(crate) fn take_animation(&mut self) -> Option<FrameHandle> {
        self.animation.take()
    }

    /// Pixel size the surface currently asks for.
    pub fn target_size(&self) -> PixelSize {
        self.surface.pixel_size()
    }

    /// Releases the bundle, then the context. Callers must cancel the
    /// animation first.
    pub(crate) fn release(self) -> Result<(), BackendError> {
        let Self {
            mut context,
            bundle,
            ..
        } = self;
        let bundle_result = context.release_bundle(bundle);
        let context_result = context.release();
        bundle_result.and(context_result)
    }
}
