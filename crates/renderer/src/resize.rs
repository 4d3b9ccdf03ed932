use crate::backend::{GraphicsBackend, GraphicsContext};
use crate::instance::RenderingInstance;
use crate::surface::DrawingSurface;
use crate::types::PixelSize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeOutcome {
    Unchanged,
    Resized { from: PixelSize, to: PixelSize },
}

/// Brings backing size, context size and `resolution` in line with the
/// surface's current layout. Does nothing when the layout asks for the same
/// pixel size as last time.
///
/// Backing size and `resolution` take the size the context applied, which
/// may be smaller than the layout asks for.
pub(crate) fn reconcile<B: GraphicsBackend>(instance: &mut RenderingInstance<B>) -> ResizeOutcome {
    let target = instance.target_size();
    if target == instance.requested {
        return ResizeOutcome::Unchanged;
    }
    instance.requested = target;

    let from = instance.uniforms.resolution;
    let to = instance.context.set_size(target);
    if to == from {
        return ResizeOutcome::Unchanged;
    }
    instance.surface_mut().set_backing_size(to);
    instance.uniforms.resolution = to;
    ResizeOutcome::Resized { from, to }
}
