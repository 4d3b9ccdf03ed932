use effects::EffectId;

use crate::types::{LogicalSize, PixelSize, SurfaceId};

/// A host-owned region that can display one effect.
pub trait DrawingSurface {
    fn id(&self) -> SurfaceId;
    /// Effect token the host asked for, if any.
    fn requested_effect(&self) -> Option<EffectId>;
    fn layout_size(&self) -> LogicalSize;
    fn device_pixel_ratio(&self) -> f64;
    /// False once the host has detached or closed the surface.
    fn is_attached(&self) -> bool;
    fn backing_size(&self) -> PixelSize;
    fn set_backing_size(&mut self, size: PixelSize);

    fn pixel_size(&self) -> PixelSize {
        PixelSize::from_layout(self.layout_size(), self.device_pixel_ratio())
    }
}

/// Enumerates the surfaces that want an effect attached.
pub trait SurfaceProvider {
    type Surface: DrawingSurface;

    fn discover(&mut self) -> Vec<Self::Surface>;
}
