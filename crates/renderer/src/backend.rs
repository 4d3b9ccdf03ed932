use crate::compile::ShaderProgram;
use crate::error::BackendError;
use crate::surface::DrawingSurface;
use crate::types::{PixelSize, Uniforms};

/// Factory for per-surface graphics contexts.
pub trait GraphicsBackend {
    type Surface: DrawingSurface;
    type Context: GraphicsContext;

    fn create_context(&mut self, surface: &Self::Surface) -> Result<Self::Context, BackendError>;
}

/// Device handle owned by exactly one instance.
pub trait GraphicsContext {
    /// Scene, camera and material for one effect.
    type Bundle;

    /// Resizes the drawing buffer and returns the size actually applied.
    /// Backends with a size limit clamp to it.
    fn set_size(&mut self, size: PixelSize) -> PixelSize;

    fn allocate(
        &mut self,
        program: &ShaderProgram,
        uniforms: &Uniforms,
    ) -> Result<Self::Bundle, BackendError>;

    fn render(&mut self, bundle: &mut Self::Bundle, uniforms: &Uniforms) -> Result<(), BackendError>;

    fn release_bundle(&mut self, bundle: Self::Bundle) -> Result<(), BackendError>;

    /// Consumes the context, freeing the device.
    fn release(self) -> Result<(), BackendError>;

    /// False when the device is gone and draws must be skipped.
    fn is_available(&self) -> bool {
        true
    }
}
