//! CPU backend: evaluates effects pixel by pixel into RGBA buffers.
//!
//! Every context publishes its latest frame into a sink shared with the
//! backend, so callers can read frames back after the manager has drawn them.
//! Releasing a context drops its frame from the sink.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use effects::{EffectId, EffectKind, Vec2};
use image::RgbaImage;

use crate::backend::{GraphicsBackend, GraphicsContext};
use crate::compile::ShaderProgram;
use crate::error::BackendError;
use crate::surface::{DrawingSurface, SurfaceProvider};
use crate::types::{LogicalSize, PixelSize, SurfaceId, Uniforms};

/// Headless surface with a host-controlled layout.
#[derive(Debug, Clone)]
pub struct OffscreenSurface {
    id: SurfaceId,
    effect: Option<EffectId>,
    layout: LogicalSize,
    device_pixel_ratio: f64,
    attached: bool,
    backing: PixelSize,
}

impl OffscreenSurface {
    pub fn new(id: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            id: SurfaceId::new(id),
            effect: None,
            layout: LogicalSize::new(width, height),
            device_pixel_ratio: 1.0,
            attached: true,
            backing: PixelSize::new(1, 1),
        }
    }

    pub fn with_effect(mut self, effect: impl Into<EffectId>) -> Self {
        self.effect = Some(effect.into());
        self
    }

    pub fn with_device_pixel_ratio(mut self, ratio: f64) -> Self {
        self.device_pixel_ratio = ratio;
        self
    }

    pub fn detached(mut self) -> Self {
        self.attached = false;
        self
    }

    pub fn set_layout_size(&mut self, width: f64, height: f64) {
        self.layout = LogicalSize::new(width, height);
    }

    pub fn set_device_pixel_ratio(&mut self, ratio: f64) {
        self.device_pixel_ratio = ratio;
    }
}

impl DrawingSurface for OffscreenSurface {
    fn id(&self) -> SurfaceId {
        self.id.clone()
    }

    fn requested_effect(&self) -> Option<EffectId> {
        self.effect.clone()
    }

    fn layout_size(&self) -> LogicalSize {
        self.layout
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.device_pixel_ratio
    }

    fn is_attached(&self) -> bool {
        self.attached
    }

    fn backing_size(&self) -> PixelSize {
        self.backing
    }

    fn set_backing_size(&mut self, size: PixelSize) {
        self.backing = size;
    }
}

/// Fixed list of offscreen surfaces, handed out once.
#[derive(Debug, Default)]
pub struct OffscreenProvider {
    surfaces: Vec<OffscreenSurface>,
}

impl OffscreenProvider {
    pub fn new(surfaces: Vec<OffscreenSurface>) -> Self {
        Self { surfaces }
    }
}

impl SurfaceProvider for OffscreenProvider {
    type Surface = OffscreenSurface;

    fn discover(&mut self) -> Vec<OffscreenSurface> {
        std::mem::take(&mut self.surfaces)
    }
}

type FrameSink = Arc<Mutex<HashMap<SurfaceId, RgbaImage>>>;

#[derive(Debug, Default, Clone)]
pub struct SoftwareBackend {
    frames: FrameSink,
}

impl SoftwareBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent frame drawn for `surface`, if any.
    pub fn latest_frame(&self, surface: &SurfaceId) -> Option<RgbaImage> {
        let frames = self.frames.lock().ok()?;
        frames.get(surface).cloned()
    }
}

impl GraphicsBackend for SoftwareBackend {
    type Surface = OffscreenSurface;
    type Context = SoftwareContext;

    fn create_context(&mut self, surface: &OffscreenSurface) -> Result<SoftwareContext, BackendError> {
        Ok(SoftwareContext {
            surface: surface.id(),
            size: surface.backing_size(),
            frames: Arc::clone(&self.frames),
        })
    }
}

pub struct SoftwareContext {
    surface: SurfaceId,
    size: PixelSize,
    frames: FrameSink,
}

#[derive(Debug)]
pub struct SoftwareBundle {
    effect: EffectKind,
}

impl SoftwareBundle {
    pub fn effect(&self) -> EffectKind {
        self.effect
    }
}

impl GraphicsContext for SoftwareContext {
    type Bundle = SoftwareBundle;

    fn set_size(&mut self, size: PixelSize) -> PixelSize {
        self.size = size;
        size
    }

    fn allocate(
        &mut self,
        program: &ShaderProgram,
        _uniforms: &Uniforms,
    ) -> Result<SoftwareBundle, BackendError> {
        Ok(SoftwareBundle {
            effect: program.effect,
        })
    }

    fn render(&mut self, bundle: &mut SoftwareBundle, uniforms: &Uniforms) -> Result<(), BackendError> {
        let image = rasterise(bundle.effect, self.size, uniforms);
        let mut frames = self
            .frames
            .lock()
            .map_err(|_| BackendError::ContextUnavailable("frame sink poisoned".into()))?;
        frames.insert(self.surface.clone(), image);
        Ok(())
    }

    fn release_bundle(&mut self, _bundle: SoftwareBundle) -> Result<(), BackendError> {
        Ok(())
    }

    fn release(self) -> Result<(), BackendError> {
        let mut frames = self
            .frames
            .lock()
            .map_err(|_| BackendError::ContextUnavailable("frame sink poisoned".into()))?;
        frames.remove(&self.surface);
        Ok(())
    }
}

/// Evaluates `effect` for every pixel centre. Row zero is the top of the
/// image, where `uv.y` is one.
pub fn rasterise(effect: EffectKind, size: PixelSize, uniforms: &Uniforms) -> RgbaImage {
    let resolution = uniforms.resolution.as_vec2();
    let (width, height) = (size.width as f32, size.height as f32);
    RgbaImage::from_fn(size.width, size.height, |x, y| {
        let uv = Vec2::new(
            (x as f32 + 0.5) / width,
            1.0 - (y as f32 + 0.5) / height,
        );
        image::Rgba(effect.evaluate(uv, uniforms.time, resolution).to_rgba8())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rasterise_matches_requested_size() {
        let size = PixelSize::new(8, 4);
        let image = rasterise(EffectKind::PulseGrid, size, &Uniforms::new(size));
        assert_eq!(image.dimensions(), (8, 4));
        assert!(image.pixels().all(|pixel| pixel[3] == 255));
    }

    #[test]
    fn rasterise_is_deterministic() {
        let size = PixelSize::new(6, 6);
        let uniforms = Uniforms {
            time: 1.25,
            resolution: size,
        };
        let first = rasterise(EffectKind::NeonGenesis, size, &uniforms);
        let second = rasterise(EffectKind::NeonGenesis, size, &uniforms);
        assert_eq!(first, second);
    }

    #[test]
    fn provider_hands_out_surfaces_once() {
        let mut provider = OffscreenProvider::new(vec![OffscreenSurface::new("a", 4.0, 4.0)]);
        assert_eq!(provider.discover().len(), 1);
        assert!(provider.discover().is_empty());
    }
}
