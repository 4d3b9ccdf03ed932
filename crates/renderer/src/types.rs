use std::fmt;

use effects::{EffectId, Vec2};

/// Size in layout (device-independent) units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogicalSize {
    pub width: f64,
    pub height: f64,
}

impl LogicalSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Size in physical pixels. Both dimensions are at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelSize {
    pub width: u32,
    pub height: u32,
}

impl PixelSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    /// Layout size × device pixel ratio, rounded, never below one pixel.
    pub fn from_layout(layout: LogicalSize, device_pixel_ratio: f64) -> Self {
        let scale = |extent: f64| {
            let pixels = (extent * device_pixel_ratio).round();
            if pixels.is_finite() && pixels >= 1.0 {
                pixels.min(u32::MAX as f64) as u32
            } else {
                1
            }
        };
        Self::new(scale(layout.width), scale(layout.height))
    }

    pub fn as_vec2(self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }
}

impl fmt::Display for PixelSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Stable identity of a drawing surface supplied by the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(pub String);

impl SurfaceId {
    pub fn new(id: impl Into<String>) -> Self {
        SurfaceId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Key of a live instance: the surface plus the effect token it requested.
///
/// Displayed as `<surface>-<effect>`. Equality is structural, so
/// `("a-b", "c")` and `("a", "b-c")` stay distinct even though they print
/// the same.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId {
    surface: SurfaceId,
    effect: EffectId,
}

impl InstanceId {
    pub fn new(surface: SurfaceId, effect: impl Into<EffectId>) -> Self {
        Self {
            surface,
            effect: effect.into(),
        }
    }

    pub fn surface(&self) -> &SurfaceId {
        &self.surface
    }

    /// Effect token as requested, before fallback.
    pub fn effect(&self) -> &EffectId {
        &self.effect
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.surface, self.effect)
    }
}

/// Per-instance values fed to the effect program every draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Uniforms {
    /// Seconds since the instance was created.
    pub time: f32,
    /// Backing size of the surface in physical pixels.
    pub resolution: PixelSize,
}

impl Uniforms {
    pub fn new(resolution: PixelSize) -> Self {
        Self {
            time: 0.0,
            resolution,
        }
    }
}
