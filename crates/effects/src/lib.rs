//! Procedural effect catalogue.
//!
//! Every effect is a pure colour function of a normalised coordinate, the
//! seconds elapsed since its instance started, and the surface resolution.
//! Each one ships twice: as a Rust evaluator (used by the software backend and
//! the tests) and as a GLSL fragment body handed to GPU backends as an opaque
//! program payload.
//!
//! ```text
//!   "plasma-storm" ──lookup()──▶ Effect { kind: PlasmaStorm, fallback: false }
//!   "nonsense"     ──lookup()──▶ Effect { kind: LiquidMetal, fallback: true }
//! ```

mod chrome;
mod field;
mod fluid;
mod math;
mod patterns;
mod program;
mod raymarch;
mod typography;

use std::fmt;

pub use glam::{Vec2, Vec3};
pub use program::COMMON as SHADER_COMMON;
use serde::{Deserialize, Serialize};

/// Effect used whenever a requested token is not recognised.
pub const DEFAULT_EFFECT: EffectKind = EffectKind::LiquidMetal;

/// Symbolic effect token as requested by a surface (`data-shader` style).
///
/// Surrounding whitespace is dropped on construction, so two ids name the
/// same effect exactly when their tokens compare equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(from = "String")]
pub struct EffectId(String);

impl EffectId {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        if id.trim().len() == id.len() {
            EffectId(id)
        } else {
            EffectId(id.trim().to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for EffectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for EffectId {
    fn from(id: String) -> Self {
        EffectId::new(id)
    }
}

impl From<&str> for EffectId {
    fn from(id: &str) -> Self {
        EffectId::new(id)
    }
}

impl From<EffectKind> for EffectId {
    fn from(kind: EffectKind) -> Self {
        EffectId(kind.token().to_string())
    }
}

impl PartialEq<str> for EffectId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for EffectId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl fmt::Display for EffectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Algorithmic family an effect belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EffectFamily {
    /// Signed-distance surface found by marching view rays.
    Raymarch,
    /// Summed sinusoidal fields and value noise.
    NoiseField,
    /// Periodic grids, spirals and dot screens.
    Pattern,
    /// Samples advected through a velocity field.
    Advection,
    /// 2D signed-distance shapes.
    SignedDistance,
}

/// Closed set of effects known to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EffectKind {
    LiquidMetal,
    GeometricSpiral,
    PulseGrid,
    MorseMatrix,
    PlasmaStorm,
    FluidDynamics,
    TypographyMorph,
    ChromeLiquid,
    NeonGenesis,
    QuantumFlux,
}

impl EffectKind {
    pub const ALL: [EffectKind; 10] = [
        EffectKind::LiquidMetal,
        EffectKind::GeometricSpiral,
        EffectKind::PulseGrid,
        EffectKind::MorseMatrix,
        EffectKind::PlasmaStorm,
        EffectKind::FluidDynamics,
        EffectKind::TypographyMorph,
        EffectKind::ChromeLiquid,
        EffectKind::NeonGenesis,
        EffectKind::QuantumFlux,
    ];

    pub fn token(self) -> &'static str {
        match self {
            EffectKind::LiquidMetal => "liquid-metal",
            EffectKind::GeometricSpiral => "geometric-spiral",
            EffectKind::PulseGrid => "pulse-grid",
            EffectKind::MorseMatrix => "morse-matrix",
            EffectKind::PlasmaStorm => "plasma-storm",
            EffectKind::FluidDynamics => "fluid-dynamics",
            EffectKind::TypographyMorph => "typography-morph",
            EffectKind::ChromeLiquid => "chrome-liquid",
            EffectKind::NeonGenesis => "neon-genesis",
            EffectKind::QuantumFlux => "quantum-flux",
        }
    }

    /// Exact (trimmed) token match; `None` for anything unrecognised.
    pub fn from_token(token: &str) -> Option<Self> {
        let token = token.trim();
        Self::ALL.into_iter().find(|kind| kind.token() == token)
    }

    pub fn family(self) -> EffectFamily {
        match self {
            EffectKind::LiquidMetal => EffectFamily::Raymarch,
            EffectKind::PlasmaStorm | EffectKind::QuantumFlux | EffectKind::ChromeLiquid => {
                EffectFamily::NoiseField
            }
            EffectKind::GeometricSpiral
            | EffectKind::PulseGrid
            | EffectKind::MorseMatrix
            | EffectKind::NeonGenesis => EffectFamily::Pattern,
            EffectKind::FluidDynamics => EffectFamily::Advection,
            EffectKind::TypographyMorph => EffectFamily::SignedDistance,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            EffectKind::LiquidMetal => "raymarched metallic blobs with near-miss glow",
            EffectKind::GeometricSpiral => "golden-ratio log spirals with radial pulses",
            EffectKind::PulseGrid => "layered grids with beat-synchronised cell pulses",
            EffectKind::MorseMatrix => "cascading dot/dash signal columns",
            EffectKind::PlasmaStorm => "electric field plasma with lightning cores",
            EffectKind::FluidDynamics => "density advected through moving vortices",
            EffectKind::TypographyMorph => "wobbling SDF letterforms",
            EffectKind::ChromeLiquid => "reflective liquid chrome bands",
            EffectKind::NeonGenesis => "drifting halftone dot screens",
            EffectKind::QuantumFlux => "layered flow noise",
        }
    }

    /// Evaluates the effect at `uv ∈ [0,1]²`, `time` seconds after start.
    pub fn evaluate(self, uv: Vec2, time: f32, resolution: Vec2) -> Rgb {
        let evaluator: fn(Vec2, f32, Vec2) -> Vec3 = match self {
            EffectKind::LiquidMetal => raymarch::liquid_metal,
            EffectKind::GeometricSpiral => patterns::geometric_spiral,
            EffectKind::PulseGrid => patterns::pulse_grid,
            EffectKind::MorseMatrix => patterns::morse_matrix,
            EffectKind::PlasmaStorm => field::plasma_storm,
            EffectKind::FluidDynamics => fluid::fluid_dynamics,
            EffectKind::TypographyMorph => typography::typography_morph,
            EffectKind::ChromeLiquid => chrome::chrome_liquid,
            EffectKind::NeonGenesis => patterns::neon_genesis,
            EffectKind::QuantumFlux => field::quantum_flux,
        };
        Rgb::from(evaluator(uv, time, resolution))
    }

    /// GLSL body defining `vec3 effect_color(vec2 uv)`.
    pub fn fragment_source(self) -> &'static str {
        program::fragment_body(self)
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Linear colour produced by an evaluator. Channels are not clamped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Quantises to 8-bit RGBA with an opaque alpha channel.
    pub fn to_rgba8(self) -> [u8; 4] {
        let quantise = |channel: f32| (channel.clamp(0.0, 1.0) * 255.0).round() as u8;
        [quantise(self.r), quantise(self.g), quantise(self.b), 255]
    }
}

impl From<Vec3> for Rgb {
    fn from(value: Vec3) -> Self {
        Self::new(value.x, value.y, value.z)
    }
}

/// Result of resolving an [`EffectId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Effect {
    kind: EffectKind,
    fallback: bool,
}

impl Effect {
    /// Token of the effect actually bound, which differs from the requested
    /// token on fallback.
    pub fn id(&self) -> &'static str {
        self.kind.token()
    }

    pub fn kind(&self) -> EffectKind {
        self.kind
    }

    /// True when the requested token was unknown and the default was bound.
    pub fn is_fallback(&self) -> bool {
        self.fallback
    }

    pub fn evaluate(&self, uv: Vec2, time: f32, resolution: Vec2) -> Rgb {
        self.kind.evaluate(uv, time, resolution)
    }

    pub fn fragment_source(&self) -> &'static str {
        self.kind.fragment_source()
    }
}

/// Resolves an effect token. Total: unknown tokens bind [`DEFAULT_EFFECT`].
pub fn lookup(id: impl AsRef<str>) -> Effect {
    let id = id.as_ref();
    match EffectKind::from_token(id) {
        Some(kind) => Effect {
            kind,
            fallback: false,
        },
        None => {
            tracing::debug!(requested = id, fallback = %DEFAULT_EFFECT, "unknown effect token");
            Effect {
                kind: DEFAULT_EFFECT,
                fallback: true,
            }
        }
    }
}

/// Serializable registry entry used by listings.
#[derive(Debug, Clone, Serialize)]
pub struct EffectInfo {
    pub token: &'static str,
    pub family: EffectFamily,
    pub description: &'static str,
    pub default: bool,
}

pub fn catalogue() -> Vec<EffectInfo> {
    EffectKind::ALL
        .into_iter()
        .map(|kind| EffectInfo {
            token: kind.token(),
            family: kind.family(),
            description: kind.description(),
            default: kind == DEFAULT_EFFECT,
        })
        .collect()
}
