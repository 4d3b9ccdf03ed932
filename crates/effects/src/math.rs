//! Scalar helpers shared by the CPU evaluators.
//!
//! Every helper mirrors the GLSL builtin of the same name so the Rust
//! evaluators and the fragment programs in `shaders/` stay in lock-step.

use glam::{Vec2, Vec3};

/// GLSL `fract`: `x - floor(x)`, always in `[0, 1)`.
pub(crate) fn fract(x: f32) -> f32 {
    x - x.floor()
}

pub(crate) fn fract2(v: Vec2) -> Vec2 {
    v - v.floor()
}

/// GLSL `mod`, which keeps the sign of the divisor.
pub(crate) fn modulo(x: f32, y: f32) -> f32 {
    x - y * (x / y).floor()
}

pub(crate) fn mix(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

pub(crate) fn mix3(a: Vec3, b: Vec3, t: f32) -> Vec3 {
    a + (b - a) * t
}

/// Hermite threshold. Reversed edges (`edge0 > edge1`) invert the ramp, as in GLSL.
pub(crate) fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// GLSL `step`.
pub(crate) fn step(edge: f32, x: f32) -> f32 {
    if x < edge {
        0.0
    } else {
        1.0
    }
}

/// Classic `fract(sin(dot(...)))` hash used for per-cell randomness.
pub(crate) fn hash12(p: Vec2) -> f32 {
    fract(p.dot(Vec2::new(12.9898, 78.233)).sin() * 43758.547)
}

/// Lattice hash for the noise fields (plasma, flux).
pub(crate) fn lattice_hash(p: Vec2) -> f32 {
    fract(p.dot(Vec2::new(127.1, 311.7)).sin() * 43758.547)
}

/// Volumetric hash used as micro-texture on the raymarched surface.
pub(crate) fn hash13(p: Vec3) -> f32 {
    fract(p.dot(Vec3::new(127.1, 311.7, 74.7)).sin() * 43758.547)
}

/// Value noise: bilinear blend of lattice hashes with Hermite `3t² - 2t³` weights.
pub(crate) fn value_noise(st: Vec2, hash: fn(Vec2) -> f32) -> f32 {
    let cell = st.floor();
    let f = fract2(st);

    let a = hash(cell);
    let b = hash(cell + Vec2::new(1.0, 0.0));
    let c = hash(cell + Vec2::new(0.0, 1.0));
    let d = hash(cell + Vec2::new(1.0, 1.0));

    let u = f * f * (Vec2::splat(3.0) - 2.0 * f);
    mix(a, b, u.x) + (c - a) * u.y * (1.0 - u.x) + (d - b) * u.x * u.y
}

/// Standard HSV to RGB conversion with all channels in `[0, 1]`.
pub(crate) fn hsv_to_rgb(hue: f32, saturation: f32, value: f32) -> Vec3 {
    let k = [1.0_f32, 2.0 / 3.0, 1.0 / 3.0];
    let channel = |offset: f32| {
        let p = (fract(hue + offset) * 6.0 - 3.0).abs();
        mix(1.0, (p - 1.0).clamp(0.0, 1.0), saturation)
    };
    value * Vec3::new(channel(k[0]), channel(k[1]), channel(k[2]))
}
