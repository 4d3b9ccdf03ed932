//! Noise-field composites: plasma storm and quantum flux.

use glam::{Vec2, Vec3};

use crate::math::{hsv_to_rgb, lattice_hash, mix, smoothstep, value_noise};

const LIGHTNING_SOURCES: usize = 3;
const HOT_CORE_THRESHOLD: f32 = 0.8;

fn noise(st: Vec2) -> f32 {
    value_noise(st, lattice_hash)
}

/// Scalar plasma intensity before colour mapping, plus the lightning term
/// that is also added back as glow.
pub(crate) fn plasma_intensity(st: Vec2, time: f32) -> (f32, f32) {
    let pos1 = st * 4.0 + Vec2::new(time * 0.5, time * 0.3);
    let pos2 = st * 6.0 + Vec2::new(time * -0.4, time * 0.6);
    let pos3 = st * 8.0 + Vec2::new(time * 0.7, time * -0.2);

    let field1 = (pos1.x + (pos1.y + time * 2.0).sin() * 2.0).sin() * 0.5 + 0.5;
    let field2 = (pos2.x * 1.5 + (pos2.y * 1.2 + time * 1.5).cos() * 1.8).sin() * 0.5 + 0.5;
    let field3 = (pos3.y + (pos3.x * 1.3 + time * 1.8).sin() * 1.5).cos() * 0.5 + 0.5;

    let n1 = noise(pos1 + Vec2::splat(time * 0.1));
    let n2 = noise(pos2 * 1.5 + Vec2::splat(time * 0.15));
    let n3 = noise(pos3 * 0.8 + Vec2::splat(time * 0.08));

    let plasma = field1 * 0.4 + field2 * 0.35 + field3 * 0.25 + (n1 + n2 + n3) * 0.1;

    let mut lightning = 0.0;
    for i in 0..LIGHTNING_SOURCES {
        let fi = i as f32;
        let light_pos =
            st + Vec2::new((time * 2.0 + fi).sin(), (time * 1.5 + fi).cos()) * 0.3;
        let dist = (light_pos - Vec2::splat(0.5)).length();
        lightning += (-dist * 8.0).exp() * (time * 10.0 + fi * 2.0).sin() * 0.5 + 0.5;
    }

    let intensity = (plasma + lightning * 0.3).clamp(0.0, 1.0);
    (intensity, lightning)
}

/// Pushes near-saturated intensity toward white: value rises to 1 while
/// saturation drains, producing the "hot" cores.
pub(crate) fn hot_core(intensity: f32, saturation: f32, value: f32) -> (f32, f32) {
    if intensity > HOT_CORE_THRESHOLD {
        let excess = intensity - HOT_CORE_THRESHOLD;
        (mix(saturation, 0.0, excess * 3.0), mix(value, 1.0, excess * 5.0))
    } else {
        (saturation, value)
    }
}

pub(crate) fn plasma_storm(uv: Vec2, time: f32, _resolution: Vec2) -> Vec3 {
    let (intensity, lightning) = plasma_intensity(uv, time);

    let hue = 0.6 + intensity * 0.2 + (time * 0.5).sin() * 0.1;
    let (saturation, value) = hot_core(intensity, 0.8 + intensity * 0.2, intensity * 0.9 + 0.1);

    hsv_to_rgb(hue, saturation, value) + lightning * 0.5 * Vec3::new(0.8, 0.9, 1.0)
}

pub(crate) fn quantum_flux(uv: Vec2, time: f32, _resolution: Vec2) -> Vec3 {
    let flow_pos = uv * 3.0 + Vec2::new(time * 0.1, time * 0.08);

    let n1 = noise(flow_pos);
    let n2 = noise(flow_pos * 2.0 + Vec2::splat(time * 0.15));
    let n3 = noise(flow_pos * 4.0 - Vec2::splat(time * 0.2));
    let pattern = n1 * 0.5 + n2 * 0.3 + n3 * 0.2;

    let distort = Vec2::new(
        (uv.y * 8.0 + time + pattern).sin(),
        (uv.x * 6.0 + time * 0.8 + pattern).cos(),
    ) * 0.1;
    let flow = noise((uv + distort) * 5.0 + Vec2::splat(time * 0.3));

    Vec3::splat(smoothstep(0.3, 0.7, flow + pattern * 0.5))
}
