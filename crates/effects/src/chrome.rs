//! Reflective chrome liquid.

use glam::{Vec2, Vec3};

use crate::math::{hash12, mix3, smoothstep, value_noise};

const BLOBS: usize = 3;
// Brightness ceiling that keeps highlights from blowing out into white spots.
const MAX_CHANNEL: f32 = 0.85;

pub(crate) fn chrome_mask(st: Vec2, time: f32) -> f32 {
    let flow = Vec2::new(
        (st.y * 4.0 + time * 1.5).sin() * 0.2,
        (st.x * 3.0 + time * 1.2).cos() * 0.15,
    );
    let chrome_st = st + flow;

    let mut surface = 0.0;
    for i in 0..BLOBS {
        let fi = i as f32;
        let centre = Vec2::new(
            0.3 + fi * 0.2 + (time * 0.8 + fi).sin() * 0.1,
            0.5 + (time * 0.6 + fi * 1.5).cos() * 0.2,
        );
        let dist = (chrome_st - centre).length();
        surface += (-dist * 4.0).exp() * 0.6 * smoothstep(0.0, 0.1, dist);
    }
    surface += value_noise(chrome_st * 12.0 + Vec2::splat(time * 2.0), hash12) * 0.3;

    smoothstep(0.3, 0.8, surface)
}

pub(crate) fn chrome_liquid(uv: Vec2, time: f32, _resolution: Vec2) -> Vec3 {
    let chrome = chrome_mask(uv, time);

    let reflection_coord = uv
        + Vec2::new(
            (uv.x * 20.0 + time).sin(),
            (uv.y * 18.0 + time * 0.8).cos(),
        ) * chrome
            * 0.05;
    let reflection = ((reflection_coord.y * 15.0 + time * 2.0).sin() * 0.5 + 0.5) * 0.9;

    let fresnel = (1.0 - smoothstep(0.1, 0.9, (uv - Vec2::splat(0.5)).length())) * 0.5;

    let shadow = Vec3::new(0.3, 0.4, 0.5);
    let base = Vec3::new(0.7, 0.8, 0.9);
    let mut color = mix3(shadow, base, reflection);
    color = mix3(color, Vec3::ONE, fresnel * chrome);
    color *= chrome;

    let brightness = (color.x + color.y + color.z) / 3.0;
    let mirror =
        smoothstep(0.8, 1.0, reflection * chrome) * (1.0 - smoothstep(0.7, 0.9, brightness));
    color += Vec3::splat(mirror * 0.1);

    color.min(Vec3::splat(MAX_CHANNEL))
}
