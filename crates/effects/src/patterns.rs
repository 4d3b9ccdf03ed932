//! Periodic pattern effects: spiral, pulse grid, morse cascade and halftone.

use glam::{Vec2, Vec3};

use crate::math::{fract, fract2, hash12, mix3, modulo, smoothstep, step};

const GOLDEN_RATIO: f32 = 1.618_034;
const SPIRAL_ARMS: f32 = 5.0;
// log() of the radius is undefined at the exact centre.
const MIN_RADIUS: f32 = 1e-4;

pub(crate) fn geometric_spiral(uv: Vec2, time: f32, _resolution: Vec2) -> Vec3 {
    let st = (uv - Vec2::splat(0.5)) * 2.0;
    let r = st.length();
    let a = st.y.atan2(st.x);
    let log_r = |scale: f32| (r.max(MIN_RADIUS) * scale).ln();

    let spiral1 =
        (a * GOLDEN_RATIO + time * 0.5 - log_r(4.0) * GOLDEN_RATIO).sin() * 0.5 + 0.5;
    let spiral2 =
        (a * GOLDEN_RATIO * 2.0 - time * 0.3 - log_r(2.0) * GOLDEN_RATIO).sin() * 0.5 + 0.5;
    let arm_spiral = (a * SPIRAL_ARMS - time * 0.8 + r * 8.0).sin() * 0.5 + 0.5;

    let pulse = smoothstep(0.3, 0.7, (r * 10.0 - time * 2.0).sin() * 0.5 + 0.5);

    let mut pattern = (spiral1 * 0.6 + spiral2 * 0.3 + arm_spiral * 0.4) * pulse;
    pattern *= 1.0 - smoothstep(0.5, 1.2, r);
    Vec3::splat(smoothstep(0.4, 0.6, pattern))
}

fn grid_line(grid: Vec2, width: f32) -> f32 {
    let offset = (fract2(grid) - Vec2::splat(0.5)).abs();
    1.0 - smoothstep(0.0, width, offset.x.min(offset.y))
}

fn cell_pulse(grid: Vec2, time: f32, speed: f32, spread: f32) -> f32 {
    let cell = grid.floor();
    (time * speed + (cell.x + cell.y) * spread).sin() * 0.5 + 0.5
}

pub(crate) fn pulse_grid(uv: Vec2, time: f32, _resolution: Vec2) -> Vec3 {
    let grid1 = uv * 8.0;
    let grid2 = uv * 16.0;
    let grid3 = uv * 4.0;

    let line1 = grid_line(grid1, 0.05);
    let line2 = grid_line(grid2, 0.02);

    let cell1 = smoothstep(0.3, 0.7, cell_pulse(grid1, time, 2.0, 0.5));
    let cell2 = smoothstep(0.4, 0.6, cell_pulse(grid2, time, 3.0, 0.3));
    let cell3 = smoothstep(0.2, 0.8, cell_pulse(grid3, time, 1.5, 0.8));

    let mut pattern = line1 * 0.8 + line2 * 0.4;
    pattern += cell1 * 0.3 + cell2 * 0.2 + cell3 * 0.1;

    let beat = smoothstep(0.6, 0.8, (time * 4.0).sin() * 0.5 + 0.5);
    pattern *= 0.7 + beat * 0.3;
    Vec3::splat(pattern)
}

/// Dot / dash / space timing over an eight-beat cycle, offset per cell.
pub(crate) fn morse_signal(t: f32, cell: Vec2) -> f32 {
    let sequence = modulo(t + hash12(cell) * 10.0, 8.0);
    match sequence {
        s if s < 1.0 => 1.0,
        s if s < 2.0 => 0.0,
        s if s < 5.0 => 1.0,
        s if s < 6.0 => 0.0,
        s if s < 7.0 => 1.0,
        _ => 0.0,
    }
}

fn morse_layer(uv: Vec2, time: f32, scale: Vec2, speed: f32, lag: f32, bands: f32, fall: f32) -> f32 {
    let cell = (uv * scale).floor();
    let signal = morse_signal(time * speed - cell.y * lag, cell);
    let cascade = smoothstep(0.0, 0.1, fract(uv.y * bands - time * fall));
    signal * cascade
}

pub(crate) fn morse_matrix(uv: Vec2, time: f32, _resolution: Vec2) -> Vec3 {
    let morse1 = morse_layer(uv, time, Vec2::new(20.0, 40.0), 3.0, 0.5, 8.0, 1.5);
    let morse2 = morse_layer(uv, time, Vec2::new(15.0, 30.0), 2.5, 0.3, 6.0, 2.0);
    let morse3 = morse_layer(uv, time, Vec2::new(25.0, 50.0), 4.0, 0.7, 10.0, 1.0);

    let mut pattern = morse1 * 0.7 + morse2 * 0.5 + morse3 * 0.3;
    pattern += (uv.x * 100.0 + time * 20.0).sin() * 0.1;
    Vec3::splat(step(0.3, pattern))
}

pub(crate) fn neon_genesis(uv: Vec2, time: f32, _resolution: Vec2) -> Vec3 {
    let pos = uv * 20.0;

    let mut pattern = 0.0;
    for i in 0..3 {
        let fi = i as f32;
        let offset = Vec2::new((time * 0.5 + fi).sin(), (time * 0.3 + fi).cos()) * 2.0;
        let dist = (fract2(pos + offset) - Vec2::splat(0.5)).length();
        let dot_size = 0.3 + 0.2 * (time * 0.8 + fi * 2.0).sin();
        pattern += smoothstep(dot_size, dot_size - 0.1, dist);
    }

    mix3(Vec3::splat(0.2), Vec3::splat(0.9), pattern)
}
