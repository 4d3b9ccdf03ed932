//! Vortex advection: samples are pulled backwards through a moving velocity
//! field before the density sources are evaluated.

use glam::{Vec2, Vec3};

use crate::math::smoothstep;

const VORTICES: usize = 4;
const ADVECTION_STEPS: usize = 8;
const ADVECTION_DT: f32 = 0.02;
const DENSITY_SOURCES: usize = 6;

pub(crate) fn velocity(pos: Vec2, time: f32) -> Vec2 {
    let mut vel = Vec2::ZERO;
    for i in 0..VORTICES {
        let fi = i as f32;
        let centre = Vec2::new(
            0.5 + 0.3 * (time * 0.8 + fi * 2.0).sin(),
            0.5 + 0.3 * (time * 0.6 + fi * 1.5).cos(),
        );
        let diff = pos - centre;
        let strength = 0.5 / (1.0 + diff.length() * 8.0);
        vel += strength * diff.perp();
    }
    vel
}

pub(crate) fn advect(start: Vec2, time: f32) -> Vec2 {
    let mut pos = start;
    for _ in 0..ADVECTION_STEPS {
        pos -= velocity(pos, time) * ADVECTION_DT;
    }
    pos
}

pub(crate) fn fluid_dynamics(uv: Vec2, time: f32, _resolution: Vec2) -> Vec3 {
    let particle = advect(uv, time);

    let mut density = 0.0;
    for i in 0..DENSITY_SOURCES {
        let fi = i as f32;
        let source = Vec2::new(
            0.5 + 0.4 * (time * 0.5 + fi).sin(),
            0.5 + 0.4 * (time * 0.7 + fi * 1.3).cos(),
        );
        let dist = (particle - source).length();
        density += (-dist * 12.0).exp() * (0.8 + 0.2 * (time * 3.0 + fi).sin());
    }

    let turbulence = uv * 8.0 + Vec2::splat(time * 0.5);
    density += turbulence.x.sin() * turbulence.y.sin() * 0.1;
    density += ((uv - Vec2::splat(0.5)).length() * 20.0 - time * 4.0).sin() * 0.2;

    Vec3::splat(smoothstep(0.1, 0.8, density))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn velocity_is_rotational() {
        // Each vortex contributes a vector perpendicular to its offset, so a
        // single-vortex field never pushes radially.
        let pos = Vec2::new(0.9, 0.1);
        let centre = Vec2::new(0.5 + 0.3 * 0.0_f32.sin(), 0.5 + 0.3 * 0.0_f32.cos());
        let diff = pos - centre;
        assert!(diff.perp().dot(diff).abs() < 1e-6);
        assert!(velocity(pos, 0.0).length() > 0.0);
    }

    #[test]
    fn advection_moves_samples() {
        let start = Vec2::new(0.3, 0.6);
        assert_ne!(advect(start, 1.5), start);
    }
}
