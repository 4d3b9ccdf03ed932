//! Letterforms built from box and circle SDFs, wobbled over time.

use glam::{Vec2, Vec3};

use crate::math::smoothstep;

fn box_sdf(p: Vec2, size: Vec2) -> f32 {
    let d = p.abs() - size;
    d.max(Vec2::ZERO).length() + d.x.max(d.y).min(0.0)
}

fn circle_sdf(p: Vec2, radius: f32) -> f32 {
    p.length() - radius
}

pub(crate) fn letter_a(p: Vec2) -> f32 {
    let p = p * 2.0;
    let bar = box_sdf(p - Vec2::new(0.0, 0.1), Vec2::new(0.4, 0.05));
    let left = box_sdf(p - Vec2::new(-0.2, 0.0), Vec2::new(0.05, 0.8));
    let right = box_sdf(p - Vec2::new(0.2, 0.0), Vec2::new(0.05, 0.8));
    let top = box_sdf(p - Vec2::new(0.0, 0.6), Vec2::new(0.15, 0.05));
    bar.min(left).min(right.min(top))
}

pub(crate) fn letter_b(p: Vec2) -> f32 {
    let p = p * 2.0;
    let left = box_sdf(p - Vec2::new(-0.15, 0.0), Vec2::new(0.05, 0.8));
    let top = box_sdf(p - Vec2::new(0.05, 0.6), Vec2::new(0.2, 0.05));
    let middle = box_sdf(p - Vec2::new(0.05, 0.0), Vec2::new(0.15, 0.05));
    let bottom = box_sdf(p - Vec2::new(0.05, -0.6), Vec2::new(0.2, 0.05));
    let upper_bowl = circle_sdf(p - Vec2::new(0.1, 0.3), 0.25);
    let lower_bowl = circle_sdf(p - Vec2::new(0.1, -0.3), 0.25);
    left.min(top)
        .min(middle.min(bottom))
        .min(upper_bowl.min(lower_bowl))
}

pub(crate) fn typography_morph(uv: Vec2, time: f32, _resolution: Vec2) -> Vec3 {
    let st = (uv - Vec2::splat(0.5)) * 2.0;

    let first = letter_a(st + Vec2::new(-0.6, 0.0)) + (time * 2.0 + st.x * 5.0).sin() * 0.1;
    let second = letter_b(st) + (time * 1.5 + st.y * 4.0).cos() * 0.15;
    let third = letter_a(st + Vec2::new(0.6, 0.0)) + (time * 2.5 + st.length() * 3.0).sin() * 0.12;
    let letters = first.min(second).min(third);

    let mut fill = 1.0 - smoothstep(0.0, 0.02, letters);
    let outline = 1.0 - smoothstep(0.02, 0.08, letters) - fill;

    let dissolve = (time * 3.0 + st.x * 10.0 + st.y * 8.0).sin() * 0.5 + 0.5;
    fill *= smoothstep(0.3, 0.7, dissolve);

    let distortion = (st.y * 50.0 + time * 8.0).sin() * 0.02;
    Vec3::new(
        fill * (1.0 + distortion),
        fill * (1.0 - distortion * 0.5),
        fill + outline * 0.5,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_sdf_is_signed() {
        assert!(box_sdf(Vec2::ZERO, Vec2::splat(0.5)) < 0.0);
        assert!((box_sdf(Vec2::new(0.5, 0.0), Vec2::splat(0.5))).abs() < 1e-6);
        assert!((box_sdf(Vec2::new(1.5, 0.0), Vec2::splat(0.5)) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn letter_strokes_are_inside() {
        // Left stem of the A sits at x = -0.1 once the glyph is scaled by two.
        assert!(letter_a(Vec2::new(-0.1, 0.0)) < 0.0);
        assert!(letter_b(Vec2::new(-0.075, 0.0)) < 0.0);
        assert!(letter_a(Vec2::new(0.9, 0.9)) > 0.0);
    }
}
