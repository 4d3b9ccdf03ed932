//! Raymarched liquid metal.
//!
//! The implicit surface is the union of three warped sphere SDFs with a hash
//! micro-texture. Rays start at a fixed pinhole camera and march until they
//! either touch the surface or leave the far plane; misses still glow based on
//! the closest approach so silhouettes stay soft.

use glam::{Vec2, Vec3};

use crate::math::hash13;

pub(crate) const MAX_STEPS: usize = 64;
pub(crate) const HIT_EPSILON: f32 = 0.001;
pub(crate) const FAR_PLANE: f32 = 50.0;
const NORMAL_EPSILON: f32 = 0.001;
const CAMERA: Vec3 = Vec3::new(0.0, 0.0, -3.0);
const BACKGROUND: f32 = 0.05;

/// Outcome of one march along a view ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct March {
    /// Distance travelled along the ray when the march stopped.
    pub travelled: f32,
    /// Smallest field value observed along the ray.
    pub closest: f32,
}

impl March {
    pub fn hit(&self) -> bool {
        self.travelled < FAR_PLANE
    }
}

fn sphere(p: Vec3, radius: f32) -> f32 {
    p.length() - radius
}

pub(crate) fn distance_field(pos: Vec3, time: f32) -> f32 {
    let mut q = pos;
    q.y += (pos.x * 2.0 + time).sin() * 0.3;
    q.y += (pos.z * 1.5 + time * 0.8).sin() * 0.2;
    q.x += (pos.z * 1.8 + time * 0.6).cos() * 0.25;

    let d1 = sphere(q, 0.8);
    let d2 = sphere(q + Vec3::new(1.2, 0.3, 0.5), 0.6);
    let d3 = sphere(q - Vec3::new(0.8, 0.2, 1.0), 0.5);

    d1.min(d2.min(d3)) + hash13(pos * 8.0 + Vec3::splat(time * 0.5)) * 0.05
}

fn normal(pos: Vec3, time: f32) -> Vec3 {
    let dx = Vec3::new(NORMAL_EPSILON, 0.0, 0.0);
    let dy = Vec3::new(0.0, NORMAL_EPSILON, 0.0);
    let dz = Vec3::new(0.0, 0.0, NORMAL_EPSILON);
    Vec3::new(
        distance_field(pos + dx, time) - distance_field(pos - dx, time),
        distance_field(pos + dy, time) - distance_field(pos - dy, time),
        distance_field(pos + dz, time) - distance_field(pos - dz, time),
    )
    .normalize_or_zero()
}

pub(crate) fn march(origin: Vec3, direction: Vec3, time: f32) -> March {
    let mut travelled = 0.0;
    let mut closest = f32::MAX;
    for _ in 0..MAX_STEPS {
        let dist = distance_field(origin + direction * travelled, time);
        closest = closest.min(dist);
        if dist < HIT_EPSILON {
            break;
        }
        travelled += dist;
        if travelled > FAR_PLANE {
            break;
        }
    }
    March { travelled, closest }
}

pub(crate) fn liquid_metal(uv: Vec2, time: f32, _resolution: Vec2) -> Vec3 {
    let p = (uv - Vec2::splat(0.5)) * 2.0;
    let ray = Vec3::new(p.x, p.y, 1.0).normalize();
    let result = march(CAMERA, ray, time);

    let mut color = Vec3::splat(BACKGROUND);
    if result.hit() {
        let n = normal(CAMERA + ray * result.travelled, time);
        let fresnel = (1.0 - (-ray).dot(n)).max(0.0).powi(2);
        color = Vec3::splat(fresnel * 0.9 + 0.1);

        let light = Vec3::new(1.0, 1.0, -1.0).normalize();
        let specular = n.dot(light).max(0.0).powf(32.0);
        color += Vec3::splat(specular * 0.8);
    } else {
        color += Vec3::splat((-result.closest * 3.0).exp() * 0.2);
    }
    color
}
