//! Vector and ray helpers shared by the resolver and the integrator.
//!
//! Every helper here is total: degenerate inputs (zero-length vectors, NaN,
//! infinities) produce a documented fallback instead of propagating garbage
//! into the simulation.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Golden angle in radians, used for the spiral ray distribution.
const GOLDEN_ANGLE: f32 = 2.399_963_2;

/// A half-line with a unit-length direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ray {
    /// Start of the ray in world space.
    pub origin: Vec3,
    /// Unit direction.
    pub direction: Vec3,
}

impl Ray {
    /// Build a ray, normalizing `direction`.
    ///
    /// Returns `None` if the direction is zero-length or not finite.
    pub fn new(origin: Vec3, direction: Vec3) -> Option<Self> {
        let direction = direction.try_normalize()?;
        if !origin.is_finite() {
            return None;
        }
        Some(Self { origin, direction })
    }

    /// Point at `distance` along the ray.
    #[inline]
    pub fn at(&self, distance: f32) -> Vec3 {
        self.origin + self.direction * distance
    }
}

/// Normalize `v`, or return `fallback` when `v` has no usable direction.
#[inline]
pub fn safe_normalize(v: Vec3, fallback: Vec3) -> Vec3 {
    v.try_normalize().unwrap_or(fallback)
}

/// Replace a non-finite vector with zero.
#[inline]
pub fn finite_or_zero(v: Vec3) -> Vec3 {
    if v.is_finite() {
        v
    } else {
        Vec3::ZERO
    }
}

/// Drop the vertical component.
#[inline]
pub fn horizontal(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Remove the component of `v` along the unit normal `n`.
#[inline]
pub fn project_on_plane(v: Vec3, n: Vec3) -> Vec3 {
    v - n * v.dot(n)
}

/// Mirror `v` about the plane with unit normal `n`.
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - n * (2.0 * v.dot(n))
}

/// Angle in radians between `n` and world-up.
///
/// Degenerate normals are treated as world-up (angle 0).
pub fn angle_from_up(n: Vec3) -> f32 {
    let n = safe_normalize(n, Vec3::Y);
    n.dot(Vec3::Y).clamp(-1.0, 1.0).acos()
}

/// Normalized linear interpolation between two directions.
///
/// Falls back to `fallback` when the blend cancels out (opposite inputs).
pub fn nlerp(a: Vec3, b: Vec3, t: f32, fallback: Vec3) -> Vec3 {
    safe_normalize(a.lerp(b, t.clamp(0.0, 1.0)), fallback)
}

/// Rotate a local-space normal into world space.
///
/// A zero or non-finite normal defaults to world-up.
pub fn transform_normal(rotation: Quat, local_normal: Vec3) -> Vec3 {
    safe_normalize(rotation * local_normal, Vec3::Y)
}

/// `count` unit directions spread evenly over the sphere.
///
/// Uses a golden-angle spiral: heights are spaced uniformly in `[-1, 1]` and
/// each successive point is rotated by the golden angle around Y.
pub fn fibonacci_sphere(count: usize) -> Vec<Vec3> {
    if count == 0 {
        return Vec::new();
    }
    if count == 1 {
        return vec![Vec3::NEG_Y];
    }

    let step = 2.0 / count as f32;
    (0..count)
        .map(|i| {
            let y = 1.0 - step * (i as f32 + 0.5);
            let ring = (1.0 - y * y).max(0.0).sqrt();
            let theta = GOLDEN_ANGLE * i as f32;
            Vec3::new(theta.cos() * ring, y, theta.sin() * ring)
        })
        .collect()
}

/// `count` horizontal unit directions evenly spaced around Y.
pub fn ring_directions(count: usize) -> Vec<Vec3> {
    (0..count)
        .map(|i| {
            let theta = std::f32::consts::TAU * i as f32 / count as f32;
            Vec3::new(theta.cos(), 0.0, theta.sin())
        })
        .collect()
}
