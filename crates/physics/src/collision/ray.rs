//! Ray hits and the player's collision shape.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::flags::SurfaceTags;

/// Result of a ray hitting a static surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceHit {
    /// Impact point in world space.
    pub point: Vec3,

    /// World-space unit normal at the impact point.
    ///
    /// Points away from the surface that was hit. Degenerate normals are
    /// replaced by world-up before a hit is handed out.
    pub normal: Vec3,

    /// Distance from the ray origin to `point`.
    pub distance: f32,

    /// Tags of the surface that was hit.
    pub tags: SurfaceTags,

    /// Identifier of the surface that was hit.
    pub surface_id: u32,
}

impl SurfaceHit {
    /// How far the hit sits inside a sphere of `radius` around the ray origin.
    ///
    /// Zero when the surface is outside the sphere.
    #[inline]
    pub fn penetration(&self, radius: f32) -> f32 {
        (radius - self.distance).max(0.0)
    }
}

/// The player's collision volume: an upright pill of `radius` and `height`.
///
/// The simulated position is the *center* of the volume, so the feet sit
/// `height / 2` below it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerShape {
    /// Horizontal radius (meters).
    pub radius: f32,
    /// Total height (meters).
    pub height: f32,
}

impl PlayerShape {
    /// Distance from the center to the feet.
    #[inline]
    pub fn half_height(&self) -> f32 {
        self.height * 0.5
    }

    /// Bottom-center of the shape for a body centered at `position`.
    #[inline]
    pub fn base(&self, position: Vec3) -> Vec3 {
        position - Vec3::new(0.0, self.half_height(), 0.0)
    }
}

impl Default for PlayerShape {
    fn default() -> Self {
        Self {
            radius: 0.4,
            height: 1.8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_penetration() {
        let hit = SurfaceHit {
            point: Vec3::ZERO,
            normal: Vec3::Y,
            distance: 0.3,
            tags: SurfaceTags::SURFABLE,
            surface_id: 0,
        };
        assert!((hit.penetration(0.4) - 0.1).abs() < 1e-6);
        assert_eq!(hit.penetration(0.2), 0.0);
    }

    #[test]
    fn test_player_shape_base() {
        let shape = PlayerShape {
            radius: 0.5,
            height: 2.0,
        };
        assert_eq!(shape.half_height(), 1.0);
        assert_eq!(shape.base(Vec3::new(0.0, 5.0, 0.0)), Vec3::new(0.0, 4.0, 0.0));
    }
}
