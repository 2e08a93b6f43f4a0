//! Map construction: static geometry, spawn and checkpoints.

use std::f32::consts::PI;

use glam::Vec3;
use surfline_physics::{CollisionWorld, GeometryError, SurfaceTags};

use crate::checkpoint::{Checkpoint, CheckpointId};

/// Incline of the demo course's surf ramps (radians from flat).
const COURSE_RAMP_INCLINE: f32 = PI / 3.0;

/// A surf map containing collision geometry, a spawn point and checkpoints.
///
/// Built once; nothing in it changes while a session runs.
#[derive(Debug)]
pub struct Map {
    /// Display name.
    pub name: String,

    /// Collision world for physics.
    pub collision: CollisionWorld,

    /// Player spawn (center of the player volume).
    pub spawn: Vec3,

    /// Initial facing direction (yaw in radians).
    pub spawn_yaw: f32,

    /// Checkpoint triggers.
    pub checkpoints: Vec<Checkpoint>,
}

impl Map {
    /// Create an empty map.
    pub fn new(name: &str, spawn: Vec3) -> Self {
        Self {
            name: name.to_string(),
            collision: CollisionWorld::new(),
            spawn,
            spawn_yaw: 0.0,
            checkpoints: Vec::new(),
        }
    }

    /// Add a checkpoint and return its id.
    pub fn add_checkpoint(&mut self, trigger: Vec3, radius: f32, respawn_point: Vec3) -> CheckpointId {
        let id = self.checkpoints.len() as CheckpointId;
        self.checkpoints.push(Checkpoint {
            id,
            trigger,
            radius,
            respawn_point,
        });
        id
    }

    /// Add a flat walkable platform whose top face is at `top_y`.
    pub fn add_platform(&mut self, center_xz: (f32, f32), top_y: f32, half_size: (f32, f32)) -> u32 {
        self.collision.add_box(
            Vec3::new(center_xz.0, top_y - 0.5, center_xz.1),
            Vec3::new(half_size.0, 0.5, half_size.1),
            SurfaceTags::GROUND,
        )
    }

    /// Add a surf ramp running along X. `facing_positive_z` picks which side
    /// the sliding face looks toward.
    pub fn add_course_ramp(&mut self, center: Vec3, length: f32, width: f32, facing_positive_z: bool) -> Vec3 {
        let heading = if facing_positive_z { 0.0 } else { PI };
        let (_, normal) = self.collision.add_ramp(
            center,
            Vec3::new(length * 0.5, 1.0, width * 0.5),
            COURSE_RAMP_INCLINE,
            heading,
            SurfaceTags::SURFABLE,
        );
        normal
    }

    /// Add a wedge standing on `base_center`: a triangular prism `length`
    /// long on X that rises from nothing at its -X end to `height` at its +X end.
    pub fn add_wedge(
        &mut self,
        base_center: Vec3,
        length: f32,
        width: f32,
        height: f32,
        tags: SurfaceTags,
    ) -> Result<u32, GeometryError> {
        let (hl, hw) = (length * 0.5, width * 0.5);
        let mut points = Vec::with_capacity(6);
        for z in [-hw, hw] {
            points.push(base_center + Vec3::new(-hl, 0.0, z));
            points.push(base_center + Vec3::new(hl, 0.0, z));
            points.push(base_center + Vec3::new(hl, height, z));
        }
        self.collision.add_convex_hull(&points, tags)
    }

    /// Create a small surf course for development.
    ///
    /// A start platform, then two V-shaped ramp pairs heading +X with a
    /// checkpoint platform between them, side walls and a finish platform
    /// closed off by a wedge.
    pub fn surf_course() -> Self {
        let mut map = Self::new("surf_course", Vec3::new(0.0, 2.0, 0.0));

        // Start
        map.add_platform((0.0, 0.0), 0.0, (6.0, 6.0));

        // First pair of ramps
        map.add_course_ramp(Vec3::new(30.0, -8.0, -4.4), 40.0, 14.0, true);
        map.add_course_ramp(Vec3::new(30.0, -8.0, 4.4), 40.0, 14.0, false);

        // Checkpoint platform
        map.add_platform((60.0, 0.0), -16.0, (5.0, 5.0));
        map.add_checkpoint(Vec3::new(60.0, -15.0, 0.0), 5.0, Vec3::new(60.0, -14.0, 0.0));

        // Second pair of ramps
        map.add_course_ramp(Vec3::new(90.0, -24.0, -4.4), 40.0, 14.0, true);
        map.add_course_ramp(Vec3::new(90.0, -24.0, 4.4), 40.0, 14.0, false);

        // Finish
        map.add_platform((125.0, 0.0), -32.0, (8.0, 8.0));
        map.add_checkpoint(Vec3::new(125.0, -31.0, 0.0), 8.0, Vec3::new(125.0, -30.0, 0.0));
        if let Err(e) = map.add_wedge(Vec3::new(131.0, -32.0, 0.0), 4.0, 16.0, 3.0, SurfaceTags::OBSTACLE) {
            log::warn!("surf_course: finish wedge skipped: {}", e);
        }

        // Side walls along the whole course
        for z in [-16.0, 16.0] {
            map.collision.add_box(
                Vec3::new(62.0, -10.0, z),
                Vec3::new(70.0, 25.0, 0.5),
                SurfaceTags::OBSTACLE,
            );
        }

        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use surfline_physics::{GeometryProvider, Ray};

    fn ground_below(map: &Map, point: Vec3) -> Option<f32> {
        let ray = Ray::new(point, Vec3::NEG_Y)?;
        map.collision
            .cast_ray(&ray, 10.0, SurfaceTags::GROUND)
            .map(|hit| hit.point.y)
    }

    #[test]
    fn test_map_creation() {
        let map = Map::new("test", Vec3::ZERO);
        assert_eq!(map.name, "test");
        assert_eq!(map.collision.surface_count(), 0);
        assert!(map.checkpoints.is_empty());
    }

    #[test]
    fn test_add_checkpoint_ids() {
        let mut map = Map::new("test", Vec3::ZERO);
        assert_eq!(map.add_checkpoint(Vec3::ZERO, 1.0, Vec3::Y), 0);
        assert_eq!(map.add_checkpoint(Vec3::X, 1.0, Vec3::Y), 1);
        assert_eq!(map.checkpoints[1].trigger, Vec3::X);
    }

    #[test]
    fn test_surf_course() {
        let map = Map::surf_course();
        assert_eq!(map.collision.surface_count(), 10);
        assert_eq!(map.checkpoints.len(), 2);

        // Spawn and every respawn point stand over walkable ground.
        let floor = ground_below(&map, map.spawn).expect("spawn has no floor");
        assert!(floor.abs() < 1e-4, "floor at {}", floor);
        for checkpoint in &map.checkpoints {
            assert!(
                ground_below(&map, checkpoint.respawn_point).is_some(),
                "checkpoint {} has no floor",
                checkpoint.id
            );
            assert!(checkpoint.contains(checkpoint.respawn_point));
        }
    }

    #[test]
    fn test_wedge() {
        let mut map = Map::new("wedge", Vec3::ZERO);
        let id = map
            .add_wedge(Vec3::ZERO, 4.0, 2.0, 2.0, SurfaceTags::OBSTACLE)
            .expect("wedge has volume");

        // Halfway along, the slope is half as high as the back.
        let ray = Ray::new(Vec3::new(0.0, 10.0, 0.0), Vec3::NEG_Y).unwrap();
        let hit = map
            .collision
            .cast_ray(&ray, 20.0, SurfaceTags::OBSTACLE)
            .expect("should hit the slope");
        assert_eq!(hit.surface_id, id);
        assert!((hit.point.y - 1.0).abs() < 1e-3, "hit at {}", hit.point.y);
        assert!((hit.normal - Vec3::new(-1.0, 2.0, 0.0).normalize()).length() < 1e-3);

        // Flat wedges enclose nothing.
        assert!(matches!(
            map.add_wedge(Vec3::ZERO, 4.0, 2.0, 0.0, SurfaceTags::OBSTACLE),
            Err(GeometryError::InvalidHull(6))
        ));
        assert_eq!(map.collision.surface_count(), 1);
    }

    #[test]
    fn test_course_ramps_are_surfable_not_walkable() {
        let mut map = Map::new("ramp", Vec3::ZERO);
        let normal = map.add_course_ramp(Vec3::ZERO, 20.0, 10.0, true);

        let angle = normal.angle_between(Vec3::Y);
        assert!((angle - COURSE_RAMP_INCLINE).abs() < 1e-4);
        assert!(normal.z > 0.0);

        let other = map.add_course_ramp(Vec3::new(0.0, 0.0, 30.0), 20.0, 10.0, false);
        assert!(other.z < 0.0);
    }
}
