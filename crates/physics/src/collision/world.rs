//! Static collision geometry and ray queries against it.
//!
//! The collision world stores every tagged surface of a map and answers ray
//! casts through it. It is built once when a map is loaded and never changes
//! afterwards.

use glam::{Quat, Vec3};
use parry3d::math::{Isometry, Point, Real, Vector};
use parry3d::na::{Quaternion, Translation3, UnitQuaternion};
use parry3d::query::Ray as ParryRay;
use parry3d::shape::SharedShape;
use thiserror::Error;

use super::flags::SurfaceTags;
use super::ray::SurfaceHit;
use crate::math::{safe_normalize, transform_normal, Ray};

/// Errors raised while building collision geometry.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("triangle mesh has no triangles")]
    EmptyMesh,

    #[error("triangle {triangle} references vertex {index} but the mesh has {vertex_count} vertices")]
    InvalidMesh {
        triangle: usize,
        index: u32,
        vertex_count: usize,
    },

    #[error("convex hull could not be computed from {0} points")]
    InvalidHull(usize),
}

/// Read access to the static surfaces of a map.
///
/// The resolver only ever talks to geometry through this trait, so any
/// backend that can answer ray casts can drive the simulation.
pub trait GeometryProvider {
    /// Number of surfaces in the set.
    fn surface_count(&self) -> usize;

    /// Closest hit along `ray` within `max_distance` among surfaces whose
    /// tags intersect `mask`.
    ///
    /// `None` means no contact; it is never an error.
    fn cast_ray(&self, ray: &Ray, max_distance: f32, mask: SurfaceTags) -> Option<SurfaceHit>;
}

/// A single tagged static surface.
#[derive(Clone)]
pub struct StaticSurface {
    /// Unique identifier for this surface.
    pub id: u32,
    /// The collision shape.
    pub shape: SharedShape,
    /// Position and orientation in world space.
    pub transform: Isometry<Real>,
    /// What the surface counts as for the collision passes.
    pub tags: SurfaceTags,
}

impl std::fmt::Debug for StaticSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticSurface")
            .field("id", &self.id)
            .field("shape", &self.shape.shape_type())
            .field("tags", &self.tags)
            .finish()
    }
}

impl StaticSurface {
    /// Hit-test a ray against this surface alone.
    ///
    /// Rays are cast with `solid = false`: a ray that starts inside the
    /// surface reports where it leaves it, not a zero-distance hit.
    pub fn cast_ray(&self, ray: &Ray, max_distance: f32) -> Option<SurfaceHit> {
        let parry_ray = ParryRay::new(
            Point::new(ray.origin.x, ray.origin.y, ray.origin.z),
            Vector::new(ray.direction.x, ray.direction.y, ray.direction.z),
        );

        let distance = self
            .shape
            .cast_ray(&self.transform, &parry_ray, max_distance, false)?;
        if !distance.is_finite() || distance > max_distance {
            return None;
        }

        Some(SurfaceHit {
            point: ray.at(distance),
            normal: self.hit_normal(&parry_ray, distance),
            distance,
            tags: self.tags,
            surface_id: self.id,
        })
    }

    fn hit_normal(&self, ray: &ParryRay, distance: f32) -> Vec3 {
        self.shape
            .cast_ray_and_get_normal(&self.transform, ray, distance + 0.01, false)
            .map(|intersection| {
                let n = intersection.normal;
                safe_normalize(Vec3::new(n.x, n.y, n.z), Vec3::Y)
            })
            .unwrap_or(Vec3::Y)
    }
}

/// The static collision world of a map.
///
/// Supports:
/// - Axis-aligned and oriented boxes
/// - Inclined ramps (oriented boxes described by incline and heading)
/// - Convex hulls
/// - Triangle meshes
#[derive(Debug, Default)]
pub struct CollisionWorld {
    surfaces: Vec<StaticSurface>,
    next_id: u32,
}

impl CollisionWorld {
    /// Create an empty collision world.
    pub fn new() -> Self {
        Self {
            surfaces: Vec::new(),
            next_id: 0,
        }
    }

    /// Add an axis-aligned box to the world.
    ///
    /// # Arguments
    ///
    /// * `center` - Center position of the box in world space
    /// * `half_extents` - Half-size in each axis (x, y, z)
    /// * `tags` - What the box counts as
    pub fn add_box(&mut self, center: Vec3, half_extents: Vec3, tags: SurfaceTags) -> u32 {
        self.add_oriented_box(center, half_extents, Quat::IDENTITY, tags)
    }

    /// Add a rotated box to the world.
    pub fn add_oriented_box(
        &mut self,
        center: Vec3,
        half_extents: Vec3,
        rotation: Quat,
        tags: SurfaceTags,
    ) -> u32 {
        let shape = SharedShape::cuboid(half_extents.x, half_extents.y, half_extents.z);
        self.push(shape, isometry(center, rotation), tags)
    }

    /// Add an inclined slab whose top face is a ramp.
    ///
    /// # Arguments
    ///
    /// * `center` - Center of the slab
    /// * `half_extents` - Half-size before rotation; `y` is half the thickness
    /// * `incline` - Tilt of the top face from horizontal, in radians
    /// * `heading` - Rotation around world-up applied after the tilt, in radians
    /// * `tags` - Usually `SURFABLE`
    ///
    /// # Returns
    ///
    /// The surface ID and the world-space normal of the top face.
    pub fn add_ramp(
        &mut self,
        center: Vec3,
        half_extents: Vec3,
        incline: f32,
        heading: f32,
        tags: SurfaceTags,
    ) -> (u32, Vec3) {
        let rotation = Quat::from_rotation_y(heading) * Quat::from_rotation_x(incline);
        let id = self.add_oriented_box(center, half_extents, rotation, tags);
        (id, transform_normal(rotation, Vec3::Y))
    }

    /// Add a convex hull to the world.
    ///
    /// The points must enclose a volume: fewer than four points, or points
    /// that all lie on one plane, are rejected.
    pub fn add_convex_hull(&mut self, points: &[Vec3], tags: SurfaceTags) -> Result<u32, GeometryError> {
        if !points.iter().all(|p| p.is_finite()) || !spans_volume(points) {
            return Err(GeometryError::InvalidHull(points.len()));
        }

        let parry_points: Vec<Point<Real>> = points.iter().map(|p| Point::new(p.x, p.y, p.z)).collect();

        let shape = SharedShape::convex_hull(&parry_points)
            .ok_or(GeometryError::InvalidHull(points.len()))?;

        Ok(self.push(shape, Isometry::identity(), tags))
    }

    /// Add a triangle mesh to the world.
    ///
    /// Each triangle becomes a part of one compound surface, so the whole
    /// mesh shares a single ID and tag set.
    pub fn add_triangle_mesh(
        &mut self,
        vertices: &[Vec3],
        indices: &[[u32; 3]],
        tags: SurfaceTags,
    ) -> Result<u32, GeometryError> {
        if indices.is_empty() {
            return Err(GeometryError::EmptyMesh);
        }

        let mut parts = Vec::with_capacity(indices.len());
        for (triangle, face) in indices.iter().enumerate() {
            let mut corners = [Point::origin(); 3];
            for (corner, &index) in corners.iter_mut().zip(face) {
                let v = vertices.get(index as usize).ok_or(GeometryError::InvalidMesh {
                    triangle,
                    index,
                    vertex_count: vertices.len(),
                })?;
                *corner = Point::new(v.x, v.y, v.z);
            }
            parts.push((
                Isometry::identity(),
                SharedShape::triangle(corners[0], corners[1], corners[2]),
            ));
        }

        Ok(self.push(SharedShape::compound(parts), Isometry::identity(), tags))
    }

    fn push(&mut self, shape: SharedShape, transform: Isometry<Real>, tags: SurfaceTags) -> u32 {
        let id = self.next_id;
        self.next_id += 1;

        self.surfaces.push(StaticSurface {
            id,
            shape,
            transform,
            tags,
        });

        id
    }
}

impl GeometryProvider for CollisionWorld {
    fn surface_count(&self) -> usize {
        self.surfaces.len()
    }

    fn cast_ray(&self, ray: &Ray, max_distance: f32, mask: SurfaceTags) -> Option<SurfaceHit> {
        if max_distance <= 0.0 {
            return None;
        }

        self.surfaces
            .iter()
            .filter(|surface| mask.intersects(surface.tags))
            .filter_map(|surface| surface.cast_ray(ray, max_distance))
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}

/// Whether `points` contain four corners of a non-flat tetrahedron.
fn spans_volume(points: &[Vec3]) -> bool {
    const MIN_EXTENT: f32 = 1e-8;

    let Some((&origin, rest)) = points.split_first() else {
        return false;
    };

    let mut axis: Option<Vec3> = None;
    let mut normal: Option<Vec3> = None;
    for &point in rest {
        let offset = point - origin;
        match (axis, normal) {
            (None, _) => {
                if offset.length_squared() > MIN_EXTENT {
                    axis = Some(offset);
                }
            }
            (Some(axis), None) => {
                let n = axis.cross(offset);
                if n.length_squared() > MIN_EXTENT {
                    normal = Some(n);
                }
            }
            (Some(_), Some(n)) => {
                if n.dot(offset).abs() > MIN_EXTENT {
                    return true;
                }
            }
        }
    }

    false
}

fn isometry(center: Vec3, rotation: Quat) -> Isometry<Real> {
    let rotation = UnitQuaternion::new_normalize(Quaternion::new(rotation.w, rotation.x, rotation.y, rotation.z));
    Isometry::from_parts(Translation3::new(center.x, center.y, center.z), rotation)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_4;

    fn create_test_world() -> CollisionWorld {
        let mut world = CollisionWorld::new();

        // Floor at y=0
        world.add_box(
            Vec3::new(0.0, -0.5, 0.0),
            Vec3::new(50.0, 0.5, 50.0),
            SurfaceTags::GROUND,
        );

        // Wall at x=10
        world.add_box(
            Vec3::new(10.0, 2.5, 0.0),
            Vec3::new(0.5, 2.5, 10.0),
            SurfaceTags::OBSTACLE,
        );

        world
    }

    fn ray(origin: Vec3, direction: Vec3) -> Ray {
        Ray::new(origin, direction).unwrap()
    }

    #[test]
    fn test_raycast_hit() {
        let world = create_test_world();

        let hit = world
            .cast_ray(&ray(Vec3::new(0.0, 1.0, 0.0), Vec3::X), 100.0, SurfaceTags::ALL)
            .expect("should hit the wall");

        // Should hit wall at approximately x=9.5
        assert!((hit.point.x - 9.5).abs() < 0.01);
        assert!((hit.distance - 9.5).abs() < 0.01);
        assert!((hit.normal - -Vec3::X).length() < 1e-4);
        assert!(hit.tags.is_obstacle());
    }

    #[test]
    fn test_raycast_miss() {
        let world = create_test_world();

        let hit = world.cast_ray(&ray(Vec3::new(0.0, 1.0, 0.0), -Vec3::X), 100.0, SurfaceTags::ALL);
        assert!(hit.is_none());
    }

    #[test]
    fn test_raycast_respects_max_distance() {
        let world = create_test_world();

        let hit = world.cast_ray(&ray(Vec3::new(0.0, 1.0, 0.0), Vec3::NEG_Y), 0.5, SurfaceTags::ALL);
        assert!(hit.is_none());

        let hit = world.cast_ray(&ray(Vec3::new(0.0, 1.0, 0.0), Vec3::NEG_Y), 1.5, SurfaceTags::ALL);
        assert!(hit.is_some());
    }

    #[test]
    fn test_tag_mask_filtering() {
        let world = create_test_world();

        // The wall is an obstacle; a ground-only mask looks straight through it.
        let hit = world.cast_ray(&ray(Vec3::new(0.0, 1.0, 0.0), Vec3::X), 100.0, SurfaceTags::GROUND);
        assert!(hit.is_none());

        let hit = world.cast_ray(&ray(Vec3::new(0.0, 1.0, 0.0), Vec3::NEG_Y), 5.0, SurfaceTags::GROUND);
        assert!(hit.is_some());
    }

    #[test]
    fn test_ray_from_inside_reports_exit() {
        let mut world = CollisionWorld::new();
        world.add_box(Vec3::ZERO, Vec3::splat(1.0), SurfaceTags::GROUND);

        // Starting at the center, the only boundary within reach is the bottom face.
        let hit = world
            .cast_ray(&ray(Vec3::ZERO, Vec3::NEG_Y), 5.0, SurfaceTags::ALL)
            .expect("should report the exit point");
        assert!((hit.distance - 1.0).abs() < 1e-3);

        // A short ray never reaches the boundary.
        assert!(world.cast_ray(&ray(Vec3::ZERO, Vec3::NEG_Y), 0.5, SurfaceTags::ALL).is_none());
    }

    #[test]
    fn test_ramp_normal() {
        let mut world = CollisionWorld::new();
        let (id, normal) = world.add_ramp(
            Vec3::ZERO,
            Vec3::new(5.0, 0.5, 5.0),
            FRAC_PI_4,
            0.0,
            SurfaceTags::SURFABLE,
        );

        assert!((normal - Vec3::new(0.0, 0.707_106_8, 0.707_106_8)).length() < 1e-4);

        let hit = world
            .cast_ray(&ray(Vec3::new(0.0, 3.0, 0.0), Vec3::NEG_Y), 10.0, SurfaceTags::SURFABLE)
            .expect("should hit the ramp");
        assert_eq!(hit.surface_id, id);
        assert!((hit.normal - normal).length() < 1e-3);
    }

    #[test]
    fn test_convex_hull() {
        let mut world = CollisionWorld::new();
        // A 4x3x4 block; the interior point is dropped by the hull.
        let mut points = vec![Vec3::new(0.0, 1.0, 0.0)];
        for x in [-2.0, 2.0] {
            for y in [0.0, 3.0] {
                for z in [-2.0, 2.0] {
                    points.push(Vec3::new(x, y, z));
                }
            }
        }
        let id = world
            .add_convex_hull(&points, SurfaceTags::OBSTACLE)
            .expect("block is a valid hull");

        let hit = world
            .cast_ray(&ray(Vec3::new(0.5, 10.0, 0.5), Vec3::NEG_Y), 20.0, SurfaceTags::OBSTACLE)
            .expect("should hit the top face");
        assert_eq!(hit.surface_id, id);
        assert!((hit.point.y - 3.0).abs() < 1e-3);
        assert!((hit.normal - Vec3::Y).length() < 1e-3);
    }

    #[test]
    fn test_degenerate_hull_rejected() {
        let mut world = CollisionWorld::new();

        let flat = [
            Vec3::new(-1.0, 0.0, -1.0),
            Vec3::new(1.0, 0.0, -1.0),
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(-1.0, 0.0, 1.0),
        ];
        assert!(matches!(
            world.add_convex_hull(&flat, SurfaceTags::OBSTACLE),
            Err(GeometryError::InvalidHull(4))
        ));

        assert!(matches!(
            world.add_convex_hull(&flat[..3], SurfaceTags::OBSTACLE),
            Err(GeometryError::InvalidHull(3))
        ));

        let with_nan = [flat[0], flat[1], flat[2], Vec3::new(0.0, f32::NAN, 0.0)];
        assert!(world.add_convex_hull(&with_nan, SurfaceTags::OBSTACLE).is_err());

        assert_eq!(world.surface_count(), 0);
    }

    #[test]
    fn test_triangle_mesh() {
        let mut world = CollisionWorld::new();
        let vertices = [
            Vec3::new(-5.0, 0.0, -5.0),
            Vec3::new(5.0, 0.0, -5.0),
            Vec3::new(0.0, 0.0, 5.0),
        ];
        world
            .add_triangle_mesh(&vertices, &[[0, 2, 1]], SurfaceTags::GROUND)
            .unwrap();

        let hit = world.cast_ray(&ray(Vec3::new(0.0, 2.0, 0.0), Vec3::NEG_Y), 5.0, SurfaceTags::GROUND);
        assert!(hit.is_some());
        assert!((hit.unwrap().distance - 2.0).abs() < 1e-3);

        let bad = world.add_triangle_mesh(&vertices, &[[0, 1, 7]], SurfaceTags::GROUND);
        assert!(matches!(bad, Err(GeometryError::InvalidMesh { index: 7, .. })));
        assert!(matches!(
            world.add_triangle_mesh(&vertices, &[], SurfaceTags::GROUND),
            Err(GeometryError::EmptyMesh)
        ));
        assert_eq!(world.surface_count(), 1);
    }
}
