//! Contact detection and resolution for the player body.
//!
//! Each call runs up to three ray passes in a fixed order and stops at the
//! first one that produces a contact:
//!
//! 1. **Ground**: a fan of five short downward rays from just above the feet.
//! 2. **Surface**: a dense spherical fan from the center against surf ramps,
//!    averaging every accepted normal.
//! 3. **Wall**: two horizontal rings against obstacles and over-steep ramps.
//!
//! After the winning pass, velocity is re-projected when the contact normal
//! changed noticeably since the previous frame, so chained ramps keep their
//! flow instead of bleeding speed.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::flags::SurfaceTags;
use super::ray::{PlayerShape, SurfaceHit};
use super::world::GeometryProvider;
use crate::math::{
    angle_from_up, fibonacci_sphere, finite_or_zero, nlerp, project_on_plane, ring_directions,
    safe_normalize, Ray,
};
use crate::movement::{MotionState, PlayerBody, SurfConfig, SurfPhase};

/// Which pass produced this frame's contact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContactKind {
    #[default]
    None,
    Ground,
    Surface,
    Wall,
}

/// Summary of one resolution call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactReport {
    /// The pass that resolved the frame.
    pub kind: ContactKind,

    /// Number of contact normals that went into the average.
    pub contacts: usize,

    /// Velocity was re-projected onto a new surface.
    pub transitioned: bool,

    /// The body fell below the out-of-bounds height.
    pub out_of_bounds: bool,
}

/// Per-call scratch for the surface pass.
///
/// Lives only for the duration of one [`CollisionResolver::resolve`] call so
/// nothing leaks from one frame into the next.
struct ContactFrame {
    normals: Vec<Vec3>,
    cap: usize,
    closest: Option<SurfaceHit>,
}

impl ContactFrame {
    fn new(cap: usize) -> Self {
        Self {
            normals: Vec::with_capacity(cap),
            cap,
            closest: None,
        }
    }

    fn push(&mut self, hit: SurfaceHit) {
        if self.normals.len() < self.cap {
            self.normals.push(hit.normal);
        }
        if self.closest.map_or(true, |closest| hit.distance < closest.distance) {
            self.closest = Some(hit);
        }
    }

    fn average_normal(&self) -> Vec3 {
        let sum: Vec3 = self.normals.iter().copied().sum();
        safe_normalize(sum, Vec3::Y)
    }
}

/// Collision resolver with precomputed ray fans.
#[derive(Debug, Clone)]
pub struct CollisionResolver {
    shape: PlayerShape,
    ground_offsets: [Vec3; 5],
    surface_directions: Vec<Vec3>,
    wall_directions: Vec<Vec3>,
}

impl CollisionResolver {
    /// Build the ray fans for the configured player shape.
    pub fn new(config: &SurfConfig) -> Self {
        let shape = config.player_shape();
        let offset = shape.radius * 0.5;

        Self {
            shape,
            ground_offsets: [
                Vec3::ZERO,
                Vec3::new(offset, 0.0, 0.0),
                Vec3::new(-offset, 0.0, 0.0),
                Vec3::new(0.0, 0.0, offset),
                Vec3::new(0.0, 0.0, -offset),
            ],
            surface_directions: fibonacci_sphere(config.surface_ray_count),
            wall_directions: ring_directions(config.wall_ray_count),
        }
    }

    /// Player volume used by the fans.
    pub fn shape(&self) -> PlayerShape {
        self.shape
    }

    /// Detect contacts at the body's position and resolve them.
    ///
    /// Updates the body's position (penetration correction and ground snap),
    /// velocity (redirection) and motion state.
    pub fn resolve(
        &self,
        body: &mut PlayerBody,
        geometry: &dyn GeometryProvider,
        config: &SurfConfig,
        now_ms: f64,
    ) -> ContactReport {
        let previous = body.motion;
        let mut report = ContactReport::default();

        if self.ground_pass(body, geometry, config, now_ms) {
            report.kind = ContactKind::Ground;
            report.contacts = 1;
        } else if let Some(contacts) = self.surface_pass(body, geometry, config, &previous) {
            report.kind = ContactKind::Surface;
            report.contacts = contacts;
        } else if self.wall_pass(body, geometry, config, &previous) {
            report.kind = ContactKind::Wall;
            report.contacts = 1;
        } else {
            body.motion = previous.detached();
        }

        report.transitioned = self.carry_momentum(body, config, &previous);

        body.velocity = finite_or_zero(body.velocity);

        report.out_of_bounds = body.position.y < config.out_of_bounds_y;
        report
    }

    /// Limit a move so the ground rays' origin never crosses ground geometry.
    ///
    /// Casts from the ground-ray height at `from` toward `to`; if ground lies
    /// in between, the move stops just short of it and the next ground pass
    /// picks the contact up.
    pub fn clamp_motion(
        &self,
        geometry: &dyn GeometryProvider,
        config: &SurfConfig,
        from: Vec3,
        to: Vec3,
    ) -> Vec3 {
        let delta = to - from;
        let distance = delta.length();
        if distance <= config.ground_epsilon {
            return to;
        }

        let lift = Vec3::new(0.0, config.ground_ray_lift, 0.0);
        let Some(ray) = Ray::new(self.shape.base(from) + lift, delta) else {
            return to;
        };

        match geometry.cast_ray(&ray, distance, SurfaceTags::GROUND) {
            Some(hit) => from + ray.direction * (hit.distance - config.ground_epsilon).max(0.0),
            None => to,
        }
    }

    // ========================================================================
    // Ground
    // ========================================================================

    fn ground_pass(
        &self,
        body: &mut PlayerBody,
        geometry: &dyn GeometryProvider,
        config: &SurfConfig,
        now_ms: f64,
    ) -> bool {
        // Moving up fast (just jumped, or launched off a ramp): not landing.
        if body.velocity.y > config.ground_rise_tolerance {
            return false;
        }

        let origin = self.shape.base(body.position) + Vec3::new(0.0, config.ground_ray_lift, 0.0);
        let length = self.shape.radius + config.ground_ray_margin;

        let accepted = self.ground_offsets.iter().find_map(|offset| {
            let ray = Ray::new(origin + *offset, Vec3::NEG_Y)?;
            let hit = geometry.cast_ray(&ray, length, SurfaceTags::MASK_GROUND_PASS)?;
            (angle_from_up(hit.normal) < config.max_ground_angle).then_some(hit)
        });

        let Some(hit) = accepted else {
            return false;
        };

        body.position.y = hit.point.y + self.shape.half_height() + config.ground_epsilon;
        if body.velocity.y < 0.0 {
            body.velocity.y = 0.0;
        }

        let surfable = hit.tags.is_surfable();
        if surfable {
            body.velocity = remove_inward(body.velocity, hit.normal, 0.0);
        }

        body.last_ground_time_ms = now_ms;
        body.motion = MotionState::Grounded {
            normal: hit.normal,
            surfable,
        };

        true
    }

    // ========================================================================
    // Surface
    // ========================================================================

    fn surface_pass(
        &self,
        body: &mut PlayerBody,
        geometry: &dyn GeometryProvider,
        config: &SurfConfig,
        previous: &MotionState,
    ) -> Option<usize> {
        let range = self.shape.radius * config.surface_range_factor;
        let mut frame = ContactFrame::new(config.max_contacts_per_frame);

        for direction in &self.surface_directions {
            let Some(ray) = Ray::new(body.position, *direction) else {
                continue;
            };
            let Some(hit) = geometry.cast_ray(&ray, range, SurfaceTags::SURFABLE) else {
                continue;
            };
            if angle_from_up(hit.normal) <= config.max_surf_angle {
                frame.push(hit);
            }
        }

        let closest = frame.closest?;

        let average = frame.average_normal();
        let normal = match previous.surface_normal() {
            Some(last) => nlerp(average, last, config.transition_smoothing, average),
            None => average,
        };

        let penetration = closest.penetration(self.shape.radius);
        if penetration > 0.0 {
            body.position += normal * (penetration + config.pushout_buffer) * config.spring_factor;
        }

        body.velocity = remove_inward(body.velocity, normal, config.spring_factor);

        let phase = match previous {
            MotionState::Surfing { phase, .. } => *phase,
            _ => SurfPhase::None,
        };
        body.motion = MotionState::Surfing { normal, phase };

        Some(frame.normals.len())
    }

    // ========================================================================
    // Walls
    // ========================================================================

    fn wall_pass(
        &self,
        body: &mut PlayerBody,
        geometry: &dyn GeometryProvider,
        config: &SurfConfig,
        previous: &MotionState,
    ) -> bool {
        let range = self.shape.radius + config.wall_ray_margin;
        let quarter = self.shape.height * 0.25;

        let mut closest: Option<SurfaceHit> = None;
        for height in [-quarter, quarter] {
            let origin = body.position + Vec3::new(0.0, height, 0.0);
            for direction in &self.wall_directions {
                let Some(ray) = Ray::new(origin, *direction) else {
                    continue;
                };
                let Some(hit) = geometry.cast_ray(&ray, range, SurfaceTags::MASK_WALL_PASS) else {
                    continue;
                };
                let is_wall = hit.tags.is_obstacle()
                    || (hit.tags.is_surfable() && angle_from_up(hit.normal) > config.max_surf_angle);
                if is_wall && closest.map_or(true, |c| hit.distance < c.distance) {
                    closest = Some(hit);
                }
            }
        }

        let Some(hit) = closest else {
            return false;
        };

        let penetration = hit.penetration(self.shape.radius);
        if penetration > 0.0 {
            body.position += hit.normal * (penetration + config.pushout_buffer);
        }

        body.velocity = remove_inward(body.velocity, hit.normal, config.wall_bounce_factor);
        body.velocity *= 1.0 - config.wall_friction;

        body.motion = if hit.tags.is_surfable() {
            let phase = match previous {
                MotionState::Surfing { phase, .. } => *phase,
                _ => SurfPhase::None,
            };
            MotionState::Surfing {
                normal: hit.normal,
                phase,
            }
        } else {
            previous.detached()
        };

        true
    }

    // ========================================================================
    // Surface transitions
    // ========================================================================

    fn carry_momentum(&self, body: &mut PlayerBody, config: &SurfConfig, previous: &MotionState) -> bool {
        let (Some(before), Some(after)) = (previous.contact_normal(), body.motion.contact_normal()) else {
            return false;
        };
        if before.dot(after) >= config.transition_threshold {
            return false;
        }
        if body.velocity.length_squared() < 1e-8 {
            return false;
        }

        let projected = project_on_plane(body.velocity, after) * config.momentum_conservation;
        body.velocity = body.velocity.lerp(projected, config.transition_blend);
        true
    }
}

/// Strip the part of `velocity` heading into the surface and add a small
/// push back out, proportional to what was removed.
fn remove_inward(velocity: Vec3, normal: Vec3, bounce: f32) -> Vec3 {
    let into = velocity.dot(normal);
    if into >= 0.0 {
        return velocity;
    }
    velocity - normal * into + normal * (into.abs() * bounce)
}

// ============================================================================
// Tests
// ============================================================================
