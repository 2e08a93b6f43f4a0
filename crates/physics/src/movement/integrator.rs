//! Player movement integrator.
//!
//! This is the main entry point for player movement. One call to
//! [`MovementIntegrator::substep`] advances the body by one fixed substep:
//! forces, input, position and collision response.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::collision::{CollisionResolver, ContactReport, GeometryProvider};
use crate::math::{finite_or_zero, horizontal, nlerp, project_on_plane, safe_normalize};

use super::config::SurfConfig;
use super::jump::{try_jump, JumpOutcome};
use super::state::{InputSnapshot, MotionState, PlayerBody, ViewAngles, WorldState};

/// Horizontal speeds below this count as standing still for strafing.
const STRAFE_MIN_SPEED: f32 = 0.1;

/// What happened during one substep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubstepReport {
    pub jump: JumpOutcome,
    pub contact: ContactReport,
    /// The unstuck impulse fired.
    pub unstuck: bool,
}

/// Player movement integrator.
///
/// Handles all per-substep movement physics:
/// - Gravity scaled by surf phase
/// - Ground acceleration and friction
/// - Air strafing and air drag
/// - Surf slide damping and the speed cap
/// - Collision response through the [`CollisionResolver`]
///
/// # Example
///
/// ```ignore
/// let integrator = MovementIntegrator::new(SurfConfig::default());
/// let mut body = PlayerBody::new(spawn, 0.0);
///
/// // Each substep:
/// integrator.substep(&mut body, &world_state, &input, &geometry, dt, now_ms);
/// ```
#[derive(Debug, Clone)]
pub struct MovementIntegrator {
    config: SurfConfig,
    resolver: CollisionResolver,
}

impl MovementIntegrator {
    /// Create an integrator with the given configuration.
    pub fn new(config: SurfConfig) -> Self {
        let resolver = CollisionResolver::new(&config);
        Self { config, resolver }
    }

    /// Create an integrator with default configuration.
    pub fn with_default_config() -> Self {
        Self::new(SurfConfig::default())
    }

    pub fn config(&self) -> &SurfConfig {
        &self.config
    }

    pub fn resolver(&self) -> &CollisionResolver {
        &self.resolver
    }

    /// Advance `body` by one substep of `dt` seconds ending at clock time `now_ms`.
    ///
    /// The body's view angles must already be updated for this frame, and any
    /// jump pulse must already be registered on `body.jump`.
    pub fn substep(
        &self,
        body: &mut PlayerBody,
        world: &WorldState,
        input: &InputSnapshot,
        geometry: &dyn GeometryProvider,
        dt: f32,
        now_ms: f64,
    ) -> SubstepReport {
        let config = &self.config;
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        // Timers and jump
        body.jump.tick(dt * 1000.0);
        let jump = try_jump(body, now_ms, config);

        // Surf phase and gravity
        if let MotionState::Surfing { normal, phase } = body.motion {
            body.motion = MotionState::Surfing {
                normal,
                phase: phase.advance(),
            };
        }
        let gravity_scale = body.surfing_state().gravity_scale(config.surf_gravity_factor);
        body.velocity += world.gravity * gravity_scale * dt;

        // Input
        body.wish_dir = wish_direction(&body.view, input);

        if body.on_ground() {
            self.ground_accelerate(body, dt);
            let reference = brake_reference(body);
            apply_friction(&mut body.velocity, reference, world.ground_friction, dt);
        } else {
            body.brake_speed = None;
            self.air_strafe(body, input, dt);
            apply_air_drag(&mut body.velocity, world.air_drag, dt);
        }

        if body.on_surface() && !body.on_ground() {
            if let Some(normal) = body.surface_normal() {
                body.velocity = damp_surf_slide(body.velocity, normal, config.surf_slide_damping, dt);
            }
        }

        body.velocity = clamp_horizontal_speed(body.velocity, config.max_speed);
        let unstuck = self.unstick(body, input);

        // Integrate and resolve
        let pre_collision = body.velocity;
        let start = body.position;
        let target = self
            .resolver
            .clamp_motion(geometry, config, start, start + body.velocity * dt);
        body.position = if target.is_finite() { target } else { start };

        let contact = self.resolver.resolve(body, geometry, config, now_ms);

        body.velocity = smooth_velocity(body, pre_collision, config.velocity_smoothing);
        body.previous_velocity = pre_collision;

        SubstepReport {
            jump,
            contact,
            unstuck,
        }
    }

    // ========================================================================
    // Ground Movement
    // ========================================================================

    fn ground_accelerate(&self, body: &mut PlayerBody, dt: f32) {
        if body.wish_dir == Vec3::ZERO {
            return;
        }

        let target = body.wish_dir * self.config.movement_speed;
        let change = (target - horizontal(body.velocity))
            .clamp_length_max(self.config.movement_speed * 10.0 * dt);

        body.velocity.x += change.x;
        body.velocity.z += change.z;
    }

    // ========================================================================
    // Air Movement
    // ========================================================================

    fn air_strafe(&self, body: &mut PlayerBody, input: &InputSnapshot, dt: f32) {
        let config = &self.config;
        let flat = horizontal(body.velocity);
        let speed = flat.length();

        body.strafe_dir = if speed > STRAFE_MIN_SPEED {
            flat / speed
        } else {
            body.wish_dir
        };

        if body.wish_dir == Vec3::ZERO {
            return;
        }

        let mut wish = body.wish_dir;

        // Pure sideways input leans toward the perpendicular of travel.
        if input.pure_strafe() && config.auto_strafe_strength > 0.0 && speed > STRAFE_MIN_SPEED {
            let mut perpendicular = Vec3::new(-body.strafe_dir.z, 0.0, body.strafe_dir.x);
            if perpendicular.dot(wish) < 0.0 {
                perpendicular = -perpendicular;
            }
            wish = nlerp(wish, perpendicular, config.auto_strafe_strength, wish);
        }

        let alignment = wish.dot(body.strafe_dir);
        let mut acceleration = config.air_acceleration;
        if alignment > 0.9 {
            acceleration *= config.forward_air_penalty;
        } else if alignment.abs() < 0.3 {
            acceleration *= config.perpendicular_strafe_boost;
        }

        let impulse = acceleration * dt * (1.0 - alignment.abs()) * config.air_strafe_multiplier;
        body.velocity += wish * impulse;
    }

    // ========================================================================
    // Safeguards
    // ========================================================================

    /// The limit is in frames; the counter runs once per substep.
    fn unstick(&self, body: &mut PlayerBody, input: &InputSnapshot) -> bool {
        if !input.has_movement() || body.horizontal_speed() >= self.config.unstuck_speed_threshold {
            body.stuck_substeps = 0;
            return false;
        }

        body.stuck_substeps += 1;
        let limit = self.config.unstuck_frame_limit.saturating_mul(self.config.substeps.max(1));
        if body.stuck_substeps <= limit {
            return false;
        }

        body.velocity.y += self.config.unstuck_impulse;
        body.stuck_substeps = 0;
        log::debug!("unstuck impulse at {:?}", body.position);
        true
    }
}

/// Normalized horizontal direction the input asks for, or zero.
pub fn wish_direction(view: &ViewAngles, input: &InputSnapshot) -> Vec3 {
    let wish = view.forward() * input.forward_axis() + view.right() * input.right_axis();
    safe_normalize(wish, Vec3::ZERO)
}

/// Speed that ground friction is proportional to this substep.
///
/// Without movement input the body brakes at a constant rate set by its speed
/// when braking began, so speed falls linearly to zero. With input, friction
/// follows the current speed.
fn brake_reference(body: &mut PlayerBody) -> f32 {
    let speed = body.horizontal_speed();
    if body.wish_dir != Vec3::ZERO {
        body.brake_speed = None;
        return speed;
    }

    let reference = match body.brake_speed {
        Some(start) if start >= speed => start,
        _ => speed,
    };
    body.brake_speed = Some(reference);
    reference
}

/// Take `reference_speed * friction * dt` off the horizontal speed. Never reverses.
pub fn apply_friction(velocity: &mut Vec3, reference_speed: f32, friction: f32, dt: f32) {
    let speed = horizontal(*velocity).length();
    if speed <= 0.0 {
        return;
    }

    let new_speed = (speed - reference_speed * friction * dt).max(0.0);
    let factor = new_speed / speed;
    velocity.x *= factor;
    velocity.z *= factor;
}

/// Scale horizontal velocity by `1 - drag * dt`.
pub fn apply_air_drag(velocity: &mut Vec3, drag: f32, dt: f32) {
    let factor = (1.0 - drag * dt).max(0.0);
    velocity.x *= factor;
    velocity.z *= factor;
}

/// Slow the along-ramp part of `velocity` slightly without reversing it.
pub fn damp_surf_slide(velocity: Vec3, normal: Vec3, damping: f32, dt: f32) -> Vec3 {
    let tangential = project_on_plane(velocity, normal);
    let mut damp = tangential * (damping * dt * 3.0);
    if damp.length_squared() > tangential.length_squared() {
        damp = tangential;
    }
    velocity - damp
}

/// Uniformly scale the horizontal part of `velocity` down to `max_speed`.
pub fn clamp_horizontal_speed(velocity: Vec3, max_speed: f32) -> Vec3 {
    let flat = horizontal(velocity);
    let speed = flat.length();
    if speed <= max_speed || speed <= 0.0 {
        return velocity;
    }

    let scaled = flat * (max_speed / speed);
    Vec3::new(scaled.x, velocity.y, scaled.z)
}

/// Blend the resolved velocity back toward the pre-collision one, without
/// driving it into the current contact again.
fn smooth_velocity(body: &PlayerBody, pre_collision: Vec3, smoothing: f32) -> Vec3 {
    let mut velocity = body.velocity.lerp(pre_collision, smoothing);

    if let Some(normal) = body.motion.contact_normal() {
        let into = velocity.dot(normal);
        if into < 0.0 {
            velocity -= normal * into;
        }
    }

    finite_or_zero(velocity)
}

// ============================================================================
// Tests
// ============================================================================
