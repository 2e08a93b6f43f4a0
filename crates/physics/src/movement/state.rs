//! Player body, contact state machine and per-frame input.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::config::SurfConfig;
use super::jump::JumpController;
use crate::math::horizontal;

/// How "locked in" the player is to a ramp. Drives the gravity scale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SurfPhase {
    #[default]
    None = 0,
    Transitioning = 1,
    Full = 2,
}

impl SurfPhase {
    /// Next phase while the player stays on a ramp. Saturates at `Full`.
    pub fn advance(self) -> Self {
        match self {
            Self::None => Self::Transitioning,
            Self::Transitioning | Self::Full => Self::Full,
        }
    }

    /// Gravity multiplier for this phase.
    pub fn gravity_scale(self, surf_gravity_factor: f32) -> f32 {
        match self {
            Self::None => 1.0,
            Self::Transitioning => 0.5,
            Self::Full => surf_gravity_factor,
        }
    }
}

/// Contact state of the player.
///
/// Exactly one variant holds per frame, which makes the resolver's ordering
/// ("ground wins over surface, surface wins over wall") part of the type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum MotionState {
    /// No contact and not in a jump.
    #[default]
    Airborne,

    /// Left the ground through a jump; no contact since.
    Jumping,

    /// Standing on walkable ground.
    Grounded {
        /// Unit normal of the ground.
        normal: Vec3,
        /// The ground is also a surf ramp.
        surfable: bool,
    },

    /// Sliding on a ramp without ground contact.
    Surfing {
        /// Smoothed unit contact normal.
        normal: Vec3,
        phase: SurfPhase,
    },
}

impl MotionState {
    #[inline]
    pub fn on_ground(&self) -> bool {
        matches!(self, Self::Grounded { .. })
    }

    #[inline]
    pub fn on_surface(&self) -> bool {
        matches!(self, Self::Surfing { .. } | Self::Grounded { surfable: true, .. })
    }

    #[inline]
    pub fn jump_in_progress(&self) -> bool {
        matches!(self, Self::Jumping)
    }

    /// Surf normal, present only while [`on_surface`](Self::on_surface) holds.
    pub fn surface_normal(&self) -> Option<Vec3> {
        match *self {
            Self::Surfing { normal, .. } | Self::Grounded { normal, surfable: true } => Some(normal),
            _ => None,
        }
    }

    /// Normal of whatever the player is touching, ground or ramp.
    pub fn contact_normal(&self) -> Option<Vec3> {
        match *self {
            Self::Surfing { normal, .. } | Self::Grounded { normal, .. } => Some(normal),
            Self::Airborne | Self::Jumping => None,
        }
    }

    pub fn surf_phase(&self) -> SurfPhase {
        match *self {
            Self::Surfing { phase, .. } => phase,
            _ => SurfPhase::None,
        }
    }

    /// State after losing every contact: a jump stays a jump.
    pub fn detached(&self) -> Self {
        match self {
            Self::Jumping => Self::Jumping,
            _ => Self::Airborne,
        }
    }
}

/// Camera orientation in radians.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewAngles {
    /// Looking up/down, clamped just short of vertical.
    pub pitch: f32,
    /// Looking left/right, wrapped to -PI..PI.
    pub yaw: f32,
}

impl ViewAngles {
    const PITCH_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

    /// Apply camera deltas, clamping pitch and wrapping yaw.
    pub fn apply(&mut self, yaw_delta: f32, pitch_delta: f32) {
        if yaw_delta.is_finite() {
            self.yaw += yaw_delta;
        }
        if pitch_delta.is_finite() {
            self.pitch += pitch_delta;
        }

        self.pitch = self.pitch.clamp(-Self::PITCH_LIMIT, Self::PITCH_LIMIT);

        while self.yaw > std::f32::consts::PI {
            self.yaw -= std::f32::consts::TAU;
        }
        while self.yaw < -std::f32::consts::PI {
            self.yaw += std::f32::consts::TAU;
        }
    }

    /// Horizontal forward direction.
    pub fn forward(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        Vec3::new(cos_yaw, 0.0, sin_yaw)
    }

    /// Horizontal right direction.
    pub fn right(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        Vec3::new(-sin_yaw, 0.0, cos_yaw)
    }

    /// Full look direction including pitch.
    pub fn look_direction(&self) -> Vec3 {
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        Vec3::new(cos_pitch * cos_yaw, -sin_pitch, cos_pitch * sin_yaw)
    }
}

/// Normalized input for one frame, produced by the host's input layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InputSnapshot {
    pub move_forward: bool,
    pub move_backward: bool,
    pub move_left: bool,
    pub move_right: bool,
    /// Edge pulse: true only on the frame the jump key went down.
    pub jump_requested: bool,
    /// Camera yaw change this frame (radians).
    pub camera_yaw_delta: f32,
    /// Camera pitch change this frame (radians).
    pub camera_pitch_delta: f32,
}

impl InputSnapshot {
    /// Forward minus backward, in {-1, 0, 1}.
    #[inline]
    pub fn forward_axis(&self) -> f32 {
        axis(self.move_forward, self.move_backward)
    }

    /// Right minus left, in {-1, 0, 1}.
    #[inline]
    pub fn right_axis(&self) -> f32 {
        axis(self.move_right, self.move_left)
    }

    /// Check if any movement key is held.
    #[inline]
    pub fn has_movement(&self) -> bool {
        self.move_forward || self.move_backward || self.move_left || self.move_right
    }

    /// Only a sideways key is effectively held.
    #[inline]
    pub fn pure_strafe(&self) -> bool {
        self.forward_axis() == 0.0 && self.right_axis() != 0.0
    }
}

fn axis(positive: bool, negative: bool) -> f32 {
    match (positive, negative) {
        (true, false) => 1.0,
        (false, true) => -1.0,
        _ => 0.0,
    }
}

/// The simulated player.
///
/// Created once when the simulation starts and reset in place on respawn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerBody {
    /// Center of the collision volume in world space.
    pub position: Vec3,

    /// Velocity in world space (meters/second). Always finite.
    pub velocity: Vec3,

    /// Velocity at the start of the last substep.
    pub previous_velocity: Vec3,

    /// Camera orientation.
    pub view: ViewAngles,

    /// Contact state machine.
    pub motion: MotionState,

    /// Jump request, cooldown and acceptance rules.
    pub jump: JumpController,

    /// Simulation clock time of the last ground contact (ms).
    pub last_ground_time_ms: f64,

    /// Direction the player is trying to move, recomputed every substep.
    pub wish_dir: Vec3,

    /// Horizontal reference direction for air strafing, recomputed every substep.
    pub strafe_dir: Vec3,

    /// Horizontal speed when the current stretch of unassisted ground braking began.
    pub brake_speed: Option<f32>,

    /// Consecutive stuck substeps.
    pub stuck_substeps: u32,
}

impl PlayerBody {
    /// Create a player at `position`, airborne, at clock time `now_ms`.
    pub fn new(position: Vec3, now_ms: f64) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            previous_velocity: Vec3::ZERO,
            view: ViewAngles::default(),
            motion: MotionState::Airborne,
            jump: JumpController::default(),
            last_ground_time_ms: now_ms,
            wish_dir: Vec3::ZERO,
            strafe_dir: Vec3::ZERO,
            brake_speed: None,
            stuck_substeps: 0,
        }
    }

    /// Put the player back at `point` as if freshly spawned.
    ///
    /// The body starts airborne and falls onto whatever is below. The view
    /// direction is kept.
    pub fn reset_to(&mut self, point: Vec3, now_ms: f64) {
        self.position = point;
        self.velocity = Vec3::ZERO;
        self.previous_velocity = Vec3::ZERO;
        self.motion = MotionState::Airborne;
        self.jump.reset();
        self.last_ground_time_ms = now_ms;
        self.wish_dir = Vec3::ZERO;
        self.strafe_dir = Vec3::ZERO;
        self.brake_speed = None;
        self.stuck_substeps = 0;
    }

    #[inline]
    pub fn on_ground(&self) -> bool {
        self.motion.on_ground()
    }

    #[inline]
    pub fn on_surface(&self) -> bool {
        self.motion.on_surface()
    }

    #[inline]
    pub fn surface_normal(&self) -> Option<Vec3> {
        self.motion.surface_normal()
    }

    #[inline]
    pub fn jump_in_progress(&self) -> bool {
        self.motion.jump_in_progress()
    }

    #[inline]
    pub fn surfing_state(&self) -> SurfPhase {
        self.motion.surf_phase()
    }

    /// Get current horizontal speed.
    pub fn horizontal_speed(&self) -> f32 {
        horizontal(self.velocity).length()
    }

    /// Whether the body has support for a jump right now.
    ///
    /// True while grounded, on a ramp, or inside the bunny-hop window with
    /// enough horizontal speed.
    pub fn can_jump(&self, now_ms: f64, config: &SurfConfig) -> bool {
        if self.on_ground() || self.on_surface() {
            return true;
        }
        let since_ground = now_ms - self.last_ground_time_ms;
        since_ground < f64::from(config.bunnyhop_window_ms)
            && horizontal(self.velocity).length_squared() >= config.min_air_control_speed_sq()
    }

    /// Eye position for a camera.
    pub fn eye_position(&self, config: &SurfConfig) -> Vec3 {
        let shape = config.player_shape();
        shape.base(self.position) + Vec3::new(0.0, config.eye_height, 0.0)
    }
}

/// World-level simulation values.
///
/// Everything here is fixed for the session except `respawn_point`, which
/// checkpoints move forward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldState {
    /// Gravity acceleration vector.
    pub gravity: Vec3,

    /// Ground friction coefficient (1/second).
    pub ground_friction: f32,

    /// Horizontal air drag (1/second).
    pub air_drag: f32,

    /// Where the player reappears after a fall or reset.
    pub respawn_point: Vec3,
}

impl WorldState {
    /// Build world values from a config, spawning at `spawn`.
    pub fn from_config(config: &SurfConfig, spawn: Vec3) -> Self {
        Self {
            gravity: Vec3::new(0.0, -config.gravity, 0.0),
            ground_friction: config.ground_friction,
            air_drag: config.air_drag,
            respawn_point: spawn,
        }
    }
}
