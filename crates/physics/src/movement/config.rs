//! Movement and collision tuning constants.
//!
//! All parameters are grouped here for easy tuning. Values use metric units
//! (meters, seconds) except the jump timers, which are in milliseconds.

use std::f32::consts::PI;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::collision::PlayerShape;

/// Errors raised while loading or validating a [`SurfConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Configuration for surf movement physics.
///
/// Loaded once when a simulation starts and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfConfig {
    // ========================================================================
    // Player Dimensions
    // ========================================================================
    /// Collision radius (meters).
    pub player_radius: f32,

    /// Total height (meters).
    pub player_height: f32,

    /// Eye height above the feet (meters).
    pub eye_height: f32,

    // ========================================================================
    // Ground Movement
    // ========================================================================
    /// Target walking speed (meters/second).
    pub movement_speed: f32,

    /// Hard cap on horizontal speed (meters/second).
    pub max_speed: f32,

    /// Ground friction coefficient (1/second).
    pub ground_friction: f32,

    // ========================================================================
    // Air Movement
    // ========================================================================
    /// Base air acceleration (meters/second²).
    pub air_acceleration: f32,

    /// Scale applied to every air-strafe impulse.
    pub air_strafe_multiplier: f32,

    /// Multiplier on air acceleration while strafing nearly perpendicular.
    pub perpendicular_strafe_boost: f32,

    /// Multiplier on air acceleration while pushing straight along the velocity.
    pub forward_air_penalty: f32,

    /// How strongly a pure left/right input is bent toward the ideal strafe
    /// direction (0.0 = off, 1.0 = fully ideal).
    pub auto_strafe_strength: f32,

    /// Horizontal speed needed to use the bunny-hop window (meters/second).
    pub min_air_control_speed: f32,

    /// Horizontal air drag (1/second).
    pub air_drag: f32,

    /// Gravity acceleration (meters/second²).
    pub gravity: f32,

    // ========================================================================
    // Surfing
    // ========================================================================
    /// Gravity scale once fully locked onto a ramp.
    pub surf_gravity_factor: f32,

    /// Tangential slide damping while surfing.
    pub surf_slide_damping: f32,

    /// Fraction of speed kept when flowing from one surface onto another.
    pub momentum_conservation: f32,

    /// How far velocity moves toward the re-projected velocity on a surface
    /// transition (0.0 = ignore, 1.0 = snap).
    pub transition_blend: f32,

    /// Contact normals whose dot product falls below this count as a new surface.
    pub transition_threshold: f32,

    // ========================================================================
    // Jumping (milliseconds)
    // ========================================================================
    /// Base jump velocity (meters/second).
    pub jump_force: f32,

    /// Minimum time between jumps.
    pub jump_cooldown_ms: f32,

    /// Grace period after leaving the ground in which a jump still counts.
    pub bunnyhop_window_ms: f32,

    // ========================================================================
    // Collision
    // ========================================================================
    /// Height above the feet the ground rays start from (meters).
    pub ground_ray_lift: f32,

    /// Extra ground ray length beyond the player radius (meters).
    pub ground_ray_margin: f32,

    /// Gap left between the feet and the ground after snapping (meters).
    pub ground_epsilon: f32,

    /// Steepest slope, from world-up, that still counts as ground (radians).
    pub max_ground_angle: f32,

    /// Steepest surfable slope, from world-up, that is surfed rather than
    /// treated as a wall (radians).
    pub max_surf_angle: f32,

    /// Upward speed above which ground contact is ignored (meters/second).
    pub ground_rise_tolerance: f32,

    /// Number of rays in the spherical surface fan.
    pub surface_ray_count: usize,

    /// Surface fan range as a multiple of the player radius.
    pub surface_range_factor: f32,

    /// Maximum contact normals averaged per frame.
    pub max_contacts_per_frame: usize,

    /// Blend of the averaged normal toward last frame's normal.
    pub transition_smoothing: f32,

    /// Scale on surface pushout and redirection bounce.
    pub spring_factor: f32,

    /// Extra distance added to penetration correction (meters).
    pub pushout_buffer: f32,

    /// Rays per height in the wall ring.
    pub wall_ray_count: usize,

    /// Extra wall ray length beyond the player radius (meters).
    pub wall_ray_margin: f32,

    /// Bounce factor for wall redirection.
    pub wall_bounce_factor: f32,

    /// Velocity fraction removed per wall contact.
    pub wall_friction: f32,

    /// Respawn once the player falls below this height (meters).
    pub out_of_bounds_y: f32,

    // ========================================================================
    // Stability
    // ========================================================================
    /// Blend of the final velocity toward the pre-collision velocity.
    pub velocity_smoothing: f32,

    /// Horizontal speed under which a moving player counts as stuck.
    pub unstuck_speed_threshold: f32,

    /// Stuck frames tolerated before the upward nudge.
    pub unstuck_frame_limit: u32,

    /// Upward velocity added to free a stuck player (meters/second).
    pub unstuck_impulse: f32,

    /// Fixed substeps per frame.
    pub substeps: u32,

    /// Longest frame delta accepted (seconds).
    pub max_frame_delta: f32,
}

impl Default for SurfConfig {
    fn default() -> Self {
        Self {
            // Player dimensions
            player_radius: 0.5,
            player_height: 1.8,
            eye_height: 1.6,

            // Ground movement
            movement_speed: 10.0,
            max_speed: 40.0,
            ground_friction: 4.0,

            // Air movement
            air_acceleration: 40.0,
            air_strafe_multiplier: 1.0,
            perpendicular_strafe_boost: 1.5,
            forward_air_penalty: 0.5,
            auto_strafe_strength: 0.25,
            min_air_control_speed: 2.0,
            air_drag: 0.02,
            gravity: 20.0,

            // Surfing
            surf_gravity_factor: 0.20,
            surf_slide_damping: 0.01,
            momentum_conservation: 0.98,
            transition_blend: 0.5,
            transition_threshold: 0.995,

            // Jumping
            jump_force: 7.0,
            jump_cooldown_ms: 300.0,
            bunnyhop_window_ms: 150.0,

            // Collision
            ground_ray_lift: 0.2,
            ground_ray_margin: 0.1,
            ground_epsilon: 0.01,
            max_ground_angle: PI / 3.5,
            max_surf_angle: 80.0_f32.to_radians(),
            ground_rise_tolerance: 1.0,
            surface_ray_count: 72,
            surface_range_factor: 1.5,
            max_contacts_per_frame: 8,
            transition_smoothing: 0.3,
            spring_factor: 0.2,
            pushout_buffer: 0.02,
            wall_ray_count: 8,
            wall_ray_margin: 0.05,
            wall_bounce_factor: 0.1,
            wall_friction: 0.005,
            out_of_bounds_y: -200.0,

            // Stability
            velocity_smoothing: 0.05,
            unstuck_speed_threshold: 0.5,
            unstuck_frame_limit: 30,
            unstuck_impulse: 3.0,
            substeps: 3,
            max_frame_delta: 0.05,
        }
    }
}

impl SurfConfig {
    /// Create a bunny-hop oriented config: snappier jumps, stronger air control.
    pub fn bhop() -> Self {
        Self {
            air_acceleration: 60.0,
            perpendicular_strafe_boost: 2.0,
            auto_strafe_strength: 0.4,
            jump_cooldown_ms: 150.0,
            bunnyhop_window_ms: 250.0,
            ground_friction: 6.0,
            ..Default::default()
        }
    }

    /// Parse a config from TOML. Missing keys keep their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&source)?;
        log::info!("loaded surf config from {}", path.display());
        Ok(config)
    }

    /// Check every value is usable by the simulation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("player_radius", self.player_radius),
            ("player_height", self.player_height),
            ("movement_speed", self.movement_speed),
            ("max_speed", self.max_speed),
            ("max_ground_angle", self.max_ground_angle),
            ("max_surf_angle", self.max_surf_angle),
            ("surface_range_factor", self.surface_range_factor),
            ("max_frame_delta", self.max_frame_delta),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(invalid(field, format!("must be positive, got {value}")));
            }
        }

        let non_negative = [
            ("eye_height", self.eye_height),
            ("ground_friction", self.ground_friction),
            ("air_acceleration", self.air_acceleration),
            ("air_strafe_multiplier", self.air_strafe_multiplier),
            ("perpendicular_strafe_boost", self.perpendicular_strafe_boost),
            ("forward_air_penalty", self.forward_air_penalty),
            ("min_air_control_speed", self.min_air_control_speed),
            ("air_drag", self.air_drag),
            ("gravity", self.gravity),
            ("surf_slide_damping", self.surf_slide_damping),
            ("jump_force", self.jump_force),
            ("jump_cooldown_ms", self.jump_cooldown_ms),
            ("bunnyhop_window_ms", self.bunnyhop_window_ms),
            ("ground_ray_lift", self.ground_ray_lift),
            ("ground_ray_margin", self.ground_ray_margin),
            ("ground_epsilon", self.ground_epsilon),
            ("ground_rise_tolerance", self.ground_rise_tolerance),
            ("pushout_buffer", self.pushout_buffer),
            ("wall_ray_margin", self.wall_ray_margin),
            ("unstuck_speed_threshold", self.unstuck_speed_threshold),
            ("unstuck_impulse", self.unstuck_impulse),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(field, format!("must be zero or positive, got {value}")));
            }
        }

        let unit = [
            ("auto_strafe_strength", self.auto_strafe_strength),
            ("surf_gravity_factor", self.surf_gravity_factor),
            ("momentum_conservation", self.momentum_conservation),
            ("transition_blend", self.transition_blend),
            ("transition_threshold", self.transition_threshold),
            ("transition_smoothing", self.transition_smoothing),
            ("spring_factor", self.spring_factor),
            ("wall_bounce_factor", self.wall_bounce_factor),
            ("wall_friction", self.wall_friction),
            ("velocity_smoothing", self.velocity_smoothing),
        ];
        for (field, value) in unit {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(field, format!("must lie in [0, 1], got {value}")));
            }
        }

        if !(60..=90).contains(&self.surface_ray_count) {
            return Err(invalid(
                "surface_ray_count",
                format!("must lie in 60..=90, got {}", self.surface_ray_count),
            ));
        }
        if self.max_contacts_per_frame == 0 {
            return Err(invalid("max_contacts_per_frame", "must be at least 1".into()));
        }
        if self.wall_ray_count < 4 {
            return Err(invalid("wall_ray_count", format!("must be at least 4, got {}", self.wall_ray_count)));
        }
        if self.substeps == 0 {
            return Err(invalid("substeps", "must be at least 1".into()));
        }
        if self.max_surf_angle < self.max_ground_angle {
            return Err(invalid(
                "max_surf_angle",
                "must not be shallower than max_ground_angle".into(),
            ));
        }
        if !self.out_of_bounds_y.is_finite() {
            return Err(invalid("out_of_bounds_y", "must be finite".into()));
        }

        Ok(())
    }

    /// The player's collision volume.
    pub fn player_shape(&self) -> PlayerShape {
        PlayerShape {
            radius: self.player_radius,
            height: self.player_height,
        }
    }

    /// Horizontal speed below which the bunny-hop window does not apply, squared.
    #[inline]
    pub fn min_air_control_speed_sq(&self) -> f32 {
        self.min_air_control_speed * self.min_air_control_speed
    }
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::Invalid { field, reason }
}
