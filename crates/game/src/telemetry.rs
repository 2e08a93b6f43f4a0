//! Read-only snapshots for renderers and HUDs.
//!
//! Everything here is a copy. Nothing handed out can reach back into the
//! simulation.

use std::fmt;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use surfline_physics::{ContactKind, JumpPhase, PlayerBody, SurfConfig, SurfPhase};

use crate::checkpoint::CheckpointId;

/// Position and orientation for a camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerTransform {
    /// Center of the player volume.
    pub position: Vec3,
    pub eye_position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    /// Unit look direction including pitch.
    pub look_direction: Vec3,
}

impl PlayerTransform {
    pub fn from_body(body: &PlayerBody, config: &SurfConfig) -> Self {
        Self {
            position: body.position,
            eye_position: body.eye_position(config),
            yaw: body.view.yaw,
            pitch: body.view.pitch,
            look_direction: body.view.look_direction(),
        }
    }
}

/// Debug values for a HUD.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Telemetry {
    /// Frames advanced so far.
    pub frame: u64,

    /// Simulation clock (ms).
    pub clock_ms: f64,

    /// Horizontal speed (m/s).
    pub speed: f32,

    pub vertical_speed: f32,
    pub on_ground: bool,
    pub on_surface: bool,
    pub surf_phase: SurfPhase,
    pub jump_phase: JumpPhase,
    pub jump_cooldown_ms: f32,
    pub can_jump: bool,

    /// Pass that resolved the last substep.
    pub contact: ContactKind,

    /// Active checkpoint, if any.
    pub checkpoint: Option<CheckpointId>,

    /// Respawns so far.
    pub respawns: u32,
}

impl Telemetry {
    pub fn capture(
        frame: u64,
        clock_ms: f64,
        body: &PlayerBody,
        config: &SurfConfig,
        contact: ContactKind,
        checkpoint: Option<CheckpointId>,
        respawns: u32,
    ) -> Self {
        Self {
            frame,
            clock_ms,
            speed: body.horizontal_speed(),
            vertical_speed: body.velocity.y,
            on_ground: body.on_ground(),
            on_surface: body.on_surface(),
            surf_phase: body.surfing_state(),
            jump_phase: body.jump.phase(&body.motion),
            jump_cooldown_ms: body.jump.cooldown_remaining(),
            can_jump: body.can_jump(clock_ms, config),
            contact,
            checkpoint,
            respawns,
        }
    }
}

impl fmt::Display for Telemetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "frame {} t={:.0}ms speed={:.2} vy={:.2} ground={} surf={} phase={:?} jump={:?} contact={:?}",
            self.frame,
            self.clock_ms,
            self.speed,
            self.vertical_speed,
            self.on_ground,
            self.on_surface,
            self.surf_phase,
            self.jump_phase,
            self.contact
        )?;
        if let Some(id) = self.checkpoint {
            write!(f, " checkpoint={}", id)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use surfline_physics::MotionState;

    #[test]
    fn test_capture_reflects_body() {
        let config = SurfConfig::default();
        let mut body = PlayerBody::new(Vec3::new(1.0, 2.0, 3.0), 0.0);
        body.velocity = Vec3::new(3.0, -1.0, 4.0);
        body.motion = MotionState::Grounded {
            normal: Vec3::Y,
            surfable: false,
        };

        let telemetry = Telemetry::capture(7, 116.0, &body, &config, ContactKind::Ground, Some(2), 1);

        assert_eq!(telemetry.frame, 7);
        assert!((telemetry.speed - 5.0).abs() < 1e-5);
        assert_eq!(telemetry.vertical_speed, -1.0);
        assert!(telemetry.on_ground && !telemetry.on_surface);
        assert!(telemetry.can_jump);
        assert_eq!(telemetry.jump_phase, JumpPhase::Idle);
        assert!(telemetry.to_string().contains("checkpoint=2"));
    }

    #[test]
    fn test_transform_eye_above_center() {
        let config = SurfConfig::default();
        let body = PlayerBody::new(Vec3::new(0.0, 10.0, 0.0), 0.0);
        let transform = PlayerTransform::from_body(&body, &config);

        let expected = 10.0 - config.player_height * 0.5 + config.eye_height;
        assert!((transform.eye_position.y - expected).abs() < 1e-5);
        assert!((transform.look_direction - Vec3::X).length() < 1e-5);
    }
}
