//! Jump state management.
//!
//! A jump request is a one-frame pulse. It is accepted when the player is not
//! already mid-jump, the cooldown has run out, and the body has support:
//! ground, a ramp, or the bunny-hop grace window with enough horizontal speed.

use serde::{Deserialize, Serialize};

use super::config::SurfConfig;
use super::state::{MotionState, PlayerBody};

/// Multiplier applied on top of the configured jump force.
pub const JUMP_BOOST: f32 = 1.2;

/// Externally visible jump phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JumpPhase {
    Idle,
    Requested,
    InProgress,
}

/// What happened to a jump attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JumpOutcome {
    /// Nothing was requested.
    NotRequested,
    /// The jump fired.
    Executed,
    /// Rejected: the previous jump has not touched down yet.
    InProgress,
    /// Rejected: cooldown still running.
    Cooldown,
    /// Rejected: no ground, no ramp, and outside the bunny-hop window.
    NoSupport,
}

/// Jump request and cooldown tracking.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JumpController {
    /// Pending request pulse for the current frame.
    requested: bool,

    /// Time remaining before another jump may fire (ms). Can go negative.
    cooldown_ms: f32,
}

impl JumpController {
    /// Create a new jump controller.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a jump request for this frame.
    pub fn request(&mut self) {
        self.requested = true;
    }

    /// Drop a request that was not consumed this frame.
    pub fn expire_request(&mut self) {
        self.requested = false;
    }

    #[inline]
    pub fn is_requested(&self) -> bool {
        self.requested
    }

    /// Count the cooldown down. Runs every substep regardless of jump state.
    pub fn tick(&mut self, delta_ms: f32) {
        if self.cooldown_ms > 0.0 {
            self.cooldown_ms -= delta_ms;
        }
    }

    /// Check if jump is on cooldown.
    #[inline]
    pub fn on_cooldown(&self) -> bool {
        self.cooldown_ms > 0.0
    }

    /// Get remaining cooldown time in milliseconds.
    pub fn cooldown_remaining(&self) -> f32 {
        self.cooldown_ms.max(0.0)
    }

    /// Clear every piece of jump state.
    pub fn reset(&mut self) {
        self.requested = false;
        self.cooldown_ms = 0.0;
    }

    /// Current phase given the body's contact state.
    pub fn phase(&self, motion: &MotionState) -> JumpPhase {
        if motion.jump_in_progress() {
            JumpPhase::InProgress
        } else if self.requested {
            JumpPhase::Requested
        } else {
            JumpPhase::Idle
        }
    }
}

/// Try to execute a pending jump on `body`.
///
/// On success the vertical velocity becomes `jump_force * JUMP_BOOST`, the
/// body enters [`MotionState::Jumping`] (dropping ground, surface and surf
/// phase), the cooldown restarts, and the last ground time is pushed back by
/// half the bunny-hop window so the same window cannot fire twice.
pub fn try_jump(body: &mut PlayerBody, now_ms: f64, config: &SurfConfig) -> JumpOutcome {
    if !body.jump.requested {
        return JumpOutcome::NotRequested;
    }
    if body.motion.jump_in_progress() {
        return JumpOutcome::InProgress;
    }
    if body.jump.on_cooldown() {
        return JumpOutcome::Cooldown;
    }
    if !body.can_jump(now_ms, config) {
        return JumpOutcome::NoSupport;
    }

    body.velocity.y = config.jump_force * JUMP_BOOST;
    body.motion = MotionState::Jumping;
    body.jump.requested = false;
    body.jump.cooldown_ms = config.jump_cooldown_ms;
    body.last_ground_time_ms -= f64::from(config.bunnyhop_window_ms) * 0.5;

    log::debug!(
        "jump at t={:.1}ms pos={:?} horizontal_speed={:.2}",
        now_ms,
        body.position,
        body.horizontal_speed()
    );

    JumpOutcome::Executed
}

// ============================================================================
// Tests
// ============================================================================
