//! Player input handling.
//!
//! This module converts raw held-key and mouse state into the per-frame
//! [`InputSnapshot`] the physics consumes.

use serde::{Deserialize, Serialize};
use surfline_physics::InputSnapshot;

/// Radians per mouse pixel at sensitivity 1.0.
const RADIANS_PER_PIXEL: f32 = 0.001;

/// Raw player input for a single frame.
///
/// This is the input format received from the host's input system. It gets
/// converted to an [`InputSnapshot`] by [`InputState`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerInput {
    /// Movement keys held.
    pub movement: MovementInput,

    /// Mouse delta this frame (pixels).
    pub mouse_delta: (f32, f32),

    /// Jump key held.
    pub jump: bool,
}

/// Movement key states.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct MovementInput {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

impl PlayerInput {
    /// Check if any movement input is active.
    pub fn has_movement(&self) -> bool {
        self.movement.forward || self.movement.backward || self.movement.left || self.movement.right
    }
}

/// Tracks held-key edges across frames.
///
/// A held jump key produces one jump pulse on the frame it goes down; the key
/// must be released before it can pulse again.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputState {
    /// Mouse sensitivity multiplier.
    pub mouse_sensitivity: f32,

    jump_held: bool,
}

impl Default for InputState {
    fn default() -> Self {
        Self::new(2.0)
    }
}

impl InputState {
    pub fn new(mouse_sensitivity: f32) -> Self {
        Self {
            mouse_sensitivity,
            jump_held: false,
        }
    }

    /// Convert this frame's raw input into a snapshot.
    pub fn snapshot(&mut self, input: &PlayerInput) -> InputSnapshot {
        let jump_requested = input.jump && !self.jump_held;
        self.jump_held = input.jump;

        // Mouse right turns right (yaw up), mouse down looks down (pitch up).
        let radians = self.mouse_sensitivity * RADIANS_PER_PIXEL;

        InputSnapshot {
            move_forward: input.movement.forward,
            move_backward: input.movement.backward,
            move_left: input.movement.left,
            move_right: input.movement.right,
            jump_requested,
            camera_yaw_delta: input.mouse_delta.0 * radians,
            camera_pitch_delta: input.mouse_delta.1 * radians,
        }
    }

    /// Forget the held jump key, e.g. after focus loss.
    pub fn release_all(&mut self) {
        self.jump_held = false;
    }
}
