//! Player movement physics for surfing.
//!
//! This module implements surf-style movement with:
//!
//! - Ground acceleration and friction
//! - Air strafing with perpendicular boost and auto-strafe assist
//! - Ramp sliding with a phased gravity reduction
//! - Jumping with cooldown and a bunny-hop grace window
//!
//! # Design
//!
//! Movement is driven by the [`MovementIntegrator`], which takes an
//! [`InputSnapshot`] and advances a [`PlayerBody`] through the collision
//! world one fixed substep at a time.
//!
//! The same inputs, substep sizes and geometry always produce the same
//! outputs.

mod config;
mod integrator;
mod jump;
mod state;

pub use config::{ConfigError, SurfConfig};
pub use integrator::{
    apply_air_drag, apply_friction, clamp_horizontal_speed, damp_surf_slide, wish_direction,
    MovementIntegrator, SubstepReport,
};
pub use jump::{try_jump, JumpController, JumpOutcome, JumpPhase, JUMP_BOOST};
pub use state::{InputSnapshot, MotionState, PlayerBody, SurfPhase, ViewAngles, WorldState};
