//! Surfline Game Logic
//!
//! This crate drives the surf physics for one player on one map:
//!
//! - Map construction (geometry, spawn, checkpoints)
//! - Checkpoints and respawning
//! - Input translation from held keys to per-frame snapshots
//! - The fixed-substep frame loop
//! - Read-only telemetry for renderers and HUDs
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        Simulation                            │
//! │  ┌──────────┐    ┌────────────────┐    ┌──────────────────┐  │
//! │  │ Input    │───►│ Physics        │───►│ Checkpoints      │  │
//! │  │ Snapshot │    │ (integrator,   │    │ (respawn point,  │  │
//! │  └──────────┘    │  resolver)     │    │  out of bounds)  │  │
//! │                  └────────────────┘    └──────────────────┘  │
//! │                          │                                   │
//! │                          ▼                                   │
//! │                  Transform / Telemetry                       │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod checkpoint;
pub mod input;
pub mod map;
pub mod simulation;
pub mod telemetry;

// Re-export main types
pub use checkpoint::{Checkpoint, CheckpointId, CheckpointManager};
pub use input::{InputState, MovementInput, PlayerInput};
pub use map::Map;
pub use simulation::{FrameClock, Simulation, SimulationError, StepOutcome};
pub use telemetry::{PlayerTransform, Telemetry};

// Re-export physics types for convenience
pub use surfline_physics::{
    CollisionWorld, ContactKind, InputSnapshot, JumpPhase, SurfConfig, SurfPhase, SurfaceTags,
};
