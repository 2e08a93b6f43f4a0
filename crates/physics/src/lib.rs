//! Surfline Physics Engine
//!
//! A deterministic surf-movement engine: ramp sliding, air strafing and
//! bunny-hop chaining over a raycast-only collision model against static,
//! tagged geometry.
//!
//! # Architecture
//!
//! The physics engine is split into three parts:
//!
//! - **Math**: Total vector and ray helpers that never produce NaN
//! - **Collision**: Ray queries against static geometry, and the resolver that
//!   turns hits into ground, surf and wall contacts
//! - **Movement**: The integrator that applies forces and input each substep
//!   and hands the body to the resolver
//!
//! # Design Principles
//!
//! 1. **Determinism**: Same inputs and substeps always produce same outputs
//! 2. **Total math**: Degenerate input falls back to safe defaults
//! 3. **One contact state**: Ground, surf and airborne are exclusive

pub mod collision;
pub mod math;
pub mod movement;

// Re-export commonly used types
pub use collision::{
    CollisionResolver, CollisionWorld, ContactKind, ContactReport, GeometryError, GeometryProvider,
    PlayerShape, SurfaceHit, SurfaceTags,
};
pub use math::Ray;
pub use movement::{
    ConfigError, InputSnapshot, JumpOutcome, JumpPhase, MotionState, MovementIntegrator,
    PlayerBody, SubstepReport, SurfConfig, SurfPhase, ViewAngles, WorldState,
};
