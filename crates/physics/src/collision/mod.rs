//! Collision detection and resolution for the surf player.
//!
//! This module answers ray queries against static level geometry and turns
//! the hits into contact responses.
//!
//! # Key Types
//!
//! - [`CollisionWorld`]: The static geometry, backed by parry3d shapes
//! - [`GeometryProvider`]: Ray query seam the resolver talks to
//! - [`SurfaceHit`]: Output from a single ray query
//! - [`CollisionResolver`]: Ground, surface and wall passes for the player
//!
//! # Resolution Order
//!
//! Ground contact wins over ramp contact, which wins over wall contact. Only
//! one pass resolves a given frame.

mod flags;
mod ray;
mod resolver;
mod world;

pub use flags::SurfaceTags;
pub use ray::{PlayerShape, SurfaceHit};
pub use resolver::{CollisionResolver, ContactKind, ContactReport};
pub use world::{CollisionWorld, GeometryError, GeometryProvider};
