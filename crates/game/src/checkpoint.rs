//! Checkpoints and respawning.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use surfline_physics::{PlayerBody, WorldState};

/// Identifier of a checkpoint within a map.
pub type CheckpointId = u32;

/// A static trigger sphere that moves the respawn point forward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub id: CheckpointId,

    /// Center of the trigger sphere.
    pub trigger: Vec3,

    /// Trigger radius.
    pub radius: f32,

    /// Where the player reappears once this checkpoint is active.
    pub respawn_point: Vec3,
}

impl Checkpoint {
    /// Check if a player center is inside the trigger.
    pub fn contains(&self, position: Vec3) -> bool {
        position.distance_squared(self.trigger) <= self.radius * self.radius
    }
}

/// Tracks the active checkpoint and resets the player.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointManager {
    checkpoints: Vec<Checkpoint>,
    spawn: Vec3,
    active: Option<CheckpointId>,
}

impl CheckpointManager {
    pub fn new(spawn: Vec3, checkpoints: Vec<Checkpoint>) -> Self {
        Self {
            checkpoints,
            spawn,
            active: None,
        }
    }

    /// The most recently touched checkpoint.
    pub fn active(&self) -> Option<CheckpointId> {
        self.active
    }

    pub fn checkpoints(&self) -> &[Checkpoint] {
        &self.checkpoints
    }

    /// Test `position` against every trigger.
    ///
    /// Returns the id of a newly activated checkpoint. Touching the active
    /// checkpoint again changes nothing and returns `None`.
    pub fn update(&mut self, position: Vec3, world: &mut WorldState) -> Option<CheckpointId> {
        let checkpoint = self.checkpoints.iter().find(|c| c.contains(position))?;
        if self.active == Some(checkpoint.id) {
            return None;
        }

        self.active = Some(checkpoint.id);
        world.respawn_point = checkpoint.respawn_point;
        log::info!(
            "checkpoint {} reached, respawn point now {:?}",
            checkpoint.id,
            checkpoint.respawn_point
        );

        Some(checkpoint.id)
    }

    /// Put the body back at the current respawn point.
    pub fn respawn(&self, body: &mut PlayerBody, world: &WorldState, now_ms: f64) {
        body.reset_to(world.respawn_point, now_ms);
    }

    /// Forget progress: the map spawn becomes the respawn point again.
    pub fn reset(&mut self, world: &mut WorldState) {
        self.active = None;
        world.respawn_point = self.spawn;
    }
}
