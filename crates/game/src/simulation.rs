//! Surf simulation - the frame loop.
//!
//! One [`Simulation::step`] call per rendered frame. Each frame is split into
//! a fixed number of substeps so fast movement stays stable against thin
//! ramps.

use std::time::Instant;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use surfline_physics::{
    ConfigError, ContactKind, InputSnapshot, MovementIntegrator, PlayerBody, SurfConfig, ViewAngles,
    WorldState,
};
use thiserror::Error;

use crate::checkpoint::CheckpointManager;
use crate::map::Map;
use crate::telemetry::{PlayerTransform, Telemetry};

/// Errors from the simulation driver.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// No map loaded. The frame was skipped and the simulation paused.
    #[error("no geometry loaded, simulation paused")]
    MissingGeometry,

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result of a [`Simulation::step`] call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StepOutcome {
    /// The frame ran.
    Advanced(Telemetry),
    /// The simulation is paused; nothing changed.
    Paused,
}

/// The surf simulation.
///
/// Owns the player body, the world values and the loaded map. Config is
/// fixed at construction.
#[derive(Debug)]
pub struct Simulation {
    /// Current frame number.
    frame: u64,

    /// Simulation clock (ms). Advances only while stepping.
    clock_ms: f64,

    integrator: MovementIntegrator,
    map: Option<Map>,
    body: PlayerBody,
    world: WorldState,
    checkpoints: CheckpointManager,
    paused: bool,
    last_contact: ContactKind,
    respawns: u32,
}

impl Simulation {
    /// Create a simulation with no map loaded.
    pub fn new(config: SurfConfig) -> Result<Self, SimulationError> {
        config.validate()?;

        let world = WorldState::from_config(&config, Vec3::ZERO);
        Ok(Self {
            frame: 0,
            clock_ms: 0.0,
            integrator: MovementIntegrator::new(config),
            map: None,
            body: PlayerBody::new(Vec3::ZERO, 0.0),
            world,
            checkpoints: CheckpointManager::new(Vec3::ZERO, Vec::new()),
            paused: false,
            last_contact: ContactKind::None,
            respawns: 0,
        })
    }

    /// Builder form of [`set_map`](Self::set_map).
    pub fn with_map(mut self, map: Map) -> Self {
        self.set_map(map);
        self
    }

    /// Load a map and put the player at its spawn.
    pub fn set_map(&mut self, map: Map) {
        log::info!(
            "loaded map '{}' ({} checkpoints), spawn {:?}",
            map.name,
            map.checkpoints.len(),
            map.spawn
        );

        self.world.respawn_point = map.spawn;
        self.checkpoints = CheckpointManager::new(map.spawn, map.checkpoints.clone());
        self.body.reset_to(map.spawn, self.clock_ms);
        self.body.view = ViewAngles {
            pitch: 0.0,
            yaw: map.spawn_yaw,
        };
        self.last_contact = ContactKind::None;
        self.map = Some(map);
    }

    /// Advance one frame.
    ///
    /// `delta_seconds` is the wall time since the previous frame; it is
    /// clamped to the configured maximum. Non-finite or negative deltas run
    /// the frame with zero elapsed time.
    pub fn step(&mut self, input: &InputSnapshot, delta_seconds: f32) -> Result<StepOutcome, SimulationError> {
        if self.paused {
            return Ok(StepOutcome::Paused);
        }

        let Some(map) = self.map.as_ref() else {
            self.paused = true;
            log::error!("frame {} aborted: no geometry loaded, pausing", self.frame);
            return Err(SimulationError::MissingGeometry);
        };

        let config = self.integrator.config();
        let delta = sanitize_delta(delta_seconds, config.max_frame_delta);
        let substeps = config.substeps.max(1);
        let dt = delta / substeps as f32;

        self.body.view.apply(input.camera_yaw_delta, input.camera_pitch_delta);
        if input.jump_requested {
            self.body.jump.request();
        }

        for _ in 0..substeps {
            self.clock_ms += f64::from(dt) * 1000.0;

            let report = self.integrator.substep(
                &mut self.body,
                &self.world,
                input,
                &map.collision,
                dt,
                self.clock_ms,
            );
            self.last_contact = report.contact.kind;

            if report.contact.out_of_bounds {
                log::info!(
                    "respawning: fell out of bounds at {:?}, back to {:?}",
                    self.body.position,
                    self.world.respawn_point
                );
                self.checkpoints.respawn(&mut self.body, &self.world, self.clock_ms);
                self.respawns += 1;
                continue;
            }

            self.checkpoints.update(self.body.position, &mut self.world);
        }

        self.body.jump.expire_request();
        self.frame += 1;

        Ok(StepOutcome::Advanced(self.telemetry()))
    }

    /// Stop advancing. [`step`](Self::step) returns [`StepOutcome::Paused`] until resumed.
    pub fn pause(&mut self) {
        if !self.paused {
            log::info!("simulation paused at frame {}", self.frame);
        }
        self.paused = true;
    }

    /// Continue from exactly where the simulation paused.
    pub fn resume(&mut self) {
        if self.paused {
            log::info!("simulation resumed at frame {}", self.frame);
        }
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Send the player back to the current respawn point.
    pub fn reset_player(&mut self) {
        log::info!("manual reset to {:?}", self.world.respawn_point);
        self.checkpoints.respawn(&mut self.body, &self.world, self.clock_ms);
    }

    /// Clear checkpoint progress and send the player back to the map spawn.
    pub fn restart_course(&mut self) {
        self.checkpoints.reset(&mut self.world);
        self.reset_player();
    }

    /// Camera snapshot.
    pub fn transform(&self) -> PlayerTransform {
        PlayerTransform::from_body(&self.body, self.integrator.config())
    }

    /// HUD snapshot.
    pub fn telemetry(&self) -> Telemetry {
        Telemetry::capture(
            self.frame,
            self.clock_ms,
            &self.body,
            self.integrator.config(),
            self.last_contact,
            self.checkpoints.active(),
            self.respawns,
        )
    }

    pub fn body(&self) -> &PlayerBody {
        &self.body
    }

    pub fn world(&self) -> &WorldState {
        &self.world
    }

    pub fn map(&self) -> Option<&Map> {
        self.map.as_ref()
    }

    pub fn config(&self) -> &SurfConfig {
        self.integrator.config()
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn clock_ms(&self) -> f64 {
        self.clock_ms
    }

    pub fn respawn_count(&self) -> u32 {
        self.respawns
    }
}

fn sanitize_delta(delta_seconds: f32, max_frame_delta: f32) -> f32 {
    if !delta_seconds.is_finite() || delta_seconds < 0.0 {
        log::warn!("ignoring invalid frame delta {}", delta_seconds);
        return 0.0;
    }
    delta_seconds.min(max_frame_delta)
}

/// Wall-clock frame timer for hosts.
///
/// Restart it when resuming so the paused interval never shows up as one
/// huge frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    last: Instant,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    pub fn new() -> Self {
        Self { last: Instant::now() }
    }

    /// Forget the time since the last tick.
    pub fn restart(&mut self) {
        self.last = Instant::now();
    }

    /// Seconds since the previous tick.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last).as_secs_f32();
        self.last = now;
        elapsed
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use surfline_physics::{JumpPhase, MotionState, SurfaceTags};

    const FRAME: f32 = 1.0 / 60.0;

    fn create_test_map() -> Map {
        let mut map = Map::new("flat", Vec3::new(0.0, 1.0, 0.0));
        map.add_platform((0.0, 0.0), 0.0, (50.0, 50.0));
        map
    }

    fn create_test_sim() -> Simulation {
        Simulation::new(SurfConfig::default())
            .expect("default config is valid")
            .with_map(create_test_map())
    }

    #[test]
    fn test_simulation_creation() {
        let sim = create_test_sim();
        assert_eq!(sim.frame(), 0);
        assert_eq!(sim.body().position, Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(sim.world().respawn_point, Vec3::new(0.0, 1.0, 0.0));
        assert!(!sim.is_paused());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = SurfConfig {
            substeps: 0,
            ..Default::default()
        };
        assert!(matches!(Simulation::new(config), Err(SimulationError::Config(_))));
    }

    #[test]
    fn test_step_advances_frame_and_clock() {
        let mut sim = create_test_sim();

        sim.step(&InputSnapshot::default(), FRAME).unwrap();
        assert_eq!(sim.frame(), 1);
        assert!((sim.clock_ms() - f64::from(FRAME) * 1000.0).abs() < 1e-3);

        sim.step(&InputSnapshot::default(), FRAME).unwrap();
        assert_eq!(sim.frame(), 2);
    }

    #[test]
    fn test_delta_clamped_and_sanitized() {
        let mut sim = create_test_sim();
        let max_ms = f64::from(sim.config().max_frame_delta) * 1000.0;

        sim.step(&InputSnapshot::default(), 10.0).unwrap();
        assert!((sim.clock_ms() - max_ms).abs() < 1e-3);

        sim.step(&InputSnapshot::default(), f32::NAN).unwrap();
        sim.step(&InputSnapshot::default(), -1.0).unwrap();
        assert!((sim.clock_ms() - max_ms).abs() < 1e-3);
        assert_eq!(sim.frame(), 3);
        assert!(sim.body().position.is_finite());
    }

    #[test]
    fn test_player_settles_on_ground() {
        let mut sim = create_test_sim();
        for _ in 0..30 {
            sim.step(&InputSnapshot::default(), FRAME).unwrap();
        }

        let telemetry = sim.telemetry();
        assert!(telemetry.on_ground);
        assert_eq!(telemetry.contact, ContactKind::Ground);
        let expected = sim.config().player_height * 0.5 + sim.config().ground_epsilon;
        assert!((sim.body().position.y - expected).abs() < 1e-3);
    }

    #[test]
    fn test_movement_input() {
        let mut sim = create_test_sim();
        let start = sim.body().position;

        let input = InputSnapshot {
            move_forward: true,
            ..Default::default()
        };
        for _ in 0..60 {
            sim.step(&input, FRAME).unwrap();
        }

        let distance = (sim.body().position - start).length();
        assert!(distance > 1.0, "Player should have moved, distance={}", distance);
    }

    #[test]
    fn test_view_deltas_applied_once_per_frame() {
        let mut sim = create_test_sim();
        let input = InputSnapshot {
            camera_yaw_delta: 0.25,
            ..Default::default()
        };
        sim.step(&input, FRAME).unwrap();
        assert!((sim.transform().yaw - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_unconsumed_jump_pulse_expires() {
        let jump = InputSnapshot {
            jump_requested: true,
            ..Default::default()
        };

        // Spawned high above the floor and at rest: no support, so the pulse is wasted.
        let mut sim_high = Simulation::new(SurfConfig::default())
            .unwrap()
            .with_map({
                let mut map = Map::new("high", Vec3::new(0.0, 20.0, 0.0));
                map.add_platform((0.0, 0.0), 0.0, (50.0, 50.0));
                map
            });
        sim_high.step(&jump, FRAME).unwrap();
        let telemetry = sim_high.telemetry();
        assert!(!sim_high.body().jump.is_requested());
        assert_eq!(telemetry.jump_phase, JumpPhase::Idle);
        assert!(telemetry.vertical_speed < 0.0);
        assert_eq!(telemetry.jump_cooldown_ms, 0.0);

        // Standing on the floor, the same pulse is consumed by a jump.
        let mut sim = create_test_sim();
        for _ in 0..30 {
            sim.step(&InputSnapshot::default(), FRAME).unwrap();
        }
        assert!(sim.telemetry().on_ground);

        sim.step(&jump, FRAME).unwrap();
        let telemetry = sim.telemetry();
        assert!(!sim.body().jump.is_requested());
        assert_eq!(telemetry.jump_phase, JumpPhase::InProgress);
        assert!(telemetry.vertical_speed > 0.0);
        assert!(telemetry.jump_cooldown_ms > 0.0);
    }

    #[test]
    fn test_unstuck_fires_after_frame_limit() {
        // Hanging in the air holding forward: no speed builds, so the player counts as stuck.
        let mut map = Map::new("drop", Vec3::new(0.0, 0.0, 0.0));
        map.add_platform((0.0, 0.0), -100.0, (50.0, 50.0));
        let mut sim = Simulation::new(SurfConfig::default()).unwrap().with_map(map);
        let limit = u64::from(sim.config().unstuck_frame_limit);

        let input = InputSnapshot {
            move_forward: true,
            ..Default::default()
        };
        let mut previous = sim.body().velocity.y;
        let mut fired_on = None;
        for _ in 0..limit + 10 {
            sim.step(&input, FRAME).unwrap();
            let vertical = sim.telemetry().vertical_speed;
            if vertical > previous && fired_on.is_none() {
                fired_on = Some(sim.frame());
            }
            previous = vertical;
        }

        assert_eq!(fired_on, Some(limit + 1));
    }

    #[test]
    fn test_determinism() {
        let inputs: Vec<_> = (0..120)
            .map(|i| InputSnapshot {
                move_forward: i % 2 == 0,
                move_right: i % 3 == 0,
                jump_requested: i % 10 == 0,
                camera_yaw_delta: if i % 7 == 0 { 0.05 } else { 0.0 },
                ..Default::default()
            })
            .collect();

        let mut sim1 = create_test_sim();
        let mut sim2 = create_test_sim();
        for input in &inputs {
            sim1.step(input, FRAME).unwrap();
            sim2.step(input, FRAME).unwrap();
        }

        assert_eq!(sim1.body().position, sim2.body().position);
        assert_eq!(sim1.body().velocity, sim2.body().velocity);
    }

    #[test]
    fn test_out_of_bounds_respawns() {
        let config = SurfConfig {
            out_of_bounds_y: -5.0,
            ..Default::default()
        };
        let mut map = Map::new("void", Vec3::new(0.0, 0.0, 0.0));
        // A wall far away so the map is not empty.
        map.collision.add_box(Vec3::new(100.0, 0.0, 0.0), Vec3::ONE, SurfaceTags::OBSTACLE);

        let mut sim = Simulation::new(config).unwrap().with_map(map);
        for _ in 0..60 {
            sim.step(&InputSnapshot::default(), FRAME).unwrap();
            assert!(sim.body().position.y >= -5.0, "respawn should catch the fall");
        }

        assert!(sim.respawn_count() >= 1);
        assert_eq!(sim.telemetry().respawns, sim.respawn_count());
    }

    #[test]
    fn test_manual_reset() {
        let mut sim = create_test_sim();
        let input = InputSnapshot {
            move_forward: true,
            ..Default::default()
        };
        for _ in 0..30 {
            sim.step(&input, FRAME).unwrap();
        }

        sim.reset_player();
        assert_eq!(sim.body().position, sim.world().respawn_point);
        assert_eq!(sim.body().velocity, Vec3::ZERO);
        assert_eq!(sim.body().motion, MotionState::Airborne);
    }

    #[test]
    fn test_frame_clock() {
        let mut clock = FrameClock::new();
        let elapsed = clock.tick();
        assert!(elapsed >= 0.0 && elapsed < 1.0);
        clock.restart();
        assert!(clock.tick() < 1.0);
    }
}
