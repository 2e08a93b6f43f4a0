//! Full substep runs against a single surf ramp.

use std::f32::consts::FRAC_PI_3;

use glam::Vec3;
use surfline_physics::{
    CollisionWorld, InputSnapshot, MovementIntegrator, PlayerBody, SurfConfig, SurfPhase,
    SurfaceTags, WorldState,
};

const DT: f32 = 1.0 / 180.0;

/// A 60 degree ramp facing +Z whose face passes `gap` below `center` along
/// its normal. Returns the world, the face normal and a point on the face.
fn create_ramp_world(center: Vec3, gap: f32) -> (CollisionWorld, Vec3, Vec3) {
    let expected_normal = Vec3::new(0.0, FRAC_PI_3.cos(), FRAC_PI_3.sin());
    let half = Vec3::new(60.0, 1.0, 8.0);
    let face_point = center - expected_normal * gap;

    let mut world = CollisionWorld::new();
    let (_, normal) = world.add_ramp(
        face_point - expected_normal * half.y,
        half,
        FRAC_PI_3,
        0.0,
        SurfaceTags::SURFABLE,
    );
    assert!((normal - expected_normal).length() < 1e-5);

    (world, normal, face_point)
}

#[test]
fn test_surfing_keeps_speed_and_stays_outside_ramp() {
    let center = Vec3::new(0.0, 50.0, 0.0);
    let (geometry, normal, face_point) = create_ramp_world(center, 0.35);

    let integrator = MovementIntegrator::new(SurfConfig::default());
    let world = WorldState::from_config(integrator.config(), center);
    let input = InputSnapshot::default();

    let mut body = PlayerBody::new(center, 0.0);
    body.velocity = Vec3::new(10.0, 0.0, 0.0);

    let mut now = 0.0;
    for i in 0..180 {
        now += f64::from(DT) * 1000.0;
        let report = integrator.substep(&mut body, &world, &input, &geometry, DT, now);

        let clearance = (body.position - face_point).dot(normal);
        assert!(clearance > 0.25, "substep {}: sank into the ramp, clearance={}", i, clearance);
        assert!(!report.contact.out_of_bounds);
        assert!(body.velocity.is_finite());
    }

    assert!(body.on_surface(), "lost the ramp: {:?}", body.motion);
    assert!(!body.on_ground(), "a 60 degree ramp is not walkable");
    assert_eq!(body.surfing_state(), SurfPhase::Full);
    assert!(body.velocity.x > 8.0, "speed along the ramp bled away: {:?}", body.velocity);

    // Sliding down, not stuck.
    assert!(body.velocity.y < 0.0);
    assert!(body.position.y < center.y);
}

#[test]
fn test_reduced_gravity_while_surfing() {
    let center = Vec3::new(0.0, 50.0, 0.0);
    let (geometry, _, _) = create_ramp_world(center, 0.45);
    let config = SurfConfig::default();
    let integrator = MovementIntegrator::new(config.clone());
    let world = WorldState::from_config(&config, center);

    let mut surfer = PlayerBody::new(center, 0.0);
    let mut faller = PlayerBody::new(center, 0.0);
    let empty = CollisionWorld::new();

    for _ in 0..90 {
        integrator.substep(&mut surfer, &world, &InputSnapshot::default(), &geometry, DT, 0.0);
        integrator.substep(&mut faller, &world, &InputSnapshot::default(), &empty, DT, 0.0);
    }

    assert!(surfer.on_surface());
    assert!(
        surfer.velocity.y > faller.velocity.y * 0.5,
        "surfer vy={} faller vy={}",
        surfer.velocity.y,
        faller.velocity.y
    );
}
