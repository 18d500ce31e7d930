use hyperspeed_core::distortion::offset;
use hyperspeed_core::frame::{instance_capacity, kind, static_instances};
use hyperspeed_core::{CameraState, DistortionKind, EngineConfig, FrameClock, FrameUniforms};
use std::time::Duration;

#[test]
fn distortion_vanishes_at_the_camera_and_without_amount() {
    for k in [
        DistortionKind::Turbulent,
        DistortionKind::Mountain,
        DistortionKind::Xy,
        DistortionKind::LongRace,
        DistortionKind::Deep,
    ] {
        assert_eq!(offset(k, 0.0, 3.0, 1.0), glam::Vec2::ZERO, "{k:?}");
        assert_eq!(offset(k, 0.7, 3.0, 0.0), glam::Vec2::ZERO, "{k:?}");
    }
    assert_eq!(offset(DistortionKind::None, 1.0, 3.0, 1.0), glam::Vec2::ZERO);
}

#[test]
fn distortion_kinds_resolve_by_name() {
    assert_eq!(DistortionKind::from_name("LongRace"), Some(DistortionKind::LongRace));
    assert_eq!(DistortionKind::from_name("long_race"), Some(DistortionKind::LongRace));
    assert_eq!(DistortionKind::from_name("deepDistortion"), Some(DistortionKind::Deep));
    assert_eq!(DistortionKind::from_name("spiral"), None);
    assert_eq!(DistortionKind::default(), DistortionKind::Turbulent);
}

#[test]
fn sway_stays_at_rest_without_boost() {
    let mut cam = CameraState::new(90.0);
    for _ in 0..120 {
        cam.update(1.0 / 60.0, 2.5, 90.0, 0.0);
    }
    assert_eq!(cam.lateral, 0.0);
    assert!((cam.travel - 300.0).abs() < 1e-3);
}

#[test]
fn sway_does_not_depend_on_tick_length() {
    let mut coarse = CameraState::new(90.0);
    let mut fine = CameraState::new(90.0);
    let mut peak = 0.0f32;
    for _ in 0..90 {
        coarse.update(1.0 / 30.0, 5.0, 120.0, 1.0);
        fine.update(1.0 / 120.0, 1.25, 120.0, 1.0);
        fine.update(1.0 / 120.0, 1.25, 120.0, 1.0);
        fine.update(1.0 / 120.0, 1.25, 120.0, 1.0);
        fine.update(1.0 / 120.0, 1.25, 120.0, 1.0);
        peak = peak.max(coarse.lateral.abs());
    }
    assert!(peak > 0.1, "peak = {peak}");
    assert!((coarse.lateral - fine.lateral).abs() < 1e-3, "{} vs {}", coarse.lateral, fine.lateral);
    assert!((coarse.travel - fine.travel).abs() < 1e-6);
}

#[test]
fn sway_is_bounded_under_full_boost() {
    let mut cam = CameraState::new(90.0);
    let mut peak = 0.0f32;
    for _ in 0..600 {
        cam.update(1.0 / 60.0, 2.5, 150.0, 1.0);
        peak = peak.max(cam.lateral.abs());
    }
    assert!(peak > 0.1 && peak < 3.0, "peak = {peak}");
    assert_eq!(cam.fov_degrees, 150.0);
}

#[test]
fn viewport_sets_the_aspect_ratio() {
    let mut cam = CameraState::new(90.0);
    cam.set_viewport(1000, 500);
    assert_eq!(cam.aspect, 2.0);
    cam.set_viewport(0, 500);
    assert_eq!(cam.aspect, 2.0);
    let c = cam.camera(400.0, DistortionKind::None, 0.0, 0.0);
    assert_eq!(c.zfar, 450.0);
    assert!(c.view_proj().is_finite());
}

#[test]
fn clock_starts_at_zero_and_clamps() {
    let mut clock = FrameClock::new(0.25);
    let t0 = instant::Instant::now();
    assert_eq!(clock.delta(t0), 0.0);
    let dt = clock.delta(t0 + Duration::from_millis(16));
    assert!((dt - 0.016).abs() < 1e-4);
    assert_eq!(clock.delta(t0 + Duration::from_secs(5)), 0.25);
    clock.reset();
    assert_eq!(clock.delta(t0 + Duration::from_secs(9)), 0.0);
}

#[test]
fn static_geometry_covers_both_roads() {
    let cfg = EngineConfig::default();
    let statics = static_instances(&cfg);
    let roads = statics.iter().filter(|i| i.shape[2] == kind::ROAD).count();
    let islands = statics.iter().filter(|i| i.shape[2] == kind::ISLAND).count();
    assert_eq!((roads, islands), (2, 1));

    let mut no_island = EngineConfig::default();
    no_island.road.island_width = 0.0;
    let islands = static_instances(&no_island)
        .iter()
        .filter(|i| i.shape[2] == kind::ISLAND)
        .count();
    assert_eq!(islands, 0);
}

#[test]
fn uniform_block_matches_the_shader_layout() {
    assert_eq!(std::mem::size_of::<FrameUniforms>(), 176);
    assert_eq!(std::mem::size_of::<FrameUniforms>() % 16, 0);
}

#[test]
fn instance_capacity_covers_statics_and_both_pools() {
    let mut cfg = EngineConfig::default();
    cfg.segment_count = 10;
    cfg.streak_count = 20;
    let statics = static_instances(&cfg).len();
    assert_eq!(instance_capacity(&cfg), statics + 30);
}
