use hyperspeed_core::{Engine, EngineConfig, EngineEvent, InputEvent, Intent, LoopState, ParamId};

fn running() -> Engine {
    let mut e = Engine::new(EngineConfig::default());
    e.resize(800, 600);
    e.start();
    e.take_events();
    e
}

#[test]
fn nothing_ticks_before_start() {
    let mut e = Engine::new(EngineConfig::default());
    assert_eq!(e.state(), LoopState::Uninitialized);
    assert!(e.tick(0.016).is_none());
    e.start();
    assert!(e.tick(0.016).is_some());
    assert_eq!(e.take_events(), vec![EngineEvent::Started]);
}

#[test]
fn pools_start_at_the_configured_density() {
    let e = running();
    assert_eq!(e.segments().active_count(), 80);
    assert_eq!(e.streaks().active_count(), 120);
}

#[test]
fn zero_dt_tick_is_idempotent() {
    let mut e = running();
    e.tick(0.016);
    let zs: Vec<f32> = e.streaks().active().map(|s| s.z).collect();
    let params = e.store().entries().to_vec();
    let time = e.time();
    let frame = e.tick(0.0).map(|f| f.instances.len());
    assert!(frame.is_some());
    assert_eq!(e.store().entries(), &params[..]);
    assert_eq!(e.streaks().active().map(|s| s.z).collect::<Vec<_>>(), zs);
    assert_eq!(e.time(), time);
}

#[test]
fn writes_become_visible_on_the_next_tick() {
    let mut e = running();
    assert!(e.set_target("density", 90.0));
    assert_eq!(e.store().target(ParamId::Density), 50.0);
    e.tick(0.016);
    assert_eq!(e.store().target(ParamId::Density), 90.0);
    assert!(e.read(ParamId::Density) > 50.0);
}

#[test]
fn unknown_names_are_dropped_at_the_sink() {
    let e = running();
    assert!(!e.set_target("hyperdrive", 1.0));
    assert_eq!(e.sink().pending(), 0);
}

#[test]
fn density_changes_grow_the_active_set_gradually() {
    let mut e = running();
    e.set_target("density", 100.0);
    e.tick(0.016);
    let after_one = e.segments().active_count();
    assert!(after_one > 80 && after_one < 160, "{after_one}");
    for _ in 0..600 {
        e.tick(0.016);
    }
    assert_eq!(e.segments().active_count(), 160);
    assert_eq!(e.segments().capacity(), 160);
}

#[test]
fn frames_carry_static_and_active_instances() {
    let mut e = running();
    let statics = e.static_count();
    let expected = statics + 80 + 120;
    let frame = e.tick(0.016).map(|f| (f.index, f.instances.len()));
    assert_eq!(frame, Some((1, expected)));
    assert_eq!(e.uniforms().resolution, [800.0, 600.0]);
    assert_eq!(e.uniforms().range, 400.0);
}

#[test]
fn press_and_release_flow_through_the_sink() {
    let mut e = running();
    let sink = e.sink();
    sink.input(InputEvent::PressStart);
    e.tick(0.016);
    assert_eq!(e.intent(), Intent::Accelerating);
    assert_eq!(e.store().target(ParamId::Speed), 3.0);
    for _ in 0..60 {
        e.tick(1.0 / 60.0);
    }
    assert_eq!(e.intent(), Intent::Cruising);
    sink.input(InputEvent::PressEnd);
    e.tick(0.016);
    assert_eq!(e.intent(), Intent::Decelerating);
    for _ in 0..600 {
        e.tick(1.0 / 60.0);
    }
    assert_eq!(e.intent(), Intent::Idle);
    let events = e.take_events();
    let intents: Vec<&EngineEvent> = events
        .iter()
        .filter(|ev| matches!(ev, EngineEvent::IntentChanged(_)))
        .collect();
    assert_eq!(
        intents,
        vec![
            &EngineEvent::IntentChanged(Intent::Accelerating),
            &EngineEvent::IntentChanged(Intent::Cruising),
            &EngineEvent::IntentChanged(Intent::Decelerating),
            &EngineEvent::IntentChanged(Intent::Idle),
        ]
    );
}

#[test]
fn ui_toggle_is_reported() {
    let mut e = running();
    e.input(InputEvent::ToggleUi);
    e.tick(0.016);
    assert_eq!(e.take_events(), vec![EngineEvent::UiToggled]);
}

#[test]
fn paused_engine_does_not_advance() {
    let mut e = running();
    e.tick(0.016);
    e.pause();
    let time = e.time();
    assert!(e.tick(0.5).is_none());
    assert_eq!(e.time(), time);
    e.resume();
    assert!(e.tick(0.016).is_some());
    assert_eq!(
        e.take_events(),
        vec![EngineEvent::Paused, EngineEvent::Resumed]
    );
}

#[test]
fn dispose_is_idempotent_and_final() {
    let mut e = running();
    let sink = e.sink();
    sink.set("speed", 4.0);
    e.dispose();
    e.dispose();
    assert!(e.is_disposed());
    assert!(e.tick(0.016).is_none());
    assert!(!sink.set("speed", 2.0));
    assert!(sink.is_closed());
    assert_eq!(sink.pending(), 0);
    e.resume();
    e.start();
    assert_eq!(e.state(), LoopState::Disposed);
    assert_eq!(e.take_events(), vec![EngineEvent::Disposed]);
}

fn snapshot(e: &Engine) -> (Vec<hyperspeed_core::Param>, Vec<f32>, Vec<f32>, f64, f32, u64) {
    (
        e.store().entries().to_vec(),
        e.segments().slots().iter().map(|s| s.item.z).collect(),
        e.streaks().slots().iter().map(|s| s.item.z).collect(),
        e.camera().travel,
        e.time(),
        e.frame_index(),
    )
}

#[test]
fn nothing_moves_after_dispose() {
    let mut e = running();
    e.set_target("speed", 3.0);
    for _ in 0..5 {
        e.tick(0.016);
    }
    e.set_target("density", 90.0);
    e.dispose();
    let before = snapshot(&e);
    for _ in 0..10 {
        assert!(e.tick(0.016).is_none());
    }
    assert_eq!(snapshot(&e), before);
}

#[test]
fn telemetry_stats_reach_parameter_targets() {
    let mut e = running();
    assert_eq!(e.apply_stat("max_speed", 360.0), 1);
    assert_eq!(e.apply_stat("lap_count", 3.0), 0);
    e.tick(0.016);
    assert_eq!(e.store().target(ParamId::Speed), 4.0);
}

#[test]
fn resize_keeps_simulation_state() {
    let mut e = running();
    e.set_target("speed", 2.0);
    for _ in 0..10 {
        e.tick(0.016);
    }
    let params = e.store().entries().to_vec();
    let zs: Vec<f32> = e.segments().active().map(|s| s.z).collect();
    e.resize(1920, 1080);
    assert_eq!(e.store().entries(), &params[..]);
    assert_eq!(e.segments().active().map(|s| s.z).collect::<Vec<_>>(), zs);
    assert_eq!(e.viewport(), (1920, 1080));
    e.resize(0, 100);
    assert_eq!(e.viewport(), (1920, 1080));
}

#[test]
fn same_seed_same_frames() {
    let mut a = running();
    let mut b = running();
    for _ in 0..90 {
        a.tick(1.0 / 60.0);
        b.tick(1.0 / 60.0);
    }
    assert_eq!(a.instances(), b.instances());
}

#[test]
fn travel_accumulates_with_speed() {
    let mut e = running();
    e.tick(0.5);
    let travelled = e.camera().travel;
    assert!((travelled - 75.0).abs() < 1e-3, "{travelled}");
}

#[test]
fn event_kinds_are_stable_tags() {
    assert_eq!(EngineEvent::IntentChanged(Intent::Cruising).kind(), "intent");
    assert_eq!(EngineEvent::Unavailable("no adapter".into()).kind(), "unavailable");
    assert_eq!(EngineEvent::ContextLost.kind(), "context_lost");
}

fn zs(e: &Engine) -> Vec<f32> {
    e.segments()
        .slots()
        .iter()
        .map(|s| s.item.z)
        .chain(e.streaks().slots().iter().map(|s| s.item.z))
        .collect()
}

#[test]
fn splitting_a_tick_mid_ramp_keeps_the_same_state() {
    let mut a = running();
    let mut b = running();
    a.set_target("speed", 3.0);
    b.set_target("speed", 3.0);
    for _ in 0..10 {
        a.tick(0.016);
        b.tick(0.016);
    }
    assert!(a.read(ParamId::Speed) < 2.5);
    for _ in 0..20 {
        a.tick(0.032);
        b.tick(0.016);
        b.tick(0.016);
    }
    let (ta, tb) = (a.camera().travel, b.camera().travel);
    assert!((ta - tb).abs() < 1e-3 * ta, "{ta} vs {tb}");
    assert!((a.camera().lateral - b.camera().lateral).abs() < 1e-3);
    assert!((a.read(ParamId::Speed) - b.read(ParamId::Speed)).abs() < 1e-4);
    for (za, zb) in zs(&a).iter().zip(zs(&b)) {
        assert!((za - zb).abs() < 1e-2, "{za} vs {zb}");
    }
}

#[test]
fn fast_streaks_wrap_within_two_seconds() {
    let mut e = running();
    let range = e.streaks().range();
    for _ in 0..120 {
        assert!(e.tick(1.0 / 60.0).is_some());
        let mut pos = e.segments().active().map(|s| s.z);
        assert!(pos.all(|z| (0.0..=range).contains(&z)));
        let mut pos = e.streaks().active().map(|s| s.z);
        assert!(pos.all(|z| (0.0..=range).contains(&z)));
    }
    let active = e.streaks().active_count();
    assert_eq!(active, 120);
    let mut wrapped = 0;
    for slot in &e.streaks().slots()[..active] {
        if slot.item.speed * 2.5 * 120.0 > range {
            assert!(slot.wraps >= 1, "speed {} z {}", slot.item.speed, slot.item.z);
        }
        wrapped += slot.wraps;
    }
    assert!(wrapped > 0);
}
