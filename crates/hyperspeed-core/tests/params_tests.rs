use hyperspeed_core::interp::{advance_param, mean_value, step_alpha};
use hyperspeed_core::{EngineConfig, Param, ParamId, ParameterStore};

fn store() -> ParameterStore {
    ParameterStore::from_config(&EngineConfig::default())
}

#[test]
fn initial_values_sit_on_their_targets() {
    let s = store();
    for id in ParamId::ALL {
        assert_eq!(s.read(id), s.target(id), "{id}");
        assert!(s.is_settled(id));
    }
    assert_eq!(s.read(ParamId::Speed), 1.0);
    assert_eq!(s.read(ParamId::Density), 50.0);
    assert_eq!(s.read(ParamId::Fov), 90.0);
}

#[test]
fn names_resolve_in_both_casings() {
    assert_eq!(ParamId::from_name("speed"), Some(ParamId::Speed));
    assert_eq!(ParamId::from_name("colorIntensity"), Some(ParamId::ColorIntensity));
    assert_eq!(ParamId::from_name("color_intensity"), Some(ParamId::ColorIntensity));
    assert_eq!(ParamId::from_name("particleDensity"), Some(ParamId::Density));
    assert_eq!(ParamId::from_name("warp"), None);
    for id in ParamId::ALL {
        assert_eq!(ParamId::from_name(id.name()), Some(id));
    }
}

#[test]
fn set_target_moves_target_not_current() {
    let mut s = store();
    assert!(s.set_target("density", 80.0));
    assert_eq!(s.target(ParamId::Density), 80.0);
    assert_eq!(s.read(ParamId::Density), 50.0);
}

#[test]
fn unknown_and_non_finite_writes_are_ignored() {
    let mut s = store();
    assert!(!s.set_target("warp_factor", 9.0));
    assert!(!s.set_target_id(ParamId::Speed, f32::NAN));
    assert!(!s.set_target_id(ParamId::Speed, f32::INFINITY));
    assert_eq!(s.target(ParamId::Speed), 1.0);
}

#[test]
fn targets_are_clamped_to_the_parameter_range() {
    let mut s = store();
    s.set_target_id(ParamId::Density, 250.0);
    assert_eq!(s.target(ParamId::Density), 100.0);
    s.set_target_id(ParamId::Distortion, -3.0);
    assert_eq!(s.target(ParamId::Distortion), 0.0);
}

#[test]
fn last_write_before_a_tick_wins() {
    let mut s = store();
    s.set_target("speed", 2.0);
    s.set_target("speed", 5.0);
    s.tick(0.5);
    assert_eq!(s.target(ParamId::Speed), 5.0);
    assert!(s.read(ParamId::Speed) > 1.0);
}

#[test]
fn one_tick_of_two_dt_equals_two_ticks_of_dt() {
    let mut a = store();
    let mut b = store();
    a.set_target("speed", 3.0);
    b.set_target("speed", 3.0);
    a.tick(0.032);
    b.tick(0.016);
    b.tick(0.016);
    let (va, vb) = (a.read(ParamId::Speed), b.read(ParamId::Speed));
    assert!((va - vb).abs() < 1e-4, "{va} vs {vb}");
}

#[test]
fn frame_rate_does_not_change_the_trajectory() {
    let mut fast = store();
    let mut slow = store();
    fast.set_target("density", 90.0);
    slow.set_target("density", 90.0);
    for _ in 0..120 {
        fast.tick(1.0 / 120.0);
    }
    for _ in 0..30 {
        slow.tick(1.0 / 30.0);
    }
    let (f, s) = (fast.read(ParamId::Density), slow.read(ParamId::Density));
    assert!((f - s).abs() < 0.05, "{f} vs {s}");
}

#[test]
fn values_never_overshoot() {
    let mut s = store();
    s.set_target("speed", 3.0);
    let mut last = s.read(ParamId::Speed);
    for _ in 0..200 {
        s.tick(0.25);
        let v = s.read(ParamId::Speed);
        assert!(v >= last && v <= 3.0);
        last = v;
    }
    s.set_target("speed", 0.5);
    for _ in 0..200 {
        s.tick(0.25);
        let v = s.read(ParamId::Speed);
        assert!(v <= last && v >= 0.5);
        last = v;
    }
}

#[test]
fn values_snap_once_within_epsilon() {
    let mut s = store();
    s.set_target("color_intensity", 2.0);
    for _ in 0..600 {
        s.tick(1.0 / 60.0);
    }
    assert_eq!(s.read(ParamId::ColorIntensity), 2.0);
    assert!(s.is_settled(ParamId::ColorIntensity));
}

#[test]
fn zero_dt_changes_nothing() {
    let mut s = store();
    s.set_target("speed", 3.0);
    let before = s.entries().to_vec();
    s.tick(0.0);
    s.tick(-0.1);
    assert_eq!(s.entries(), &before[..]);
}

#[test]
fn rise_and_fall_use_their_own_rates() {
    let mut p = Param::asymmetric(0.0, 4.0, 1.0, 0.0, 10.0);
    p.target = 1.0;
    advance_param(&mut p, 0.1, 1e-6);
    let rise = p.current;
    let mut q = Param::asymmetric(1.0, 4.0, 1.0, 0.0, 10.0);
    q.target = 0.0;
    advance_param(&mut q, 0.1, 1e-6);
    let fall = 1.0 - q.current;
    assert!(rise > fall);
    assert!((rise - step_alpha(4.0, 0.1)).abs() < 1e-6);
}

#[test]
fn step_alpha_is_bounded() {
    assert_eq!(step_alpha(3.0, 0.0), 0.0);
    assert_eq!(step_alpha(0.0, 1.0), 0.0);
    let a = step_alpha(1000.0, 10.0);
    assert!(a <= 1.0 && a > 0.99);
}

#[test]
fn mean_value_composes_across_split_steps() {
    let mut p = Param::asymmetric(1.0, 3.75, 2.0, 0.0, 10.0);
    p.target = 3.0;
    let whole = mean_value(&p, 0.032) * 0.032;
    let first = mean_value(&p, 0.016) * 0.016;
    advance_param(&mut p, 0.016, 0.0);
    let second = mean_value(&p, 0.016) * 0.016;
    assert!((whole - (first + second)).abs() < 1e-6, "{whole} vs {}", first + second);
    assert!(whole / 0.032 > 1.0 && whole / 0.032 < p.current);
}

#[test]
fn mean_value_of_a_settled_param_is_its_value() {
    let p = Param::asymmetric(2.0, 3.0, 3.0, 0.0, 10.0);
    assert_eq!(mean_value(&p, 0.5), 2.0);
    assert_eq!(mean_value(&p, 0.0), 2.0);
}
