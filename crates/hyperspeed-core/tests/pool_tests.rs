use hyperspeed_core::pool::{Side, SpawnContext};
use hyperspeed_core::{EngineConfig, Pool, Recycle, Segment, Streak};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn setup<T: Recycle + Default>(capacity: usize, density: f32) -> (Pool<T>, EngineConfig) {
    let cfg = EngineConfig::default();
    let mut rng = StdRng::seed_from_u64(7);
    let ctx = SpawnContext {
        palette: &cfg.palette,
        road: &cfg.road,
    };
    let mut pool = Pool::new(capacity, cfg.length, &ctx, &mut rng);
    pool.set_density(density, &ctx);
    (pool, cfg)
}

#[test]
fn density_selects_the_active_prefix() {
    let (pool, _) = setup::<Segment>(160, 50.0);
    assert_eq!(pool.capacity(), 160);
    assert_eq!(pool.active_count(), 80);
    assert_eq!(pool.active().count(), 80);
    assert!(pool.slots()[..80].iter().all(|s| s.active));
    assert!(pool.slots()[80..].iter().all(|s| !s.active));
}

#[test]
fn density_is_clamped() {
    let (pool, _) = setup::<Segment>(100, 250.0);
    assert_eq!(pool.active_count(), 100);
    let (pool, _) = setup::<Segment>(100, -5.0);
    assert_eq!(pool.active_count(), 0);
}

#[test]
fn wrapping_keeps_size_and_bounds() {
    let (mut pool, cfg) = setup::<Segment>(160, 50.0);
    let ctx = SpawnContext {
        palette: &cfg.palette,
        road: &cfg.road,
    };
    let range = pool.range();
    // 2 s at 60 Hz, speed 1.0
    let step = 150.0 / 60.0;
    let mut wrapped = 0;
    for _ in 0..120 {
        wrapped += pool.advance(step, &ctx);
        assert_eq!(pool.capacity(), 160);
        assert_eq!(pool.active_count(), 80);
        for item in pool.active() {
            assert!(item.z >= 0.0 && item.z <= range, "z = {}", item.z);
        }
    }
    // 300 units of travel against a range of 400: roughly three quarters wrap
    assert!(wrapped > 40, "wrapped = {wrapped}");
    let wraps: u32 = pool.slots().iter().map(|s| s.wraps).sum();
    assert_eq!(wraps as usize, wrapped);
}

#[test]
fn dormant_slots_do_not_move() {
    let (mut pool, cfg) = setup::<Segment>(10, 50.0);
    let ctx = SpawnContext {
        palette: &cfg.palette,
        road: &cfg.road,
    };
    let before: Vec<f32> = pool.slots()[5..].iter().map(|s| s.item.z).collect();
    pool.advance(1000.0, &ctx);
    let after: Vec<f32> = pool.slots()[5..].iter().map(|s| s.item.z).collect();
    assert_eq!(before, after);
}

#[test]
fn a_jump_larger_than_the_range_still_lands_inside_it() {
    let (mut pool, cfg) = setup::<Streak>(50, 100.0);
    let ctx = SpawnContext {
        palette: &cfg.palette,
        road: &cfg.road,
    };
    pool.advance(5000.0, &ctx);
    for item in pool.active() {
        assert!(item.z >= 0.0 && item.z <= pool.range());
    }
}

#[test]
fn non_positive_distance_is_a_no_op() {
    let (mut pool, cfg) = setup::<Segment>(20, 100.0);
    let ctx = SpawnContext {
        palette: &cfg.palette,
        road: &cfg.road,
    };
    let before: Vec<f32> = pool.active().map(|s| s.z).collect();
    assert_eq!(pool.advance(0.0, &ctx), 0);
    assert_eq!(pool.advance(-4.0, &ctx), 0);
    assert_eq!(pool.advance(f32::NAN, &ctx), 0);
    let after: Vec<f32> = pool.active().map(|s| s.z).collect();
    assert_eq!(before, after);
}

#[test]
fn raising_density_scatters_new_elements() {
    let (mut pool, cfg) = setup::<Segment>(200, 0.0);
    let ctx = SpawnContext {
        palette: &cfg.palette,
        road: &cfg.road,
    };
    pool.set_density(100.0, &ctx);
    let zs: Vec<f32> = pool.active().map(|s| s.z).collect();
    let near = zs.iter().filter(|z| **z < pool.range() * 0.5).count();
    assert!(near > 40 && near < 160, "near = {near}");
}

#[test]
fn streak_sides_follow_their_speed_bands() {
    let (pool, _) = setup::<Streak>(300, 100.0);
    let mut saw = (false, false);
    for s in pool.active() {
        match s.side {
            Side::Left => {
                saw.0 = true;
                assert!(s.speed >= 1.4 && s.x < 0.0);
            }
            Side::Right => {
                saw.1 = true;
                assert!(s.speed <= 0.7 && s.x > 0.0);
            }
        }
    }
    assert!(saw.0 && saw.1);
}

#[test]
fn same_seed_same_pool() {
    let (a, _) = setup::<Streak>(64, 100.0);
    let (b, _) = setup::<Streak>(64, 100.0);
    let za: Vec<f32> = a.active().map(|s| s.z).collect();
    let zb: Vec<f32> = b.active().map(|s| s.z).collect();
    assert_eq!(za, zb);
}

#[test]
fn one_long_step_lands_where_two_short_steps_do() {
    let (mut a, cfg) = setup::<Streak>(120, 100.0);
    let (mut b, _) = setup::<Streak>(120, 100.0);
    let ctx = SpawnContext {
        palette: &cfg.palette,
        road: &cfg.road,
    };
    for _ in 0..40 {
        a.advance(24.0, &ctx);
        b.advance(12.0, &ctx);
        b.advance(12.0, &ctx);
    }
    for (sa, sb) in a.slots().iter().zip(b.slots()) {
        assert_eq!(sa.wraps, sb.wraps);
        assert_eq!(sa.item.speed, sb.item.speed);
        assert!((sa.item.z - sb.item.z).abs() < 1e-2, "{} vs {}", sa.item.z, sb.item.z);
    }
}

#[test]
fn every_lap_of_a_long_step_is_counted() {
    let (mut pool, cfg) = setup::<Segment>(40, 100.0);
    let ctx = SpawnContext {
        palette: &cfg.palette,
        road: &cfg.road,
    };
    let range = pool.range();
    let before: Vec<f32> = pool.active().map(|s| s.z).collect();
    let wrapped = pool.advance(range * 2.5, &ctx);
    let wraps: u32 = pool.slots().iter().map(|s| s.wraps).sum();
    assert_eq!(wraps as usize, wrapped);
    for (slot, z0) in pool.slots().iter().zip(before) {
        assert!((2..=3).contains(&slot.wraps), "wraps = {}", slot.wraps);
        let expected = (z0 - range * 2.5).rem_euclid(range);
        assert!((slot.item.z - expected).abs() < 1e-2, "{} vs {expected}", slot.item.z);
    }
}
