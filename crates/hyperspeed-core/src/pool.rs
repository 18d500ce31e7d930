//! Fixed-size recycling arena for tunnel geometry.
//!
//! Elements travel from the far boundary (`z = range`) toward the camera
//! (`z = 0`). When one crosses behind the camera it is moved back to the far
//! end and given fresh attributes instead of being reallocated. Slots
//! `0..active_count` are active; the rest are dormant and skipped.
//!
//! Every respawn draws from a stream keyed by (pool seed, slot, spawn count),
//! so the attributes a slot receives do not depend on how many other slots
//! respawned before it in the same tick, or on how time was split into ticks.

use crate::config::RoadLayout;
use crate::constants::*;
use crate::palette::{Palette, Rgb};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// What a respawned element may draw from.
#[derive(Clone, Copy, Debug)]
pub struct SpawnContext<'a> {
    pub palette: &'a Palette,
    pub road: &'a RoadLayout,
}

/// An element the pool can recycle.
pub trait Recycle {
    fn z(&self) -> f32;
    fn set_z(&mut self, z: f32);
    /// Multiplier on the shared travel distance.
    fn speed_factor(&self) -> f32 {
        1.0
    }
    /// Re-roll everything except the position along the travel axis.
    fn respawn(&mut self, ctx: &SpawnContext<'_>, rng: &mut StdRng);
}

#[derive(Clone, Debug)]
pub struct Slot<T> {
    pub item: T,
    pub active: bool,
    /// Times this slot has been moved back to the far boundary.
    pub wraps: u32,
    spawns: u32,
}

#[derive(Clone, Debug)]
pub struct Pool<T> {
    slots: Vec<Slot<T>>,
    active_count: usize,
    range: f32,
    seed: u64,
}

fn spawn_rng(seed: u64, index: usize, spawns: u32) -> StdRng {
    StdRng::seed_from_u64(
        seed ^ (index as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
            ^ (spawns as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F),
    )
}

impl<T: Recycle + Default> Pool<T> {
    /// Allocate `capacity` dormant elements; this is the only allocation the pool makes.
    pub fn new(capacity: usize, range: f32, ctx: &SpawnContext<'_>, rng: &mut StdRng) -> Self {
        let seed = rng.gen::<u64>();
        let slots = (0..capacity)
            .map(|i| {
                let mut item = T::default();
                item.respawn(ctx, &mut spawn_rng(seed, i, 0));
                Slot {
                    item,
                    active: false,
                    wraps: 0,
                    spawns: 1,
                }
            })
            .collect();
        Self {
            slots,
            active_count: 0,
            range: range.max(1.0),
            seed,
        }
    }
}

impl<T: Recycle> Pool<T> {
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn active_count(&self) -> usize {
        self.active_count
    }

    #[inline]
    pub fn range(&self) -> f32 {
        self.range
    }

    pub fn slots(&self) -> &[Slot<T>] {
        &self.slots
    }

    pub fn active(&self) -> impl Iterator<Item = &T> + '_ {
        self.slots[..self.active_count].iter().map(|s| &s.item)
    }

    /// Number of active slots for a density percentage.
    pub fn count_for_density(&self, density_pct: f32) -> usize {
        let frac = (density_pct / 100.0).clamp(0.0, 1.0);
        ((self.capacity() as f32) * frac).round() as usize
    }

    pub fn set_density(&mut self, density_pct: f32, ctx: &SpawnContext<'_>) {
        let n = self.count_for_density(density_pct);
        self.set_active_count(n, ctx);
    }

    /// Activate or retire slots. Newly active slots are scattered across the
    /// whole visible range so a density increase does not arrive as a wall.
    pub fn set_active_count(&mut self, n: usize, ctx: &SpawnContext<'_>) {
        let n = n.min(self.capacity());
        if n > self.active_count {
            let (seed, range) = (self.seed, self.range);
            for (i, slot) in self.slots[..n].iter_mut().enumerate().skip(self.active_count) {
                let mut rng = spawn_rng(seed, i, slot.spawns);
                slot.spawns = slot.spawns.wrapping_add(1);
                slot.item.respawn(ctx, &mut rng);
                slot.item.set_z(rng.gen_range(0.0..=range));
                slot.active = true;
            }
        } else {
            for slot in &mut self.slots[n..self.active_count] {
                slot.active = false;
            }
        }
        self.active_count = n;
    }

    /// Move every active element `distance` (times its own factor) toward the
    /// camera and recycle those that pass it. Returns how many wraps occurred.
    ///
    /// Travel left over after a crossing continues from the far boundary at
    /// the respawned element's own factor, so one long step lands where the
    /// same distance split into shorter steps would.
    pub fn advance(&mut self, distance: f32, ctx: &SpawnContext<'_>) -> usize {
        if !(distance > 0.0) {
            return 0;
        }
        let (seed, range) = (self.seed, self.range);
        let mut wrapped = 0;
        for (i, slot) in self.slots[..self.active_count].iter_mut().enumerate() {
            let mut remaining = distance;
            let mut laps = 0;
            loop {
                let factor = slot.item.speed_factor();
                if !(factor > 0.0) {
                    break;
                }
                let z = (slot.item.z() - remaining * factor).min(range);
                if z >= 0.0 {
                    slot.item.set_z(z);
                    break;
                }
                if laps == MAX_WRAPS_PER_ADVANCE {
                    slot.item.set_z(z.rem_euclid(range).min(range));
                    break;
                }
                remaining -= slot.item.z() / factor;
                slot.item.respawn(ctx, &mut spawn_rng(seed, i, slot.spawns));
                slot.item.set_z(range);
                slot.spawns = slot.spawns.wrapping_add(1);
                slot.wraps = slot.wraps.saturating_add(1);
                wrapped += 1;
                laps += 1;
            }
        }
        wrapped
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Side {
    #[default]
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SegmentKind {
    #[default]
    Dash,
    Stick,
}

/// Road dash or roadside light stick.
#[derive(Clone, Copy, Debug, Default)]
pub struct Segment {
    pub z: f32,
    pub x: f32,
    pub height: f32,
    pub kind: SegmentKind,
    pub color: Rgb,
}

impl Recycle for Segment {
    fn z(&self) -> f32 {
        self.z
    }

    fn set_z(&mut self, z: f32) {
        self.z = z;
    }

    fn respawn(&mut self, ctx: &SpawnContext<'_>, rng: &mut StdRng) {
        let lanes = ctx.road.lanes_per_road.max(1);
        let left = rng.gen_bool(0.5);
        if lanes < 2 || rng.gen::<f32>() < STICK_SHARE {
            self.kind = SegmentKind::Stick;
            let edge = ctx.road.outer_edge() + 0.5;
            self.x = if left { -edge } else { edge };
            self.height = rng.gen_range(STICK_HEIGHT_MIN..=STICK_HEIGHT_MAX);
            self.color = ctx.palette.sticks;
        } else {
            self.kind = SegmentKind::Dash;
            self.x = ctx.road.lane_boundary(left, rng.gen_range(1..lanes));
            self.height = 0.0;
            self.color = ctx.palette.broken_lines;
        }
    }
}

/// Car light streak.
#[derive(Clone, Copy, Debug)]
pub struct Streak {
    pub z: f32,
    pub x: f32,
    pub y: f32,
    pub length: f32,
    pub speed: f32,
    pub side: Side,
    pub color: Rgb,
}

impl Default for Streak {
    fn default() -> Self {
        Self {
            z: 0.0,
            x: 0.0,
            y: STREAK_HEIGHT,
            length: STREAK_LENGTH_MIN,
            speed: 1.0,
            side: Side::Left,
            color: Rgb::BLACK,
        }
    }
}

impl Recycle for Streak {
    fn z(&self) -> f32 {
        self.z
    }

    fn set_z(&mut self, z: f32) {
        self.z = z;
    }

    fn speed_factor(&self) -> f32 {
        self.speed
    }

    fn respawn(&mut self, ctx: &SpawnContext<'_>, rng: &mut StdRng) {
        let left = rng.gen_bool(0.5);
        let lanes = ctx.road.lanes_per_road.max(1);
        self.side = if left { Side::Left } else { Side::Right };
        self.x = ctx.road.lane_center(left, rng.gen_range(0..lanes)) + rng.gen_range(-0.3..=0.3);
        self.y = STREAK_HEIGHT + rng.gen_range(-0.2..=0.2);
        self.length = rng.gen_range(STREAK_LENGTH_MIN..=STREAK_LENGTH_MAX);
        self.speed = if left {
            rng.gen_range(ONCOMING_SPEED_MIN..=ONCOMING_SPEED_MAX)
        } else {
            rng.gen_range(SAME_WAY_SPEED_MIN..=SAME_WAY_SPEED_MAX)
        };
        let colors = if left {
            &ctx.palette.left_cars
        } else {
            &ctx.palette.right_cars
        };
        self.color = if colors.is_empty() {
            ctx.palette.sticks
        } else {
            colors[rng.gen_range(0..colors.len())]
        };
    }
}
