//! Input state machine: press/hold/release → speed intent.
//!
//! ```text
//! Idle --press--> Accelerating --ramp elapsed--> Cruising
//!   ^                  |                            |
//!   |               release                      release
//!   |                  v                            v
//!   +--settled--- Decelerating <--------------------+
//! ```
//!
//! Transitions only emit target writes; the interpolator shapes the curve.
//! Telemetry may write the same `speed` target between transitions and the
//! latest write wins until the next transition.

use crate::params::{ParamId, ParameterStore};
use smallvec::SmallVec;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Intent {
    #[default]
    Idle,
    Accelerating,
    Cruising,
    Decelerating,
}

impl Intent {
    /// Whether the user is currently holding the press.
    #[inline]
    pub fn is_held(self) -> bool {
        matches!(self, Intent::Accelerating | Intent::Cruising)
    }

    pub fn name(self) -> &'static str {
        match self {
            Intent::Idle => "idle",
            Intent::Accelerating => "accelerating",
            Intent::Cruising => "cruising",
            Intent::Decelerating => "decelerating",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    /// pointer-down, touch-start, hold key down
    PressStart,
    /// pointer-up, touch-end, pointer-leave, hold key up
    PressEnd,
    ToggleUi,
}

/// Pointer event names (DOM naming) and the press transition each signals.
pub const POINTER_PRESS_EVENTS: [(&str, InputEvent); 4] = [
    ("pointerdown", InputEvent::PressStart),
    ("pointerup", InputEvent::PressEnd),
    ("pointerleave", InputEvent::PressEnd),
    ("pointercancel", InputEvent::PressEnd),
];

/// Touch event names. An interrupted touch ends the press like a lifted one.
pub const TOUCH_PRESS_EVENTS: [(&str, InputEvent); 3] = [
    ("touchstart", InputEvent::PressStart),
    ("touchend", InputEvent::PressEnd),
    ("touchcancel", InputEvent::PressEnd),
];

/// Map a keyboard key (DOM `KeyboardEvent.key` naming) to an input event.
#[inline]
pub fn input_for_key(key: &str, pressed: bool) -> Option<InputEvent> {
    match key {
        " " | "Space" | "Spacebar" | "ArrowUp" | "w" | "W" => Some(if pressed {
            InputEvent::PressStart
        } else {
            InputEvent::PressEnd
        }),
        "h" | "H" if pressed => Some(InputEvent::ToggleUi),
        _ => None,
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IntentTuning {
    pub ramp_up_sec: f32,
    pub speed_up: f32,
    pub fov_degrees: f32,
    pub fov_speed_up_degrees: f32,
}

#[derive(Clone, Debug)]
pub struct IntentMachine {
    state: Intent,
    time_in_state: f32,
    baseline_speed: f32,
    tuning: IntentTuning,
}

/// Target writes produced by a transition.
pub type TargetWrites = SmallVec<[(ParamId, f32); 2]>;

impl IntentMachine {
    pub fn new(tuning: IntentTuning) -> Self {
        Self {
            state: Intent::Idle,
            time_in_state: 0.0,
            baseline_speed: 0.0,
            tuning,
        }
    }

    #[inline]
    pub fn state(&self) -> Intent {
        self.state
    }

    #[inline]
    pub fn time_in_state(&self) -> f32 {
        self.time_in_state
    }

    /// Speed the machine returns to on release.
    #[inline]
    pub fn baseline_speed(&self) -> f32 {
        self.baseline_speed
    }

    fn enter(&mut self, next: Intent) {
        log::debug!("[intent] {:?} -> {:?}", self.state, next);
        self.state = next;
        self.time_in_state = 0.0;
    }

    /// Press start; the baseline is the speed target at the moment of the press.
    pub fn press(&mut self, store: &ParameterStore) -> TargetWrites {
        let mut writes = TargetWrites::new();
        match self.state {
            Intent::Idle => {
                self.baseline_speed = store.target(ParamId::Speed);
            }
            // pressed again while still settling: keep the original baseline
            Intent::Decelerating => {}
            Intent::Accelerating | Intent::Cruising => return writes,
        }
        self.enter(Intent::Accelerating);
        writes.push((
            ParamId::Speed,
            self.baseline_speed * self.tuning.speed_up,
        ));
        writes.push((ParamId::Fov, self.tuning.fov_speed_up_degrees));
        writes
    }

    pub fn release(&mut self) -> TargetWrites {
        let mut writes = TargetWrites::new();
        if !self.state.is_held() {
            return writes;
        }
        self.enter(Intent::Decelerating);
        writes.push((ParamId::Speed, self.baseline_speed));
        writes.push((ParamId::Fov, self.tuning.fov_degrees));
        writes
    }

    /// Time-driven transitions; call after the parameters have been advanced.
    ///
    /// Returns `true` when the state changed.
    pub fn update(&mut self, dt_sec: f32, store: &ParameterStore) -> bool {
        if dt_sec <= 0.0 {
            return false;
        }
        self.time_in_state += dt_sec;
        match self.state {
            Intent::Accelerating if self.time_in_state >= self.tuning.ramp_up_sec => {
                self.enter(Intent::Cruising);
                true
            }
            Intent::Decelerating if store.is_settled(ParamId::Speed) => {
                self.enter(Intent::Idle);
                true
            }
            _ => false,
        }
    }

    /// 0 at rest, 1 at full boost; follows the current speed rather than the state.
    pub fn boost_fraction(&self, store: &ParameterStore) -> f32 {
        let base = self.baseline_speed.max(1e-4);
        let top = base * self.tuning.speed_up;
        if self.state == Intent::Idle || top <= base {
            return 0.0;
        }
        ((store.read(ParamId::Speed) - base) / (top - base)).clamp(0.0, 1.0)
    }
}
