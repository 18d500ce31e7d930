//! Parameter store: current and target values for every visual parameter.
//!
//! External writers (pointer input, telemetry) only ever touch targets. The
//! render loop reads `current` values, which follow their targets through
//! [`crate::interp::advance`].

use crate::config::EngineConfig;
use crate::constants::*;
use std::fmt;

/// Every parameter the engine animates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParamId {
    Speed,
    Density,
    Distortion,
    ColorIntensity,
    Fov,
}

impl ParamId {
    pub const ALL: [ParamId; 5] = [
        ParamId::Speed,
        ParamId::Density,
        ParamId::Distortion,
        ParamId::ColorIntensity,
        ParamId::Fov,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Resolve a parameter by its external name (snake_case or camelCase).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim() {
            "speed" => Some(ParamId::Speed),
            "density" | "particle_density" | "particleDensity" => Some(ParamId::Density),
            "distortion" | "distortion_amount" | "distortionAmount" => Some(ParamId::Distortion),
            "color_intensity" | "colorIntensity" | "intensity" => Some(ParamId::ColorIntensity),
            "fov" => Some(ParamId::Fov),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ParamId::Speed => "speed",
            ParamId::Density => "density",
            ParamId::Distortion => "distortion",
            ParamId::ColorIntensity => "color_intensity",
            ParamId::Fov => "fov",
        }
    }
}

impl fmt::Display for ParamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One animated value.
///
/// `rise_rate` applies while `current < target`, `fall_rate` otherwise, so a
/// parameter can ramp up and settle back at different speeds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Param {
    pub current: f32,
    pub target: f32,
    pub rise_rate: f32,
    pub fall_rate: f32,
    pub min: f32,
    pub max: f32,
}

impl Param {
    pub fn new(value: f32, rate: f32, min: f32, max: f32) -> Self {
        Self::asymmetric(value, rate, rate, min, max)
    }

    pub fn asymmetric(value: f32, rise_rate: f32, fall_rate: f32, min: f32, max: f32) -> Self {
        let v = value.clamp(min, max);
        Self {
            current: v,
            target: v,
            rise_rate: rise_rate.max(0.0),
            fall_rate: fall_rate.max(0.0),
            min,
            max,
        }
    }

    #[inline]
    pub fn rate(&self) -> f32 {
        if self.target > self.current {
            self.rise_rate
        } else {
            self.fall_rate
        }
    }

    #[inline]
    pub fn is_settled(&self, epsilon: f32) -> bool {
        (self.target - self.current).abs() <= epsilon
    }
}

#[derive(Clone, Debug)]
pub struct ParameterStore {
    entries: [Param; 5],
    epsilon: f32,
}

impl ParameterStore {
    /// Initial state from a loaded configuration; every current value starts at its target.
    pub fn from_config(config: &EngineConfig) -> Self {
        let speed_rise = SETTLE_FACTOR / config.ramp_up_sec;
        let speed_fall = SETTLE_FACTOR / config.ramp_down_sec;
        let entries = [
            Param::asymmetric(config.base_speed, speed_rise, speed_fall, 0.0, SPEED_LIMIT),
            Param::new(config.density, DENSITY_RATE, 0.0, 100.0),
            Param::new(config.distortion, DISTORTION_RATE, 0.0, 1.0),
            Param::new(config.color_intensity, INTENSITY_RATE, 0.0, 4.0),
            Param::asymmetric(config.fov_degrees, speed_rise, speed_fall, 10.0, 170.0),
        ];
        Self {
            entries,
            epsilon: config.snap_epsilon,
        }
    }

    /// Overwrite the target of a named parameter.
    ///
    /// Unknown names and non-finite values are logged and ignored; returns
    /// whether the write was applied.
    pub fn set_target(&mut self, name: &str, value: f32) -> bool {
        match ParamId::from_name(name) {
            Some(id) => self.set_target_id(id, value),
            None => {
                log::debug!("[params] ignoring update for unknown parameter '{}'", name);
                false
            }
        }
    }

    pub fn set_target_id(&mut self, id: ParamId, value: f32) -> bool {
        if !value.is_finite() {
            log::debug!("[params] ignoring non-finite value for '{}'", id);
            return false;
        }
        let p = &mut self.entries[id.index()];
        p.target = value.clamp(p.min, p.max);
        true
    }

    #[inline]
    pub fn read(&self, id: ParamId) -> f32 {
        self.entries[id.index()].current
    }

    /// Current value by external name.
    pub fn read_named(&self, name: &str) -> Option<f32> {
        ParamId::from_name(name).map(|id| self.read(id))
    }

    #[inline]
    pub fn target(&self, id: ParamId) -> f32 {
        self.entries[id.index()].target
    }

    #[inline]
    pub fn get(&self, id: ParamId) -> &Param {
        &self.entries[id.index()]
    }

    #[inline]
    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    pub fn is_settled(&self, id: ParamId) -> bool {
        self.get(id).is_settled(self.epsilon)
    }

    pub(crate) fn entries_mut(&mut self) -> &mut [Param] {
        &mut self.entries
    }

    pub fn entries(&self) -> &[Param] {
        &self.entries
    }

    /// Advance every entry toward its target; see [`crate::interp::advance`].
    pub fn tick(&mut self, dt_sec: f32) {
        crate::interp::advance(self, dt_sec);
    }
}
