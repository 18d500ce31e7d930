//! Versioned configuration schema and its loader.
//!
//! Loading never fails: unknown keys are ignored, wrong types and
//! out-of-range values fall back to the preset default, and every such event
//! is logged and recorded in the returned [`LoadReport`].

use crate::distortion::DistortionKind;
use crate::palette::{CarColors, Palette, PaletteRole, Rgb};
use crate::telemetry::StatBinding;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use std::ops::RangeInclusive;

pub const SCHEMA_VERSION: u32 = 1;

pub const PRESET_NAMES: [&str; 4] = ["neon", "sunset", "cyber", "deep"];

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RoadLayout {
    pub road_width: f32,
    pub island_width: f32,
    pub lanes_per_road: u32,
}

impl RoadLayout {
    /// Distance from the center line to the inner edge of either road.
    #[inline]
    pub fn half_island(&self) -> f32 {
        self.island_width * 0.5
    }

    /// Lane center on one side; `left` mirrors to negative x.
    pub fn lane_center(&self, left: bool, lane: u32) -> f32 {
        let lanes = self.lanes_per_road.max(1);
        let lane_w = self.road_width / lanes as f32;
        let x = self.half_island() + (lane.min(lanes - 1) as f32 + 0.5) * lane_w;
        if left {
            -x
        } else {
            x
        }
    }

    /// X of the boundary between lane `b - 1` and lane `b` (1..lanes).
    pub fn lane_boundary(&self, left: bool, b: u32) -> f32 {
        let lanes = self.lanes_per_road.max(1);
        let x = self.half_island() + b.min(lanes) as f32 * (self.road_width / lanes as f32);
        if left {
            -x
        } else {
            x
        }
    }

    /// Outer edge of the roads, where side sticks stand.
    #[inline]
    pub fn outer_edge(&self) -> f32 {
        self.half_island() + self.road_width
    }
}

impl Default for RoadLayout {
    fn default() -> Self {
        Self {
            road_width: 9.0,
            island_width: 2.0,
            lanes_per_road: 3,
        }
    }
}

/// Immutable engine configuration.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EngineConfig {
    pub version: u32,
    pub preset: String,
    pub base_speed: f32,
    pub speed_up: f32,
    pub density: f32,
    pub distortion: f32,
    pub distortion_kind: DistortionKind,
    pub color_intensity: f32,
    pub fov_degrees: f32,
    pub fov_speed_up_degrees: f32,
    pub ramp_up_sec: f32,
    pub ramp_down_sec: f32,
    pub segment_count: usize,
    pub streak_count: usize,
    pub length: f32,
    pub road: RoadLayout,
    pub snap_epsilon: f32,
    pub seed: u64,
    pub palette: Palette,
    pub bindings: Vec<StatBinding>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            version: SCHEMA_VERSION,
            preset: "neon".into(),
            base_speed: 1.0,
            speed_up: 3.0,
            density: 50.0,
            distortion: 0.5,
            distortion_kind: DistortionKind::Turbulent,
            color_intensity: 1.0,
            fov_degrees: 90.0,
            fov_speed_up_degrees: 150.0,
            ramp_up_sec: 0.8,
            ramp_down_sec: 1.2,
            segment_count: 160,
            streak_count: 240,
            length: 400.0,
            road: RoadLayout::default(),
            snap_epsilon: 1e-3,
            seed: 42,
            palette: Palette::neon(),
            bindings: StatBinding::defaults(),
        }
    }
}

impl EngineConfig {
    /// Built-in preset by name.
    pub fn preset(name: &str) -> Option<Self> {
        let base = Self::default();
        match name.trim().to_ascii_lowercase().as_str() {
            "neon" | "default" => Some(base),
            "sunset" => Some(Self {
                preset: "sunset".into(),
                distortion_kind: DistortionKind::Mountain,
                distortion: 0.6,
                length: 400.0,
                road: RoadLayout {
                    road_width: 10.0,
                    island_width: 5.0,
                    lanes_per_road: 4,
                },
                palette: Palette::sunset(),
                ..base
            }),
            "cyber" => Some(Self {
                preset: "cyber".into(),
                distortion_kind: DistortionKind::Xy,
                distortion: 0.7,
                color_intensity: 1.4,
                streak_count: 320,
                palette: Palette::cyber(),
                ..base
            }),
            "deep" => Some(Self {
                preset: "deep".into(),
                distortion_kind: DistortionKind::Deep,
                distortion: 0.8,
                speed_up: 2.0,
                fov_speed_up_degrees: 140.0,
                road: RoadLayout {
                    road_width: 18.0,
                    island_width: 2.0,
                    lanes_per_road: 3,
                },
                palette: Palette::deep(),
                ..base
            }),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IssueKind {
    NotAnObject,
    Malformed,
    UnknownKey,
    WrongType,
    OutOfRange,
    UnsupportedVersion,
    UnknownPreset,
}

/// One recovered problem in a configuration object.
#[derive(Clone, Debug, PartialEq)]
pub struct ConfigIssue {
    pub key: String,
    pub kind: IssueKind,
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match self.kind {
            IssueKind::NotAnObject => "configuration is not an object; using defaults",
            IssueKind::Malformed => "malformed value; using default",
            IssueKind::UnknownKey => "unrecognized option ignored",
            IssueKind::WrongType => "wrong type; using default",
            IssueKind::OutOfRange => "out of range; using default",
            IssueKind::UnsupportedVersion => "unsupported schema version; loading anyway",
            IssueKind::UnknownPreset => "unknown preset; using neon",
        };
        write!(f, "'{}': {}", self.key, what)
    }
}

#[derive(Clone, Debug)]
pub struct LoadReport {
    pub config: EngineConfig,
    pub issues: Vec<ConfigIssue>,
}

impl LoadReport {
    pub fn has_issue(&self, key: &str, kind: IssueKind) -> bool {
        self.issues.iter().any(|i| i.key == key && i.kind == kind)
    }
}

/// Parse a JSON document and load it; unparsable text yields the defaults.
pub fn load_str(json: &str) -> LoadReport {
    match serde_json::from_str::<Value>(json) {
        Ok(v) => load(&v),
        Err(e) => {
            log::warn!("[config] unparsable configuration ({}); using defaults", e);
            LoadReport {
                config: EngineConfig::default(),
                issues: vec![ConfigIssue {
                    key: String::new(),
                    kind: IssueKind::Malformed,
                }],
            }
        }
    }
}

/// Validate and normalize a configuration object.
pub fn load(value: &Value) -> LoadReport {
    let mut issues = Vec::new();
    let obj = match value {
        Value::Object(obj) => obj,
        Value::Null => {
            return LoadReport {
                config: EngineConfig::default(),
                issues,
            }
        }
        _ => {
            record(&mut issues, "", IssueKind::NotAnObject);
            return LoadReport {
                config: EngineConfig::default(),
                issues,
            };
        }
    };

    let mut cfg = base_preset(obj, &mut issues);
    for (raw_key, v) in obj {
        let key = snake_case(raw_key);
        let mut r = Reader {
            key: raw_key,
            issues: &mut issues,
        };
        match key.as_str() {
            "preset" => {}
            "version" => {
                let ok = v.as_u64().map(|n| n == SCHEMA_VERSION as u64);
                if ok != Some(true) {
                    r.issue(IssueKind::UnsupportedVersion);
                }
            }
            "speed" | "base_speed" => r.f32(v, 0.0..=20.0, &mut cfg.base_speed),
            "speed_up" => r.f32(v, 1.0..=10.0, &mut cfg.speed_up),
            "density" | "particle_density" => r.f32(v, 0.0..=100.0, &mut cfg.density),
            "distortion" => match v {
                Value::String(name) => r.distortion_kind(name, &mut cfg.distortion_kind),
                _ => r.f32(v, 0.0..=1.0, &mut cfg.distortion),
            },
            "distortion_amount" => r.f32(v, 0.0..=1.0, &mut cfg.distortion),
            "distortion_kind" => match v.as_str() {
                Some(name) => r.distortion_kind(name, &mut cfg.distortion_kind),
                None => r.issue(IssueKind::WrongType),
            },
            "color_intensity" | "intensity" => r.f32(v, 0.0..=4.0, &mut cfg.color_intensity),
            "fov" => r.f32(v, 30.0..=140.0, &mut cfg.fov_degrees),
            "fov_speed_up" => r.f32(v, 30.0..=170.0, &mut cfg.fov_speed_up_degrees),
            "ramp_up" | "ramp_up_sec" => r.f32(v, 0.05..=10.0, &mut cfg.ramp_up_sec),
            "ramp_down" | "ramp_down_sec" => r.f32(v, 0.05..=10.0, &mut cfg.ramp_down_sec),
            "segment_count" => r.count(v, 1..=4096, &mut cfg.segment_count),
            "streak_count" | "light_pairs" => r.count(v, 1..=8192, &mut cfg.streak_count),
            "length" => r.f32(v, 50.0..=2000.0, &mut cfg.length),
            "road_width" => r.f32(v, 1.0..=50.0, &mut cfg.road.road_width),
            "island_width" => r.f32(v, 0.0..=20.0, &mut cfg.road.island_width),
            "lanes_per_road" => {
                let mut lanes = cfg.road.lanes_per_road as usize;
                r.count(v, 1..=8, &mut lanes);
                cfg.road.lanes_per_road = lanes as u32;
            }
            "snap_epsilon" => r.f32(v, 1e-6..=0.1, &mut cfg.snap_epsilon),
            "seed" => match v.as_u64() {
                Some(s) => cfg.seed = s,
                None => r.issue(IssueKind::WrongType),
            },
            "palette" | "colors" => r.palette(v, &mut cfg.palette),
            "bindings" => r.bindings(v, &mut cfg.bindings),
            _ => r.ignore(),
        }
    }
    if cfg.fov_speed_up_degrees < cfg.fov_degrees {
        log::warn!("[config] fov_speed_up below fov; pressing will narrow the view");
    }
    LoadReport { config: cfg, issues }
}

fn base_preset(obj: &Map<String, Value>, issues: &mut Vec<ConfigIssue>) -> EngineConfig {
    let Some(v) = obj.get("preset") else {
        return EngineConfig::default();
    };
    match v.as_str().and_then(EngineConfig::preset) {
        Some(cfg) => cfg,
        None => {
            record(issues, "preset", IssueKind::UnknownPreset);
            EngineConfig::default()
        }
    }
}

fn record(issues: &mut Vec<ConfigIssue>, key: &str, kind: IssueKind) {
    let issue = ConfigIssue {
        key: key.to_string(),
        kind,
    };
    log::warn!("[config] {}", issue);
    issues.push(issue);
}

/// `rampUpSec` → `ramp_up_sec`; snake_case keys pass through unchanged.
pub fn snake_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for (i, ch) in key.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

struct Reader<'a> {
    key: &'a str,
    issues: &'a mut Vec<ConfigIssue>,
}

impl Reader<'_> {
    fn issue(&mut self, kind: IssueKind) {
        record(self.issues, self.key, kind);
    }

    fn ignore(&mut self) {
        log::debug!("[config] ignoring unrecognized option '{}'", self.key);
        self.issues.push(ConfigIssue {
            key: self.key.to_string(),
            kind: IssueKind::UnknownKey,
        });
    }

    fn f32(&mut self, v: &Value, range: RangeInclusive<f32>, slot: &mut f32) {
        match v.as_f64().map(|n| n as f32) {
            Some(n) if n.is_finite() && range.contains(&n) => *slot = n,
            Some(_) => self.issue(IssueKind::OutOfRange),
            None => self.issue(IssueKind::WrongType),
        }
    }

    fn count(&mut self, v: &Value, range: RangeInclusive<usize>, slot: &mut usize) {
        let Some(n) = v.as_f64() else {
            self.issue(IssueKind::WrongType);
            return;
        };
        let rounded = n.round();
        if rounded.is_finite()
            && rounded >= *range.start() as f64
            && rounded <= *range.end() as f64
        {
            *slot = rounded as usize;
        } else {
            self.issue(IssueKind::OutOfRange);
        }
    }

    fn distortion_kind(&mut self, name: &str, slot: &mut DistortionKind) {
        match DistortionKind::from_name(name) {
            Some(kind) => *slot = kind,
            None => self.issue(IssueKind::Malformed),
        }
    }

    fn palette(&mut self, v: &Value, palette: &mut Palette) {
        let Some(entries) = v.as_object() else {
            self.issue(IssueKind::WrongType);
            return;
        };
        for (role_name, color) in entries {
            let Some(role) = PaletteRole::from_name(role_name) else {
                log::debug!("[config] ignoring unknown palette role '{}'", role_name);
                continue;
            };
            let is_list_role = matches!(role, PaletteRole::LeftCars | PaletteRole::RightCars);
            if is_list_role {
                if let Some(list) = parse_color_list(color) {
                    palette.set_cars(role, list);
                    continue;
                }
            }
            match Rgb::parse(color) {
                Some(c) => palette.set(role, c),
                None => record(self.issues, role_name, IssueKind::Malformed),
            }
        }
    }

    fn bindings(&mut self, v: &Value, slot: &mut Vec<StatBinding>) {
        match serde_json::from_value::<Vec<StatBinding>>(v.clone()) {
            Ok(list) => {
                let (valid, invalid): (Vec<_>, Vec<_>) =
                    list.into_iter().partition(StatBinding::is_valid);
                for b in &invalid {
                    log::warn!("[config] dropping invalid binding {} -> {}", b.stat, b.param);
                }
                if !invalid.is_empty() {
                    self.issue(IssueKind::Malformed);
                }
                *slot = valid;
            }
            Err(e) => {
                log::warn!("[config] bindings not understood: {}", e);
                self.issue(IssueKind::Malformed);
            }
        }
    }
}

fn parse_color_list(v: &Value) -> Option<CarColors> {
    let items = v.as_array()?;
    if items.is_empty() {
        return None;
    }
    items.iter().map(Rgb::parse).collect()
}
