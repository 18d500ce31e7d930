//! Bindings from externally supplied statistics to parameter targets.
//!
//! Statistics arrive already computed (max speed, throttle share, ...); a
//! binding only rescales a value into a parameter's range and forwards it as
//! a live update.

use crate::params::ParamId;
use crate::sink::ParamSink;
use fnv::FnvHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatBinding {
    pub stat: String,
    pub param: String,
    #[serde(alias = "in")]
    pub input: [f32; 2],
    #[serde(alias = "out")]
    pub output: [f32; 2],
}

impl StatBinding {
    pub fn new(stat: &str, param: ParamId, input: [f32; 2], output: [f32; 2]) -> Self {
        Self {
            stat: stat.into(),
            param: param.name().into(),
            input,
            output,
        }
    }

    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new("max_speed", ParamId::Speed, [0.0, 360.0], [0.5, 4.0]),
            Self::new(
                "throttle_percentage",
                ParamId::Density,
                [0.0, 100.0],
                [20.0, 100.0],
            ),
            Self::new("speed_std", ParamId::Distortion, [0.0, 80.0], [0.0, 1.0]),
        ]
    }

    pub fn target(&self) -> Option<ParamId> {
        ParamId::from_name(&self.param)
    }

    pub fn is_valid(&self) -> bool {
        self.target().is_some()
            && self.input.iter().chain(self.output.iter()).all(|v| v.is_finite())
            && self.input[0] != self.input[1]
    }

    /// Clamp `value` to the input range and map it linearly onto the output range.
    pub fn map(&self, value: f32) -> f32 {
        let [i0, i1] = self.input;
        let [o0, o1] = self.output;
        let t = ((value - i0) / (i1 - i0)).clamp(0.0, 1.0);
        o0 + t * (o1 - o0)
    }
}

/// Binding table keyed by statistic name.
#[derive(Clone, Debug, Default)]
pub struct TelemetryBindings {
    by_stat: FnvHashMap<String, SmallVec<[StatBinding; 2]>>,
}

impl TelemetryBindings {
    pub fn new(bindings: &[StatBinding]) -> Self {
        let mut by_stat: FnvHashMap<String, SmallVec<[StatBinding; 2]>> = FnvHashMap::default();
        for b in bindings.iter().filter(|b| b.is_valid()) {
            by_stat.entry(b.stat.clone()).or_default().push(b.clone());
        }
        Self { by_stat }
    }

    pub fn len(&self) -> usize {
        self.by_stat.values().map(|v| v.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_stat.is_empty()
    }

    /// Forward one statistic; returns how many parameter targets were written.
    pub fn apply(&self, stat: &str, value: f32, sink: &ParamSink) -> usize {
        if !value.is_finite() {
            log::debug!("[telemetry] ignoring non-finite '{}'", stat);
            return 0;
        }
        let Some(list) = self.by_stat.get(stat) else {
            log::debug!("[telemetry] no binding for '{}'", stat);
            return 0;
        };
        for b in list {
            if let Some(id) = b.target() {
                sink.set_id(id, b.map(value));
            }
        }
        list.len()
    }

    /// Forward every `(name, value)` pair, e.g. a statistics snapshot.
    pub fn apply_all<'a, I>(&self, stats: I, sink: &ParamSink) -> usize
    where
        I: IntoIterator<Item = (&'a str, f32)>,
    {
        stats
            .into_iter()
            .map(|(name, v)| self.apply(name, v, sink))
            .sum()
    }

    /// Forward every numeric member of a JSON object.
    pub fn apply_json(&self, stats: &serde_json::Value, sink: &ParamSink) -> usize {
        let Some(obj) = stats.as_object() else {
            log::debug!("[telemetry] statistics payload is not an object");
            return 0;
        };
        self.apply_all(
            obj.iter()
                .filter_map(|(k, v)| v.as_f64().map(|n| (k.as_str(), n as f32))),
            sink,
        )
    }
}
