//! The per-frame driver.
//!
//! Within one tick the order is fixed: queued writes and input → parameter
//! interpolation → intent timers → camera → pool repositioning → uniforms →
//! frame. Only the parameter targets are reachable from outside (through the
//! [`ParamSink`]); pools and camera are written here alone.

use crate::camera::CameraState;
use crate::config::EngineConfig;
use crate::constants::*;
use crate::frame::{static_instances, Frame, FrameUniforms, InstanceData};
use crate::intent::{InputEvent, Intent, IntentMachine, IntentTuning, TargetWrites};
use crate::interp;
use crate::params::{ParamId, ParameterStore};
use crate::pool::{Pool, Segment, SpawnContext, Streak};
use crate::sink::{Command, ParamSink};
use crate::telemetry::TelemetryBindings;
use rand::rngs::StdRng;
use rand::SeedableRng;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    Uninitialized,
    Running,
    Paused,
    Disposed,
}

/// Notifications for the host.
#[derive(Clone, Debug, PartialEq)]
pub enum EngineEvent {
    Started,
    Paused,
    Resumed,
    IntentChanged(Intent),
    UiToggled,
    ContextLost,
    Unavailable(String),
    Disposed,
}

impl EngineEvent {
    /// Stable lowercase tag for hosts that forward events as plain data.
    pub fn kind(&self) -> &'static str {
        match self {
            EngineEvent::Started => "started",
            EngineEvent::Paused => "paused",
            EngineEvent::Resumed => "resumed",
            EngineEvent::IntentChanged(_) => "intent",
            EngineEvent::UiToggled => "ui_toggled",
            EngineEvent::ContextLost => "context_lost",
            EngineEvent::Unavailable(_) => "unavailable",
            EngineEvent::Disposed => "disposed",
        }
    }
}

pub struct Engine {
    config: EngineConfig,
    state: LoopState,
    store: ParameterStore,
    sink: ParamSink,
    intent: IntentMachine,
    bindings: TelemetryBindings,
    segments: Pool<Segment>,
    streaks: Pool<Streak>,
    camera: CameraState,
    time_sec: f32,
    frame_index: u64,
    viewport: (u32, u32),
    uniforms: FrameUniforms,
    static_count: usize,
    instances: Vec<InstanceData>,
    events: Vec<EngineEvent>,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let store = ParameterStore::from_config(&config);
        let ctx = SpawnContext {
            palette: &config.palette,
            road: &config.road,
        };
        let mut segments = Pool::new(config.segment_count, config.length, &ctx, &mut rng);
        let mut streaks = Pool::new(config.streak_count, config.length, &ctx, &mut rng);
        segments.set_density(config.density, &ctx);
        streaks.set_density(config.density, &ctx);

        let statics = static_instances(&config);
        let static_count = statics.len();
        let mut instances =
            Vec::with_capacity(static_count + segments.capacity() + streaks.capacity());
        instances.extend_from_slice(&statics);

        let intent = IntentMachine::new(IntentTuning {
            ramp_up_sec: config.ramp_up_sec,
            speed_up: config.speed_up,
            fov_degrees: config.fov_degrees,
            fov_speed_up_degrees: config.fov_speed_up_degrees,
        });
        log::info!(
            "[loop] engine built: preset={} segments={} streaks={} range={:.0}",
            config.preset,
            segments.capacity(),
            streaks.capacity(),
            config.length
        );
        Self {
            bindings: TelemetryBindings::new(&config.bindings),
            camera: CameraState::new(config.fov_degrees),
            state: LoopState::Uninitialized,
            sink: ParamSink::new(),
            store,
            intent,
            segments,
            streaks,
            time_sec: 0.0,
            frame_index: 0,
            viewport: (1, 1),
            uniforms: FrameUniforms::default(),
            static_count,
            instances,
            events: Vec::new(),
            config,
        }
    }

    // ---------------- lifecycle ----------------

    pub fn start(&mut self) {
        if self.state == LoopState::Uninitialized {
            self.state = LoopState::Running;
            self.events.push(EngineEvent::Started);
            log::info!("[loop] running");
        }
    }

    pub fn pause(&mut self) {
        if self.state == LoopState::Running {
            self.state = LoopState::Paused;
            self.events.push(EngineEvent::Paused);
            log::info!("[loop] paused");
        }
    }

    pub fn resume(&mut self) {
        if self.state == LoopState::Paused {
            self.state = LoopState::Running;
            self.events.push(EngineEvent::Resumed);
            log::info!("[loop] resumed");
        }
    }

    /// Stop accepting ticks and updates. Idempotent.
    pub fn dispose(&mut self) {
        if self.state == LoopState::Disposed {
            return;
        }
        self.state = LoopState::Disposed;
        self.sink.close();
        self.events.push(EngineEvent::Disposed);
        log::info!("[loop] disposed after {} frames", self.frame_index);
    }

    #[inline]
    pub fn state(&self) -> LoopState {
        self.state
    }

    #[inline]
    pub fn is_disposed(&self) -> bool {
        self.state == LoopState::Disposed
    }

    // ---------------- external writes ----------------

    /// Handle for live updates and input; writes land on the next tick.
    pub fn sink(&self) -> ParamSink {
        self.sink.clone()
    }

    /// Queue a target write by name.
    pub fn set_target(&self, name: &str, value: f32) -> bool {
        self.sink.set(name, value)
    }

    pub fn input(&self, ev: InputEvent) -> bool {
        self.sink.input(ev)
    }

    /// Route one externally computed statistic through the configured bindings.
    pub fn apply_stat(&self, stat: &str, value: f32) -> usize {
        self.bindings.apply(stat, value, &self.sink)
    }

    pub fn apply_stats_json(&self, stats: &serde_json::Value) -> usize {
        self.bindings.apply_json(stats, &self.sink)
    }

    /// Viewport change; parameters and pools carry over untouched.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.viewport = (width, height);
        self.camera.set_viewport(width, height);
    }

    // ---------------- frame ----------------

    /// Advance the simulation by `dt_sec` and build a frame.
    ///
    /// Returns `None` (and changes nothing) unless the loop is running.
    pub fn tick(&mut self, dt_sec: f32) -> Option<Frame<'_>> {
        if self.state != LoopState::Running {
            return None;
        }
        let dt = if dt_sec.is_finite() { dt_sec.max(0.0) } else { 0.0 };

        self.apply_inbox();
        if dt > 0.0 {
            let speed = interp::mean_value(self.store.get(ParamId::Speed), dt).max(0.0);
            let distance = speed * TRAVEL_UNITS_PER_SEC * dt;
            self.store.tick(dt);
            if self.intent.update(dt, &self.store) {
                self.events.push(EngineEvent::IntentChanged(self.intent.state()));
            }
            let boost = self.intent.boost_fraction(&self.store);
            self.camera.update(dt, distance, self.store.read(ParamId::Fov), boost);

            let ctx = SpawnContext {
                palette: &self.config.palette,
                road: &self.config.road,
            };
            let density = self.store.read(ParamId::Density);
            self.segments.set_density(density, &ctx);
            self.streaks.set_density(density, &ctx);
            self.segments.advance(distance, &ctx);
            self.streaks.advance(distance, &ctx);
            self.time_sec += dt;
        }
        self.write_uniforms();
        self.pack_instances();
        self.frame_index += 1;
        Some(Frame {
            index: self.frame_index,
            uniforms: &self.uniforms,
            instances: &self.instances,
        })
    }

    fn apply_inbox(&mut self) {
        for cmd in self.sink.drain() {
            match cmd {
                Command::SetTarget(id, v) => {
                    self.store.set_target_id(id, v);
                }
                Command::Input(InputEvent::PressStart) => {
                    let writes = self.intent.press(&self.store);
                    self.apply_writes(writes);
                }
                Command::Input(InputEvent::PressEnd) => {
                    let writes = self.intent.release();
                    self.apply_writes(writes);
                }
                Command::Input(InputEvent::ToggleUi) => {
                    self.events.push(EngineEvent::UiToggled);
                }
            }
        }
    }

    fn apply_writes(&mut self, writes: TargetWrites) {
        if writes.is_empty() {
            return;
        }
        for (id, v) in writes {
            self.store.set_target_id(id, v);
        }
        self.events.push(EngineEvent::IntentChanged(self.intent.state()));
    }

    fn write_uniforms(&mut self) {
        let cam = self.camera.camera(
            self.config.length,
            self.config.distortion_kind,
            self.store.read(ParamId::Distortion),
            self.time_sec,
        );
        let intensity = self.store.read(ParamId::ColorIntensity);
        let p = &self.config.palette;
        self.uniforms = FrameUniforms {
            view_proj: cam.view_proj().to_cols_array_2d(),
            resolution: [self.viewport.0 as f32, self.viewport.1 as f32],
            time: self.time_sec,
            speed: self.store.read(ParamId::Speed),
            distortion: self.store.read(ParamId::Distortion),
            distortion_kind: self.config.distortion_kind.code(),
            color_intensity: intensity,
            range: self.config.length,
            background: p.background.to_rgba(1.0),
            road: p.road.to_rgba(1.0),
            island: p.island.to_rgba(1.0),
            shoulder: p.shoulder_lines.to_rgba(1.0),
            travel: (self.camera.travel % 10_000.0) as f32,
            bloom_strength: BLOOM_STRENGTH * intensity,
            bloom_threshold: BLOOM_THRESHOLD,
            lateral: self.camera.lateral,
        };
    }

    fn pack_instances(&mut self) {
        let range = self.config.length;
        self.instances.truncate(self.static_count);
        self.instances.extend(self.segments.active().map(|s| InstanceData::segment(s, range)));
        self.instances.extend(self.streaks.active().map(|s| InstanceData::streak(s, range)));
    }

    // ---------------- inspection ----------------

    pub fn take_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &ParameterStore {
        &self.store
    }

    pub fn read(&self, id: ParamId) -> f32 {
        self.store.read(id)
    }

    pub fn intent(&self) -> Intent {
        self.intent.state()
    }

    pub fn segments(&self) -> &Pool<Segment> {
        &self.segments
    }

    pub fn streaks(&self) -> &Pool<Streak> {
        &self.streaks
    }

    pub fn camera(&self) -> &CameraState {
        &self.camera
    }

    pub fn time(&self) -> f32 {
        self.time_sec
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    pub fn uniforms(&self) -> &FrameUniforms {
        &self.uniforms
    }

    /// Instances of the last built frame (static road quads first).
    pub fn instances(&self) -> &[InstanceData] {
        &self.instances
    }

    pub fn static_count(&self) -> usize {
        self.static_count
    }
}
