pub mod camera;
pub mod clock;
pub mod config;
pub mod constants;
pub mod distortion;
pub mod engine;
pub mod error;
pub mod frame;
pub mod intent;
pub mod interp;
pub mod lifecycle;
pub mod palette;
pub mod params;
pub mod pool;
pub mod sink;
pub mod telemetry;

pub use camera::{Camera, CameraState};
pub use clock::FrameClock;
pub use config::{ConfigIssue, EngineConfig, IssueKind, LoadReport, RoadLayout};
pub use distortion::DistortionKind;
pub use engine::{Engine, EngineEvent, LoopState};
pub use error::{EngineError, RenderError};
pub use frame::{instance_capacity, Frame, FrameRenderer, FrameUniforms, InstanceData};
pub use intent::{
    input_for_key, InputEvent, Intent, IntentMachine, POINTER_PRESS_EVENTS, TOUCH_PRESS_EVENTS,
};
pub use lifecycle::{ListenerGuard, Status, Visualization};
pub use palette::{Palette, PaletteRole, Rgb};
pub use params::{Param, ParamId, ParameterStore};
pub use pool::{Pool, Recycle, Segment, Streak};
pub use sink::ParamSink;
pub use telemetry::{StatBinding, TelemetryBindings};
