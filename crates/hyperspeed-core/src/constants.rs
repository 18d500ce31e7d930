// Tuning constants shared by the engine and both front-ends.

// Smoothing: a rate of SETTLE_FACTOR / ramp_sec reaches ~95% of a step in `ramp_sec`
pub const SETTLE_FACTOR: f32 = 3.0;

// Rates (per second) for parameters without a configured ramp
pub const DENSITY_RATE: f32 = 1.5;
pub const DISTORTION_RATE: f32 = 2.0;
pub const INTENSITY_RATE: f32 = 2.5;

// Largest elapsed time a single tick will simulate (seconds)
pub const MAX_FRAME_DT: f32 = 0.25;

// Scene layout
pub const CAMERA_HEIGHT: f32 = 8.0; // above the road plane
pub const CAMERA_BACK: f32 = 0.0; // camera sits at the near boundary
pub const LOOK_AHEAD: f32 = 0.35; // fraction of the range the camera aims at
pub const Z_NEAR: f32 = 0.1;
pub const Z_FAR_MARGIN: f32 = 50.0; // added to the travel range for the far plane

// Light streak shape
pub const STREAK_LENGTH_MIN: f32 = 12.0;
pub const STREAK_LENGTH_MAX: f32 = 60.0;
pub const STREAK_WIDTH: f32 = 0.25;
pub const STREAK_HEIGHT: f32 = 1.2;
pub const ONCOMING_SPEED_MIN: f32 = 1.4; // left road, toward the camera
pub const ONCOMING_SPEED_MAX: f32 = 2.4;
pub const SAME_WAY_SPEED_MIN: f32 = 0.3; // right road, drifting back slowly
pub const SAME_WAY_SPEED_MAX: f32 = 0.7;
pub const MAX_WRAPS_PER_ADVANCE: u32 = 64; // beyond this a slot lands by modulo

// Road markings and side sticks
pub const DASH_LENGTH: f32 = 6.0;
pub const DASH_WIDTH: f32 = 0.15;
pub const STICK_WIDTH: f32 = 0.12;
pub const STICK_HEIGHT_MIN: f32 = 1.2;
pub const STICK_HEIGHT_MAX: f32 = 2.4;
pub const STICK_SHARE: f32 = 0.25; // fraction of respawned segments that become sticks

// Camera sway (critically damped-ish spring, mirrors the swirl follower)
pub const SWAY_OMEGA: f32 = 2.2;
pub const SWAY_DAMPING_RATIO: f32 = 0.8;
pub const SWAY_AMPLITUDE: f32 = 1.4; // lateral units at full boost
pub const SWAY_FREQUENCY: f32 = 0.45; // Hz
pub const SWAY_SUBSTEP: f32 = 1.0 / 240.0;
pub const MAX_SWAY_SUBSTEPS: u32 = 120; // backlog past this is dropped

// Distortion curve frequencies (radians per unit of progress)
pub const DISTORT_FREQ_PRIMARY: f32 = 3.0;
pub const DISTORT_FREQ_SECONDARY: f32 = 7.0;
pub const DISTORT_TIME_SCALE: f32 = 0.6;
pub const DISTORT_AMPLITUDE: f32 = 20.0; // world units at distortion = 1

// Post-processing (bloom strength scales with color intensity)
pub const BLOOM_STRENGTH: f32 = 0.9;
pub const BLOOM_THRESHOLD: f32 = 0.6;

// Hard ceiling for the speed parameter (base speed times press multiplier)
pub const SPEED_LIMIT: f32 = 200.0;

// World units travelled per second at speed 1.0
pub const TRAVEL_UNITS_PER_SEC: f32 = 150.0;
