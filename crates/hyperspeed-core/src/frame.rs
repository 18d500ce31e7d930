//! GPU-facing frame data and the renderer seam.
//!
//! Layouts here are mirrored by `scene.wgsl` and `post.wgsl`.

use crate::config::{EngineConfig, RoadLayout};
use crate::constants::*;
use crate::error::RenderError;
use crate::palette::Rgb;
use crate::pool::{Segment, SegmentKind, Streak};

/// Shape selector stored in `InstanceData::shape[2]`.
pub mod kind {
    pub const STREAK: f32 = 0.0;
    pub const DASH: f32 = 1.0;
    pub const STICK: f32 = 2.0;
    pub const ROAD: f32 = 3.0;
    pub const ISLAND: f32 = 4.0;
    pub const SHOULDER: f32 = 5.0;
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub resolution: [f32; 2],
    pub time: f32,
    pub speed: f32,
    pub distortion: f32,
    pub distortion_kind: f32,
    pub color_intensity: f32,
    pub range: f32,
    pub background: [f32; 4],
    pub road: [f32; 4],
    pub island: [f32; 4],
    pub shoulder: [f32; 4],
    pub travel: f32,
    pub bloom_strength: f32,
    pub bloom_threshold: f32,
    pub lateral: f32,
}

/// One instanced quad.
///
/// - `pos_len`: x, y, world z of the near end, length along -Z
/// - `color`: rgb, alpha
/// - `shape`: width, height, kind, progress (0 at camera, 1 at the far boundary)
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceData {
    pub pos_len: [f32; 4],
    pub color: [f32; 4],
    pub shape: [f32; 4],
}

impl InstanceData {
    pub fn streak(s: &Streak, range: f32) -> Self {
        Self {
            pos_len: [s.x, s.y, -s.z, s.length],
            color: s.color.to_rgba(1.0),
            shape: [STREAK_WIDTH, 0.0, kind::STREAK, s.z / range],
        }
    }

    pub fn segment(s: &Segment, range: f32) -> Self {
        let (width, length, k) = match s.kind {
            SegmentKind::Dash => (DASH_WIDTH, DASH_LENGTH, kind::DASH),
            SegmentKind::Stick => (STICK_WIDTH, 0.0, kind::STICK),
        };
        Self {
            pos_len: [s.x, 0.0, -s.z, length],
            color: s.color.to_rgba(1.0),
            shape: [width, s.height, k, s.z / range],
        }
    }

    fn surface(x: f32, width: f32, range: f32, color: Rgb, k: f32) -> Self {
        Self {
            pos_len: [x, 0.0, 0.0, range],
            color: color.to_rgba(1.0),
            shape: [width, 0.0, k, 0.0],
        }
    }
}

/// Instances a frame can carry for `config`: static geometry plus both pools.
pub fn instance_capacity(config: &EngineConfig) -> usize {
    static_instances(config).len() + config.segment_count + config.streak_count
}

/// Road, island and shoulder quads; built once per engine.
pub fn static_instances(config: &EngineConfig) -> Vec<InstanceData> {
    let RoadLayout {
        road_width,
        island_width,
        ..
    } = config.road;
    let range = config.length;
    let p = &config.palette;
    let half = island_width * 0.5;
    let road_center = half + road_width * 0.5;
    let mut out = vec![
        InstanceData::surface(-road_center, road_width, range, p.road, kind::ROAD),
        InstanceData::surface(road_center, road_width, range, p.road, kind::ROAD),
    ];
    if island_width > 0.0 {
        out.push(InstanceData::surface(0.0, island_width, range, p.island, kind::ISLAND));
    }
    for x in [-(half + road_width), -half, half, half + road_width] {
        out.push(InstanceData::surface(
            x,
            DASH_WIDTH * 2.0,
            range,
            p.shoulder_lines,
            kind::SHOULDER,
        ));
    }
    out
}

/// Everything a renderer needs for one submission.
#[derive(Clone, Copy, Debug)]
pub struct Frame<'a> {
    pub index: u64,
    pub uniforms: &'a FrameUniforms,
    pub instances: &'a [InstanceData],
}

/// Seam between the simulation and a rendering backend.
pub trait FrameRenderer {
    /// Recompute viewport-sized resources; simulation state is untouched.
    fn resize(&mut self, width: u32, height: u32);
    fn render(&mut self, frame: &Frame<'_>) -> Result<(), RenderError>;
}
