//! Named bend curves applied along the tunnel.
//!
//! `scene.wgsl` carries the same formulas; keep the two in step.

use crate::constants::*;
use glam::Vec2;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DistortionKind {
    None,
    #[default]
    Turbulent,
    Mountain,
    Xy,
    LongRace,
    Deep,
}

impl DistortionKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "none" | "straight" => Some(DistortionKind::None),
            "turbulent" | "turbulentdistortion" => Some(DistortionKind::Turbulent),
            "mountain" | "mountaindistortion" => Some(DistortionKind::Mountain),
            "xy" | "xydistortion" => Some(DistortionKind::Xy),
            "long_race" | "longrace" | "longracedistortion" => Some(DistortionKind::LongRace),
            "deep" | "deepdistortion" => Some(DistortionKind::Deep),
            _ => None,
        }
    }

    /// Shader-side selector.
    pub fn code(self) -> f32 {
        match self {
            DistortionKind::None => 0.0,
            DistortionKind::Turbulent => 1.0,
            DistortionKind::Mountain => 2.0,
            DistortionKind::Xy => 3.0,
            DistortionKind::LongRace => 4.0,
            DistortionKind::Deep => 5.0,
        }
    }
}

/// Lateral (x) and vertical (y) offset at `progress` (0 = camera, 1 = far
/// boundary) and time `t_sec`, scaled by `amount` in 0..=1.
///
/// The offset grows with progress, so geometry at the camera stays put.
pub fn offset(kind: DistortionKind, progress: f32, t_sec: f32, amount: f32) -> Vec2 {
    let p = progress.clamp(0.0, 1.0);
    let t = t_sec * DISTORT_TIME_SCALE;
    let a = p * p * amount.clamp(0.0, 1.0) * DISTORT_AMPLITUDE;
    let f1 = DISTORT_FREQ_PRIMARY;
    let f2 = DISTORT_FREQ_SECONDARY;
    let shape = match kind {
        DistortionKind::None => Vec2::ZERO,
        DistortionKind::Turbulent => Vec2::new(
            (p * f1 + t).sin() * 0.7 + (p * f2 + t * 1.3).cos() * 0.3,
            (p * f1 * 0.8 + t * 1.1).cos() * 0.4,
        ),
        DistortionKind::Mountain => Vec2::new(
            (p * f1 * 0.5 + t).sin() * 0.3,
            (p * f1 + t * 0.7).sin() * 0.6 + 0.4,
        ),
        DistortionKind::Xy => Vec2::new((p * f1 + t).sin(), (p * f1 * 0.66 + t).cos() * 0.6),
        DistortionKind::LongRace => Vec2::new((p * f1 * 0.5 + t).sin(), 0.0),
        DistortionKind::Deep => Vec2::new(
            (p * f2 + t).sin() * 0.15,
            -(p * f1 * 0.5 + t * 0.5).sin().abs() * 0.9,
        ),
    };
    shape * a
}
