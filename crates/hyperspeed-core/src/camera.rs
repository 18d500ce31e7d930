//! Camera state mutated only by the frame loop.

use crate::constants::*;
use crate::distortion::{self, DistortionKind};
use glam::{Mat4, Vec3};

/// Simple right-handed camera description with perspective projection.
#[derive(Clone, Debug)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub aspect: f32,
    pub fovy_radians: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Camera {
    /// Compute the clip-space projection matrix.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy_radians, self.aspect, self.znear, self.zfar)
    }
    /// Compute the view matrix that transforms world to view space.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

/// Position along the travel axis, lateral sway and lens state.
///
/// The world scrolls past a camera that stays at the near boundary; `travel`
/// only accumulates for texture scrolling and diagnostics.
#[derive(Clone, Debug)]
pub struct CameraState {
    pub travel: f64,
    pub lateral: f32,
    pub lateral_vel: f32,
    pub fov_degrees: f32,
    pub aspect: f32,
    sway_phase: f32,
    sway_accum: f32,
    boost: f32,
}

impl CameraState {
    pub fn new(fov_degrees: f32) -> Self {
        Self {
            travel: 0.0,
            lateral: 0.0,
            lateral_vel: 0.0,
            fov_degrees,
            aspect: 16.0 / 9.0,
            sway_phase: 0.0,
            sway_accum: 0.0,
            boost: 0.0,
        }
    }

    /// Viewport change; nothing else about the simulation is touched.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.aspect = width as f32 / height as f32;
    }

    /// Advance travel and pull the lateral offset toward a sway target that
    /// grows with `boost` (0..=1).
    ///
    /// The spring runs on fixed substeps; boost is ramped linearly from the
    /// previous call's value across the tick.
    pub fn update(&mut self, dt_sec: f32, distance: f32, fov_degrees: f32, boost: f32) {
        self.fov_degrees = fov_degrees;
        if dt_sec <= 0.0 {
            return;
        }
        self.travel += distance as f64;
        let from = self.boost;
        let to = boost.clamp(0.0, 1.0);
        let k = SWAY_OMEGA * SWAY_OMEGA;
        let c = 2.0 * SWAY_OMEGA * SWAY_DAMPING_RATIO;
        self.sway_accum += dt_sec;
        let mut steps = 0;
        while self.sway_accum >= SWAY_SUBSTEP {
            if steps == MAX_SWAY_SUBSTEPS {
                self.sway_accum = 0.0;
                break;
            }
            self.sway_accum -= SWAY_SUBSTEP;
            steps += 1;
            let t = ((dt_sec - self.sway_accum) / dt_sec).clamp(0.0, 1.0);
            let b = from + (to - from) * t;
            self.sway_phase = (self.sway_phase + SWAY_SUBSTEP * SWAY_FREQUENCY).fract();
            let target = SWAY_AMPLITUDE * b * (self.sway_phase * std::f32::consts::TAU).sin();
            let accel = k * (target - self.lateral) - c * self.lateral_vel;
            self.lateral_vel += accel * SWAY_SUBSTEP;
            self.lateral += self.lateral_vel * SWAY_SUBSTEP;
        }
        self.boost = to;
    }

    /// Camera for the current frame, aimed at the distorted point ahead.
    pub fn camera(
        &self,
        range: f32,
        kind: DistortionKind,
        amount: f32,
        time_sec: f32,
    ) -> Camera {
        let ahead = distortion::offset(kind, LOOK_AHEAD, time_sec, amount);
        let eye = Vec3::new(self.lateral, CAMERA_HEIGHT, CAMERA_BACK);
        let target = Vec3::new(
            self.lateral * 0.5 + ahead.x,
            CAMERA_HEIGHT * 0.5 + ahead.y,
            -range * LOOK_AHEAD,
        );
        Camera {
            eye,
            target,
            up: Vec3::Y,
            aspect: self.aspect,
            fovy_radians: self.fov_degrees.clamp(10.0, 170.0).to_radians(),
            znear: Z_NEAR,
            zfar: range + Z_FAR_MARGIN,
        }
    }
}
