//! Time-based smoothing of parameter values.
//!
//! Each step moves `current` toward `target` by `alpha = 1 - exp(-rate * dt)`.
//! Composing two steps of `dt` gives exactly one step of `2 * dt` for a fixed
//! target, so the trajectory does not depend on the frame rate. `alpha` never
//! exceeds 1, so a value cannot overshoot its target.

use crate::params::{Param, ParameterStore};

/// Fraction of the remaining distance covered in `dt_sec` at `rate` per second.
#[inline]
pub fn step_alpha(rate: f32, dt_sec: f32) -> f32 {
    if dt_sec <= 0.0 || rate <= 0.0 {
        return 0.0;
    }
    (1.0 - (-rate * dt_sec).exp()).clamp(0.0, 1.0)
}

/// Advance one parameter; values within `epsilon` of the target snap onto it.
#[inline]
pub fn advance_param(p: &mut Param, dt_sec: f32, epsilon: f32) {
    if dt_sec <= 0.0 || p.current == p.target {
        return;
    }
    let alpha = step_alpha(p.rate(), dt_sec);
    p.current += (p.target - p.current) * alpha;
    if (p.target - p.current).abs() <= epsilon {
        p.current = p.target;
    }
}

/// Average of `p` over the next `dt_sec` along the same exponential curve
/// [`advance_param`] steps on. The epsilon snap is ignored; it shifts the
/// value by at most epsilon.
pub fn mean_value(p: &Param, dt_sec: f32) -> f32 {
    let rate = p.rate();
    if dt_sec <= 0.0 || rate <= 0.0 || p.current == p.target {
        return p.current;
    }
    let gap = p.current - p.target;
    p.target + gap * step_alpha(rate, dt_sec) / (rate * dt_sec)
}

/// Advance every entry of the store. A zero or negative `dt_sec` is a no-op.
pub fn advance(store: &mut ParameterStore, dt_sec: f32) {
    if !(dt_sec > 0.0) {
        return;
    }
    let epsilon = store.epsilon();
    for p in store.entries_mut() {
        advance_param(p, dt_sec, epsilon);
    }
}
