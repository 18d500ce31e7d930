use crate::constants::MAX_FRAME_DT;
use instant::Instant;

/// Elapsed time between frame callbacks.
///
/// After [`FrameClock::reset`] (pause, resume, re-mount) the next delta is
/// zero, so time spent away never turns into a catch-up burst.
#[derive(Clone, Debug)]
pub struct FrameClock {
    last: Option<Instant>,
    max_dt: f32,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(MAX_FRAME_DT)
    }
}

impl FrameClock {
    pub fn new(max_dt: f32) -> Self {
        Self {
            last: None,
            max_dt: max_dt.max(0.0),
        }
    }

    /// Seconds since the previous call, clamped to `max_dt`.
    pub fn delta(&mut self, now: Instant) -> f32 {
        let dt = match self.last {
            Some(last) if now > last => (now - last).as_secs_f32(),
            _ => 0.0,
        };
        self.last = Some(now);
        dt.min(self.max_dt)
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}
