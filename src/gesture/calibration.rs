//! Pinch-distance calibration
//!
//! During the calibration window the observed pinch range only ever
//! widens. Afterwards it is frozen (or keeps widening under the adaptive
//! policy). Normalization always divides by at least `range_floor`, so a
//! degenerate calibration can never blow up.

use std::time::Duration;

use log::debug;

use crate::config::CalibrationPolicy;

/// Learned pinch-distance bounds
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationState {
    /// Smallest and largest observed distance, once anything was observed
    bounds: Option<(f32, f32)>,
    start_time: Duration,
    window: Duration,
    range_floor: f32,
    policy: CalibrationPolicy,
    frozen: bool,
}

impl CalibrationState {
    pub fn new(
        start_time: Duration,
        window: Duration,
        range_floor: f32,
        policy: CalibrationPolicy,
    ) -> Self {
        Self {
            bounds: None,
            start_time,
            window,
            range_floor,
            policy,
            frozen: false,
        }
    }

    /// Whether `now` still falls inside the calibration window
    pub fn in_window(&self, now: Duration) -> bool {
        now.saturating_sub(self.start_time) < self.window
    }

    /// Feed one observed distance
    ///
    /// Returns true when the bounds changed.
    pub fn observe(&mut self, dist: f32, now: Duration) -> bool {
        if !dist.is_finite() {
            return false;
        }

        let learning = self.in_window(now) || self.policy == CalibrationPolicy::Adaptive;
        if !learning && !self.frozen {
            self.frozen = true;
            debug!(
                "Calibration frozen: d_min={:.4} d_max={:.4}",
                self.d_min(),
                self.d_max()
            );
        }

        match self.bounds {
            // The first hand ever seen seeds the bounds even after the window
            None => {
                self.bounds = Some((dist, dist));
                true
            }
            Some((lo, hi)) if learning => {
                let updated = (lo.min(dist), hi.max(dist));
                self.bounds = Some(updated);
                updated != (lo, hi)
            }
            Some(_) => false,
        }
    }

    /// Map a distance into [0, 1] using the learned range
    pub fn normalize(&self, dist: f32) -> f32 {
        let (lo, _) = self.bounds.unwrap_or((dist, dist));
        let n = (dist - lo) / self.range();
        if n.is_nan() {
            return 0.0;
        }
        n.clamp(0.0, 1.0)
    }

    /// Width of the learned range, never below the floor
    pub fn range(&self) -> f32 {
        let (lo, hi) = self.bounds.unwrap_or((0.0, 0.0));
        (hi - lo).max(self.range_floor)
    }

    pub fn d_min(&self) -> f32 {
        self.bounds.map(|(lo, _)| lo).unwrap_or(0.0)
    }

    /// Upper bound; never below `d_min`
    pub fn d_max(&self) -> f32 {
        self.bounds.map(|(lo, hi)| hi.max(lo)).unwrap_or(0.0)
    }

    pub fn is_calibrated(&self) -> bool {
        self.bounds.is_some()
    }

    pub fn start_time(&self) -> Duration {
        self.start_time
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}
