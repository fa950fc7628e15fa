//! Per-channel exponential moving average

use super::mode::Channel;

/// One EMA value per control channel
#[derive(Debug, Clone, PartialEq)]
pub struct SmoothingState {
    alpha: f32,
    values: [f32; 3],
}

impl SmoothingState {
    /// Create with explicit starting values for pitch, volume and reverb mix
    pub fn new(alpha: f32, pitch: f32, volume: f32, reverb_mix: f32) -> Self {
        Self {
            alpha: alpha.clamp(f32::EPSILON, 1.0 - f32::EPSILON),
            values: [pitch, volume, reverb_mix],
        }
    }

    /// Move one channel towards `raw`; the others are left untouched
    pub fn update(&mut self, channel: Channel, raw: f32) -> f32 {
        let slot = &mut self.values[channel.index()];
        *slot = (1.0 - self.alpha) * *slot + self.alpha * raw;
        *slot
    }

    #[inline]
    pub fn value(&self, channel: Channel) -> f32 {
        self.values[channel.index()]
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }
}
