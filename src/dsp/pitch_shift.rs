//! Constant-tempo pitch shifter
//!
//! Two read taps sweep across a delay line at a speed set by the pitch
//! ratio. Each tap fades in and out with a triangular window, and the taps
//! are half a window apart so their gains always sum to one.

use super::StereoProcessor;
use crate::error::{PinchError, Result};

/// Sweep window length in milliseconds
pub const DEFAULT_WINDOW_MS: f32 = 50.0;

/// Pitch ratio bounds (two octaves either way)
const MIN_RATIO: f32 = 0.25;
const MAX_RATIO: f32 = 4.0;

#[derive(Debug, Clone)]
struct DelayLine {
    buffer: Vec<f32>,
    write_pos: usize,
    mask: usize,
}

impl DelayLine {
    fn new(max_delay: usize) -> Self {
        let size = (max_delay + 2).next_power_of_two();
        Self {
            buffer: vec![0.0; size],
            write_pos: 0,
            mask: size - 1,
        }
    }

    #[inline]
    fn write(&mut self, sample: f32) {
        self.buffer[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) & self.mask;
    }

    /// Linear-interpolated read `delay` samples behind the last write
    #[inline]
    fn read(&self, delay: f32) -> f32 {
        let whole = delay.floor() as usize;
        let frac = delay - whole as f32;
        let size = self.mask + 1;
        let newest = (self.write_pos + size - 1) & self.mask;
        let a = self.buffer[(newest + size - whole) & self.mask];
        let b = self.buffer[(newest + size - whole - 1) & self.mask];
        a + (b - a) * frac
    }

    fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }
}

/// Stereo delay-line pitch shifter
#[derive(Debug, Clone)]
pub struct PitchShifter {
    left: DelayLine,
    right: DelayLine,
    window: f32,
    /// Tap phase in 0..1; the second tap runs half a window behind
    phase: f32,
    ratio: f32,
}

impl PitchShifter {
    pub fn new(sample_rate: u32) -> Result<Self> {
        Self::with_window(sample_rate, DEFAULT_WINDOW_MS)
    }

    pub fn with_window(sample_rate: u32, window_ms: f32) -> Result<Self> {
        let window = (sample_rate as f32 * window_ms / 1000.0).floor();
        if !(window >= 4.0) {
            return Err(PinchError::InvalidConfig {
                reason: format!(
                    "pitch window of {} ms at {} Hz is too short",
                    window_ms, sample_rate
                ),
            });
        }
        let max_delay = window as usize + 1;
        Ok(Self {
            left: DelayLine::new(max_delay),
            right: DelayLine::new(max_delay),
            window,
            phase: 0.0,
            ratio: 1.0,
        })
    }

    /// Set the frequency ratio (2.0 = one octave up)
    pub fn set_ratio(&mut self, ratio: f32) {
        self.ratio = if ratio.is_finite() {
            ratio.clamp(MIN_RATIO, MAX_RATIO)
        } else {
            1.0
        };
    }

    pub fn ratio(&self) -> f32 {
        self.ratio
    }

    /// Window length in samples
    pub fn window_samples(&self) -> usize {
        self.window as usize
    }
}

#[inline]
fn triangle(phase: f32) -> f32 {
    1.0 - (2.0 * phase - 1.0).abs()
}

impl StereoProcessor for PitchShifter {
    fn process(&mut self, left: &mut [f32], right: &mut [f32]) {
        // Delay shrinks when pitching up, grows when pitching down
        let step = (1.0 - self.ratio) / self.window;

        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            self.left.write(*l);
            self.right.write(*r);

            let phase_a = self.phase;
            let phase_b = (self.phase + 0.5).fract();
            let (gain_a, gain_b) = (triangle(phase_a), triangle(phase_b));
            let (delay_a, delay_b) = (phase_a * self.window, phase_b * self.window);

            *l = self.left.read(delay_a) * gain_a + self.left.read(delay_b) * gain_b;
            *r = self.right.read(delay_a) * gain_a + self.right.read(delay_b) * gain_b;

            self.phase = (self.phase + step).rem_euclid(1.0);
        }
    }

    fn reset(&mut self) {
        self.left.clear();
        self.right.clear();
        self.phase = 0.0;
    }
}
