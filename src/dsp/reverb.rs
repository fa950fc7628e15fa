//! Fully-wet Freeverb stage
//!
//! Implements the Freeverb algorithm:
//! - 8 parallel comb filters for early reflections
//! - 4 series allpass filters for diffusion
//! - Right channel delays offset by a fixed stereo spread
//!
//! The stage outputs only the reverberant signal. Dry/wet balance is the
//! graph's job, so the stage itself has no mix parameters.

use super::StereoProcessor;
use crate::error::{PinchError, Result};

// ============================================================================
// Freeverb Constants
// ============================================================================

/// Reference sample rate for Freeverb delays
const REFERENCE_SAMPLE_RATE: f64 = 44100.0;

/// Comb filter delays at 44100 Hz (8 filters)
const COMB_DELAYS: [usize; 8] = [1116, 1188, 1277, 1356, 1422, 1491, 1557, 1617];

/// Allpass filter delays at 44100 Hz (4 filters)
const ALLPASS_DELAYS: [usize; 4] = [556, 441, 341, 225];

/// Stereo spread offset in samples (for right channel)
const STEREO_SPREAD: usize = 23;

/// Fixed gain for allpass filters
const ALLPASS_GAIN: f32 = 0.5;

/// Scale factor for room size parameter to feedback
const ROOM_SCALE: f32 = 0.28;

/// Offset for room size parameter to feedback
const ROOM_OFFSET: f32 = 0.7;

/// Scale factor for damping parameter
const DAMP_SCALE: f32 = 0.4;

/// Input attenuation so eight summed combs stay near unity
const INPUT_GAIN: f32 = 0.015;

// ============================================================================
// Filter Components
// ============================================================================

/// Low-pass feedback comb filter
#[derive(Debug, Clone)]
struct CombFilter {
    buffer: Vec<f32>,
    write_pos: usize,
    mask: usize,
    delay: usize,
    filter_state: f32,
    feedback: f32,
    damp1: f32,
    damp2: f32,
}

impl CombFilter {
    fn new(delay: usize) -> Self {
        // Power of two so wrapping is a mask
        let size = (delay + 1).next_power_of_two();
        Self {
            buffer: vec![0.0; size],
            write_pos: 0,
            mask: size - 1,
            delay,
            filter_state: 0.0,
            feedback: 0.5,
            damp1: 0.5,
            damp2: 0.5,
        }
    }

    fn set_coefficients(&mut self, feedback: f32, damping: f32) {
        self.feedback = feedback;
        self.damp1 = damping;
        self.damp2 = 1.0 - damping;
    }

    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let read_pos = (self.write_pos + self.mask + 1 - self.delay) & self.mask;
        let output = self.buffer[read_pos];

        // One-pole low-pass in the feedback path
        self.filter_state = output * self.damp2 + self.filter_state * self.damp1;
        self.buffer[self.write_pos] = input + self.filter_state * self.feedback;
        self.write_pos = (self.write_pos + 1) & self.mask;

        output
    }

    fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.filter_state = 0.0;
        self.write_pos = 0;
    }
}

/// Schroeder allpass used for diffusion
#[derive(Debug, Clone)]
struct AllpassFilter {
    buffer: Vec<f32>,
    write_pos: usize,
    mask: usize,
    delay: usize,
}

impl AllpassFilter {
    fn new(delay: usize) -> Self {
        let size = (delay + 1).next_power_of_two();
        Self {
            buffer: vec![0.0; size],
            write_pos: 0,
            mask: size - 1,
            delay,
        }
    }

    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let read_pos = (self.write_pos + self.mask + 1 - self.delay) & self.mask;
        let delayed = self.buffer[read_pos];
        let output = delayed - input;
        self.buffer[self.write_pos] = input + delayed * ALLPASS_GAIN;
        self.write_pos = (self.write_pos + 1) & self.mask;
        output
    }

    fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }
}

/// One channel's comb bank and allpass chain
#[derive(Debug, Clone)]
struct Tank {
    combs: [CombFilter; 8],
    allpasses: [AllpassFilter; 4],
}

impl Tank {
    fn new(scale: f64, spread: usize) -> Self {
        let scaled = |d: usize| (((d + spread) as f64 * scale) as usize).max(1);
        Self {
            combs: std::array::from_fn(|i| CombFilter::new(scaled(COMB_DELAYS[i]))),
            allpasses: std::array::from_fn(|i| AllpassFilter::new(scaled(ALLPASS_DELAYS[i]))),
        }
    }

    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let mut sum = 0.0;
        for comb in &mut self.combs {
            sum += comb.process(input);
        }
        let mut output = sum;
        for allpass in &mut self.allpasses {
            output = allpass.process(output);
        }
        output
    }

    fn clear(&mut self) {
        self.combs.iter_mut().for_each(CombFilter::clear);
        self.allpasses.iter_mut().for_each(AllpassFilter::clear);
    }
}

// ============================================================================
// Reverb Stage
// ============================================================================

/// Stereo Freeverb producing only the reverberant signal
///
/// All delay lines are sized in [`Reverb::new`]; `process` never allocates.
#[derive(Debug, Clone)]
pub struct Reverb {
    left: Tank,
    right: Tank,
    room_size: f32,
    damping: f32,
}

impl Reverb {
    /// Create a reverb for `sample_rate`
    ///
    /// # Arguments
    /// * `room_size` - 0 (tiny) to 1 (huge hall)
    /// * `damping` - 0 (bright) to 1 (dark)
    pub fn new(sample_rate: u32, room_size: f32, damping: f32) -> Result<Self> {
        if sample_rate == 0 {
            return Err(PinchError::InvalidConfig {
                reason: "reverb sample rate must be positive".to_string(),
            });
        }
        let scale = sample_rate as f64 / REFERENCE_SAMPLE_RATE;
        let mut reverb = Self {
            left: Tank::new(scale, 0),
            right: Tank::new(scale, STEREO_SPREAD),
            room_size: 0.0,
            damping: 0.0,
        };
        reverb.set_room(room_size, damping);
        Ok(reverb)
    }

    /// Update room size and damping, both clamped to 0..=1
    pub fn set_room(&mut self, room_size: f32, damping: f32) {
        self.room_size = room_size.clamp(0.0, 1.0);
        self.damping = damping.clamp(0.0, 1.0);

        let feedback = self.room_size * ROOM_SCALE + ROOM_OFFSET;
        let damp = self.damping * DAMP_SCALE;
        for comb in self.left.combs.iter_mut().chain(self.right.combs.iter_mut()) {
            comb.set_coefficients(feedback, damp);
        }
    }

    pub fn room_size(&self) -> f32 {
        self.room_size
    }

    pub fn damping(&self) -> f32 {
        self.damping
    }
}

impl StereoProcessor for Reverb {
    fn process(&mut self, left: &mut [f32], right: &mut [f32]) {
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            let input = (*l + *r) * INPUT_GAIN;
            *l = self.left.process(input);
            *r = self.right.process(input);
        }
    }

    fn reset(&mut self) {
        self.left.clear();
        self.right.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn energy(samples: &[f32]) -> f32 {
        samples.iter().map(|s| s * s).sum()
    }

    fn impulse_response(reverb: &mut Reverb, len: usize) -> (Vec<f32>, Vec<f32>) {
        let mut left = vec![0.0; len];
        let mut right = vec![0.0; len];
        left[0] = 1.0;
        right[0] = 1.0;
        reverb.process(&mut left, &mut right);
        (left, right)
    }

    #[test]
    fn test_silence_in_silence_out() {
        let mut reverb = Reverb::new(48000, 0.5, 0.5).unwrap();
        let mut left = vec![0.0; 1024];
        let mut right = vec![0.0; 1024];
        reverb.process(&mut left, &mut right);
        assert!(left.iter().chain(right.iter()).all(|&s| s == 0.0));
    }

    #[test]
    fn test_impulse_produces_tail_not_direct_sound() {
        let mut reverb = Reverb::new(48000, 0.5, 0.5).unwrap();
        let (left, right) = impulse_response(&mut reverb, 48000);

        // Fully wet: the shortest comb is ~1200 samples at 48k, so the
        // first few hundred samples carry only the allpass leak
        assert!(left[..200].iter().all(|s| s.abs() < 0.05));
        assert!(energy(&left[1000..]) > 0.0);
        assert!(left.iter().chain(right.iter()).all(|s| s.is_finite()));
        assert_ne!(left, right);
    }

    #[test]
    fn test_larger_room_rings_longer() {
        let mut small = Reverb::new(48000, 0.1, 0.5).unwrap();
        let mut large = Reverb::new(48000, 0.9, 0.5).unwrap();
        let (small_l, _) = impulse_response(&mut small, 96000);
        let (large_l, _) = impulse_response(&mut large, 96000);
        assert!(energy(&large_l[48000..]) > energy(&small_l[48000..]));
    }

    #[test]
    fn test_reset_clears_tail() {
        let mut reverb = Reverb::new(44100, 0.8, 0.2).unwrap();
        impulse_response(&mut reverb, 4096);
        reverb.reset();
        let mut left = vec![0.0; 4096];
        let mut right = vec![0.0; 4096];
        reverb.process(&mut left, &mut right);
        assert_eq!(energy(&left) + energy(&right), 0.0);
    }

    #[test]
    fn test_parameters_are_clamped() {
        let mut reverb = Reverb::new(48000, 2.0, -1.0).unwrap();
        assert_eq!(reverb.room_size(), 1.0);
        assert_eq!(reverb.damping(), 0.0);
        reverb.set_room(0.3, 0.7);
        assert_eq!(reverb.room_size(), 0.3);
    }

    #[test]
    fn test_zero_sample_rate_rejected() {
        assert!(Reverb::new(0, 0.5, 0.5).is_err());
    }
}
