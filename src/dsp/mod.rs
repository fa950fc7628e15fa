//! DSP Stages
//!
//! Block processors used inside the audio graph. Stages run on the render
//! path, so they size every buffer at construction and never allocate in
//! `process`.

mod pitch_shift;
mod reverb;

pub use pitch_shift::{PitchShifter, DEFAULT_WINDOW_MS};
pub use reverb::Reverb;

/// In-place processor over a planar stereo block
pub trait StereoProcessor: Send {
    /// Process one block; both slices have the same length
    fn process(&mut self, left: &mut [f32], right: &mut [f32]);

    /// Clear delay lines and filter history
    fn reset(&mut self);
}

/// Multiply a stereo block by a scalar gain
#[inline]
pub fn apply_gain(left: &mut [f32], right: &mut [f32], gain: f32) {
    if (gain - 1.0).abs() < f32::EPSILON {
        return;
    }
    for sample in left.iter_mut().chain(right.iter_mut()) {
        *sample *= gain;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_gain() {
        let mut left = vec![1.0, -0.5];
        let mut right = vec![0.25, 0.0];
        apply_gain(&mut left, &mut right, 0.5);
        assert_eq!(left, vec![0.5, -0.25]);
        assert_eq!(right, vec![0.125, 0.0]);
    }

    #[test]
    fn test_unity_gain_leaves_block_untouched() {
        let mut left = vec![0.3];
        let mut right = vec![-0.3];
        apply_gain(&mut left, &mut right, 1.0);
        assert_eq!((left[0], right[0]), (0.3, -0.3));
    }
}
