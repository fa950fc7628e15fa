//! Audio Buffer
//!
//! Decoded PCM held as non-interleaved 32-bit float channels. This is the
//! fixed format the decoder produces and the loop source plays.

use crate::error::{PinchError, Result};

/// Default output sample rate (48kHz)
pub const DEFAULT_SAMPLE_RATE: u32 = 48000;

/// Convert linear amplitude to decibels
///
/// Returns -f32::INFINITY for zero input.
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    if linear <= 0.0 {
        f32::NEG_INFINITY
    } else {
        20.0 * linear.log10()
    }
}

/// Audio channel configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChannelLayout {
    Mono,
    #[default]
    Stereo,
}

impl ChannelLayout {
    pub fn num_channels(&self) -> usize {
        match self {
            ChannelLayout::Mono => 1,
            ChannelLayout::Stereo => 2,
        }
    }

    pub fn from_count(count: usize) -> Option<Self> {
        match count {
            1 => Some(ChannelLayout::Mono),
            2 => Some(ChannelLayout::Stereo),
            _ => None,
        }
    }
}

/// Non-interleaved float audio
///
/// # Example
/// ```
/// use pinchwave::engine::buffer::{AudioBuffer, ChannelLayout};
///
/// let buffer = AudioBuffer::new(48000, ChannelLayout::Stereo, 48000);
/// assert_eq!(buffer.channels(), 2);
/// assert_eq!(buffer.duration_secs(), 1.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    /// Sample data: outer Vec is channels, inner Vec is samples
    pub samples: Vec<Vec<f32>>,
    /// Sample rate in Hz
    pub sample_rate: u32,
}

impl AudioBuffer {
    /// Create a silent buffer
    pub fn new(num_samples: usize, layout: ChannelLayout, sample_rate: u32) -> Self {
        Self {
            samples: vec![vec![0.0; num_samples]; layout.num_channels()],
            sample_rate,
        }
    }

    /// Wrap existing channel data; every channel must have the same length
    pub fn from_channels(samples: Vec<Vec<f32>>, sample_rate: u32) -> Result<Self> {
        if ChannelLayout::from_count(samples.len()).is_none() {
            return Err(PinchError::UnsupportedFormat {
                format: format!("{}-channel audio (only mono/stereo supported)", samples.len()),
            });
        }
        let len = samples[0].len();
        if samples.iter().any(|ch| ch.len() != len) {
            return Err(PinchError::Decode {
                reason: "channels have different lengths".to_string(),
                source: None,
            });
        }
        Ok(Self {
            samples,
            sample_rate,
        })
    }

    /// Create a buffer from interleaved data (L, R, L, R, ...)
    pub fn from_interleaved(interleaved: &[f32], layout: ChannelLayout, sample_rate: u32) -> Result<Self> {
        let num_channels = layout.num_channels();
        if interleaved.len() % num_channels != 0 {
            return Err(PinchError::Decode {
                reason: format!(
                    "Interleaved data length {} is not divisible by channel count {}",
                    interleaved.len(),
                    num_channels
                ),
                source: None,
            });
        }

        let frames = interleaved.len() / num_channels;
        let mut samples = vec![Vec::with_capacity(frames); num_channels];
        for frame in interleaved.chunks_exact(num_channels) {
            for (ch, &sample) in frame.iter().enumerate() {
                samples[ch].push(sample);
            }
        }
        Ok(Self {
            samples,
            sample_rate,
        })
    }

    /// Interleave into a new Vec (L, R, L, R, ...)
    pub fn to_interleaved(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.channels() * self.len());
        for i in 0..self.len() {
            for channel in &self.samples {
                out.push(channel[i]);
            }
        }
        out
    }

    #[inline]
    pub fn channels(&self) -> usize {
        self.samples.len()
    }

    /// Samples per channel
    #[inline]
    pub fn len(&self) -> usize {
        self.samples.first().map(|ch| ch.len()).unwrap_or(0)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn layout(&self) -> ChannelLayout {
        ChannelLayout::from_count(self.channels()).unwrap_or_default()
    }

    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.len() as f64 / self.sample_rate as f64
    }

    #[inline]
    pub fn channel(&self, index: usize) -> &[f32] {
        &self.samples[index]
    }

    /// Append planar channel slices; a mono buffer takes the first slice
    pub fn append(&mut self, channels: &[&[f32]]) {
        for (ch, dest) in self.samples.iter_mut().enumerate() {
            let src = channels.get(ch).or_else(|| channels.first());
            if let Some(src) = src {
                dest.extend_from_slice(src);
            }
        }
    }

    /// Peak absolute sample value
    pub fn peak(&self) -> f32 {
        self.samples
            .iter()
            .flat_map(|ch| ch.iter())
            .map(|s| s.abs())
            .fold(0.0_f32, f32::max)
    }

    /// RMS level in dB across all channels
    pub fn rms_db(&self) -> f32 {
        let total = self.channels() * self.len();
        if total == 0 {
            return f32::NEG_INFINITY;
        }
        let sum_squares: f64 = self
            .samples
            .iter()
            .flat_map(|ch| ch.iter())
            .map(|&s| (s as f64) * (s as f64))
            .sum();
        linear_to_db((sum_squares / total as f64).sqrt() as f32)
    }
}

/// Generate a mono sine tone
pub fn generate_test_tone(frequency: f32, duration_secs: f32, sample_rate: u32) -> AudioBuffer {
    let num_samples = (duration_secs * sample_rate as f32) as usize;
    let mut buffer = AudioBuffer::new(num_samples, ChannelLayout::Mono, sample_rate);
    let angular_freq = 2.0 * std::f32::consts::PI * frequency / sample_rate as f32;
    for (i, sample) in buffer.samples[0].iter_mut().enumerate() {
        *sample = (angular_freq * i as f32).sin();
    }
    buffer
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_interleave_round_trip() {
        let data = vec![0.1, -0.1, 0.2, -0.2, 0.3, -0.3];
        let buffer = AudioBuffer::from_interleaved(&data, ChannelLayout::Stereo, 44100).unwrap();
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.channel(1), &[-0.1, -0.2, -0.3]);
        assert_eq!(buffer.to_interleaved(), data);
    }

    #[test]
    fn test_interleaved_length_must_divide() {
        let err = AudioBuffer::from_interleaved(&[0.0; 3], ChannelLayout::Stereo, 48000).unwrap_err();
        assert_eq!(err.error_code(), "DECODE_ERROR");
    }

    #[test]
    fn test_from_channels_rejects_surround() {
        let err = AudioBuffer::from_channels(vec![vec![0.0; 4]; 6], 48000).unwrap_err();
        assert_eq!(err.error_code(), "UNSUPPORTED_FORMAT");
    }

    #[test]
    fn test_from_channels_reports_layout() {
        let mono = AudioBuffer::from_channels(vec![vec![0.0; 8]], 48000).unwrap();
        assert_eq!(mono.layout(), ChannelLayout::Mono);
        let stereo = AudioBuffer::from_channels(vec![vec![0.0; 8]; 2], 48000).unwrap();
        assert_eq!(stereo.layout(), ChannelLayout::Stereo);

        let err = AudioBuffer::from_channels(vec![vec![0.0; 8], vec![0.0; 3]], 48000).unwrap_err();
        assert_eq!(err.error_code(), "DECODE_ERROR");
    }

    #[test]
    fn test_append_mono_source_to_stereo() {
        let mut buffer = AudioBuffer::new(0, ChannelLayout::Stereo, 48000);
        buffer.append(&[&[0.5, 0.25]]);
        assert_eq!(buffer.channel(0), buffer.channel(1));
        assert_eq!(buffer.len(), 2);
    }

    #[test]
    fn test_tone_levels() {
        let tone = generate_test_tone(440.0, 1.0, 48000);
        assert!((tone.peak() - 1.0).abs() < 1e-3);
        // Full-scale sine RMS is -3.01 dB
        assert!((tone.rms_db() + 3.01).abs() < 0.05);
    }
}
