//! Audio file I/O
//!
//! The decoder and the take encoder are collaborators the core only knows
//! through traits. The implementations here handle WAV through `hound`:
//! any integer or float WAV is converted to float and resampled to the
//! output rate on decode; takes are encoded as integer or float WAV.

use std::io::Cursor;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use log::debug;

use crate::engine::buffer::{AudioBuffer, ChannelLayout};
use crate::error::{PinchError, Result};

/// Converts an encoded file into the fixed-format PCM buffer
pub trait AudioDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<AudioBuffer>;
}

/// Turns captured PCM into a downloadable payload
pub trait TakeEncoder {
    fn encode(&self, audio: &AudioBuffer) -> Result<Vec<u8>>;

    /// MIME type of the payload
    fn mime_type(&self) -> &'static str;
}

/// WAV decoder resampling to a fixed output rate
#[derive(Debug, Clone)]
pub struct WavDecoder {
    target_sample_rate: u32,
}

impl WavDecoder {
    pub fn new(target_sample_rate: u32) -> Self {
        Self { target_sample_rate }
    }
}

impl AudioDecoder for WavDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<AudioBuffer> {
        let reader = WavReader::new(Cursor::new(bytes))
            .map_err(|e| PinchError::decode(format!("Failed to parse WAV header: {}", e), e))?;

        let spec = reader.spec();
        let channels = spec.channels as usize;
        let layout = ChannelLayout::from_count(channels).ok_or_else(|| PinchError::UnsupportedFormat {
            format: format!("{}-channel audio (only mono/stereo supported)", channels),
        })?;

        let interleaved = read_samples_as_f32(reader, spec.bits_per_sample, spec.sample_format)?;
        if interleaved.len() < channels {
            return Err(PinchError::EmptyAudio);
        }

        let decoded = AudioBuffer::from_interleaved(&interleaved, layout, spec.sample_rate)?;
        debug!(
            "Decoded {} frames, {} ch @ {} Hz",
            decoded.len(),
            channels,
            spec.sample_rate
        );

        if spec.sample_rate == self.target_sample_rate {
            return Ok(decoded);
        }
        let resampled = resample_channels(&decoded.samples, spec.sample_rate, self.target_sample_rate);
        AudioBuffer::from_channels(resampled, self.target_sample_rate)
    }
}

/// WAV take encoder
#[derive(Debug, Clone)]
pub struct WavEncoder {
    bit_depth: u16,
}

impl WavEncoder {
    /// `bit_depth` is 16, 24 or 32 (32 writes float samples)
    pub fn new(bit_depth: u16) -> Self {
        Self { bit_depth }
    }
}

impl TakeEncoder for WavEncoder {
    fn encode(&self, audio: &AudioBuffer) -> Result<Vec<u8>> {
        let spec = WavSpec {
            channels: audio.channels().max(1) as u16,
            sample_rate: audio.sample_rate,
            bits_per_sample: self.bit_depth,
            sample_format: if self.bit_depth == 32 {
                SampleFormat::Float
            } else {
                SampleFormat::Int
            },
        };

        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = WavWriter::new(&mut cursor, spec).map_err(encode_error)?;
            let interleaved = audio.to_interleaved();
            match self.bit_depth {
                16 => {
                    for sample in interleaved {
                        let scaled = (sample * 32767.0).clamp(-32768.0, 32767.0) as i16;
                        writer.write_sample(scaled).map_err(encode_error)?;
                    }
                }
                24 => {
                    for sample in interleaved {
                        // 24-bit stored as i32 in hound
                        let scaled = (sample * 8388607.0).clamp(-8388608.0, 8388607.0) as i32;
                        writer.write_sample(scaled).map_err(encode_error)?;
                    }
                }
                32 => {
                    for sample in interleaved {
                        writer.write_sample(sample).map_err(encode_error)?;
                    }
                }
                other => {
                    return Err(PinchError::UnsupportedFormat {
                        format: format!("{}-bit audio (only 16, 24, 32 supported)", other),
                    });
                }
            }
            writer.finalize().map_err(encode_error)?;
        }
        Ok(cursor.into_inner())
    }

    fn mime_type(&self) -> &'static str {
        "audio/wav"
    }
}

fn encode_error(e: hound::Error) -> PinchError {
    PinchError::Encode {
        reason: e.to_string(),
    }
}

/// Read samples from a WAV reader and convert to f32
fn read_samples_as_f32<R: std::io::Read>(
    mut reader: WavReader<R>,
    bits_per_sample: u16,
    sample_format: SampleFormat,
) -> Result<Vec<f32>> {
    let read_err = |bits: u16| move |e: hound::Error| PinchError::decode(format!("Failed to read {}-bit samples: {}", bits, e), e);

    match (sample_format, bits_per_sample) {
        (SampleFormat::Float, _) => reader
            .samples::<f32>()
            .collect::<std::result::Result<Vec<f32>, _>>()
            .map_err(read_err(bits_per_sample)),
        (SampleFormat::Int, 8) => reader
            .samples::<i8>()
            .map(|s| s.map(|v| v as f32 / 128.0))
            .collect::<std::result::Result<Vec<f32>, _>>()
            .map_err(read_err(8)),
        (SampleFormat::Int, 16) => reader
            .samples::<i16>()
            .map(|s| s.map(|v| v as f32 / 32768.0))
            .collect::<std::result::Result<Vec<f32>, _>>()
            .map_err(read_err(16)),
        (SampleFormat::Int, 24) => reader
            .samples::<i32>()
            .map(|s| s.map(|v| v as f32 / 8388608.0))
            .collect::<std::result::Result<Vec<f32>, _>>()
            .map_err(read_err(24)),
        (SampleFormat::Int, 32) => reader
            .samples::<i32>()
            .map(|s| s.map(|v| v as f32 / 2147483648.0))
            .collect::<std::result::Result<Vec<f32>, _>>()
            .map_err(read_err(32)),
        (SampleFormat::Int, bits) => Err(PinchError::UnsupportedFormat {
            format: format!("{}-bit integer audio", bits),
        }),
    }
}

/// Linear-interpolation sample rate conversion of each channel
pub fn resample_channels(channels: &[Vec<f32>], from_rate: u32, to_rate: u32) -> Vec<Vec<f32>> {
    if from_rate == to_rate || from_rate == 0 || to_rate == 0 {
        return channels.to_vec();
    }
    let ratio = from_rate as f64 / to_rate as f64;
    channels
        .iter()
        .map(|input| {
            if input.is_empty() {
                return Vec::new();
            }
            let out_len = ((input.len() as f64) / ratio).round().max(1.0) as usize;
            (0..out_len)
                .map(|i| {
                    let pos = i as f64 * ratio;
                    let idx = pos.floor() as usize;
                    let frac = (pos - idx as f64) as f32;
                    let a = input[idx.min(input.len() - 1)];
                    let b = input[(idx + 1).min(input.len() - 1)];
                    a + (b - a) * frac
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::buffer::generate_test_tone;
    use approx::assert_abs_diff_eq;

    fn wav_bytes(spec: WavSpec, samples: &[i16]) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = WavWriter::new(&mut cursor, spec).unwrap();
            for &s in samples {
                writer.write_sample(s).unwrap();
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    fn int16_spec(channels: u16, sample_rate: u32) -> WavSpec {
        WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        }
    }

    #[test]
    fn test_decode_16bit_stereo() {
        let bytes = wav_bytes(int16_spec(2, 48000), &[16384, -16384, 0, 32767]);
        let buffer = WavDecoder::new(48000).decode(&bytes).unwrap();
        assert_eq!(buffer.channels(), 2);
        assert_eq!(buffer.len(), 2);
        assert_abs_diff_eq!(buffer.channel(0)[0], 0.5, epsilon = 1e-4);
        assert_abs_diff_eq!(buffer.channel(1)[0], -0.5, epsilon = 1e-4);
    }

    #[test]
    fn test_decode_resamples_to_target() {
        let samples: Vec<i16> = (0..24000).map(|i| ((i % 100) * 100) as i16).collect();
        let bytes = wav_bytes(int16_spec(1, 24000), &samples);
        let buffer = WavDecoder::new(48000).decode(&bytes).unwrap();
        assert_eq!(buffer.sample_rate, 48000);
        assert_eq!(buffer.len(), 48000);
    }

    #[test]
    fn test_decode_garbage_is_decode_error() {
        let err = WavDecoder::new(48000).decode(b"definitely not a wav file").unwrap_err();
        assert_eq!(err.error_code(), "DECODE_ERROR");
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_decode_empty_data_chunk() {
        let bytes = wav_bytes(int16_spec(1, 48000), &[]);
        let err = WavDecoder::new(48000).decode(&bytes).unwrap_err();
        assert_eq!(err.error_code(), "EMPTY_AUDIO");
    }

    #[test]
    fn test_decode_rejects_surround() {
        let bytes = wav_bytes(int16_spec(6, 48000), &[0; 12]);
        let err = WavDecoder::new(48000).decode(&bytes).unwrap_err();
        assert_eq!(err.error_code(), "UNSUPPORTED_FORMAT");
    }

    #[test]
    fn test_encode_then_decode_preserves_tone() {
        let tone = generate_test_tone(440.0, 0.25, 48000);
        for bits in [16u16, 24, 32] {
            let bytes = WavEncoder::new(bits).encode(&tone).unwrap();
            let decoded = WavDecoder::new(48000).decode(&bytes).unwrap();
            assert_eq!(decoded.len(), tone.len());
            assert_abs_diff_eq!(decoded.peak(), tone.peak(), epsilon = 1e-3);
        }
    }

    #[test]
    fn test_encode_rejects_odd_bit_depth() {
        let tone = generate_test_tone(440.0, 0.01, 48000);
        assert!(WavEncoder::new(12).encode(&tone).is_err());
    }

    #[test]
    fn test_resample_identity() {
        let data = vec![vec![0.0, 0.5, 1.0]];
        assert_eq!(resample_channels(&data, 48000, 48000), data);
    }
}
