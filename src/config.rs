//! Configuration for Pinchwave
//!
//! All tunables live here and are (de)serialized as JSON. Every field has a
//! default so a partial file is enough; `validate` rejects values that would
//! break the gesture math or the render path.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{PinchError, Result};

/// What calibration does once its window has elapsed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalibrationPolicy {
    /// Bounds are frozen after the window
    #[default]
    Freeze,
    /// Bounds keep expanding for the whole session
    Adaptive,
}

/// How a pitch offset is applied to the loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PitchMode {
    /// Change the playback rate; tempo follows pitch
    #[default]
    Resample,
    /// Shift pitch through a delay-line shifter; tempo stays constant
    TimePreserving,
}

/// Gesture interpretation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Length of the calibration window in milliseconds
    pub calibration_window_ms: u64,
    pub calibration_policy: CalibrationPolicy,
    /// Smallest pinch range used for normalization (frame-diagonal units)
    pub range_floor: f32,
    /// Pitch bound in semitones, applied symmetrically
    pub max_semitones: f32,
    /// Lowest volume factor the gesture can reach
    pub volume_floor: f32,
    /// EMA coefficient, in (0, 1)
    pub smoothing_alpha: f32,
    /// Consecutive open-hand frames needed to toggle mode
    pub hold_threshold: u32,
    /// Minimum time between two mode toggles in milliseconds
    pub cooldown_ms: u64,
    /// Thumb-to-pinky spread for an open hand (frame-diagonal units)
    pub open_hand_spread: f32,
    /// Extended non-thumb fingers needed for an open hand
    pub min_extended_fingers: usize,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            calibration_window_ms: 1500,
            calibration_policy: CalibrationPolicy::Freeze,
            // 10px on a 640x480 frame
            range_floor: 0.0125,
            max_semitones: 6.0,
            volume_floor: 0.05,
            smoothing_alpha: 0.25,
            hold_threshold: 8,
            cooldown_ms: 800,
            // 0.25 of the frame width at 4:3
            open_hand_spread: 0.2,
            min_extended_fingers: 3,
        }
    }
}

impl GestureConfig {
    pub fn calibration_window(&self) -> Duration {
        Duration::from_millis(self.calibration_window_ms)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

/// Audio graph settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Output sample rate in Hz
    pub sample_rate: u32,
    /// Largest block the graph renders in one call
    pub block_size: usize,
    pub pitch_mode: PitchMode,
    /// Reverb room size: 0 (tiny) to 1 (huge hall)
    pub reverb_room_size: f32,
    /// Reverb damping: 0 (bright) to 1 (dark)
    pub reverb_damping: f32,
    /// Bit depth of encoded takes: 16, 24 or 32
    pub take_bit_depth: u16,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            block_size: 1024,
            pitch_mode: PitchMode::Resample,
            reverb_room_size: 0.5,
            reverb_damping: 0.5,
            take_bit_depth: 16,
        }
    }
}

/// Gesture loop settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// Gesture tick rate in Hz
    pub tick_hz: u32,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self { tick_hz: 60 }
    }
}

impl ControlConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.tick_hz.max(1) as f64)
    }
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PinchConfig {
    pub gesture: GestureConfig,
    pub audio: AudioConfig,
    pub control: ControlConfig,
}

impl PinchConfig {
    /// Load and validate a JSON configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: PinchConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the configuration as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Check every field is within a usable range
    pub fn validate(&self) -> Result<()> {
        let g = &self.gesture;
        if !(g.smoothing_alpha > 0.0 && g.smoothing_alpha < 1.0) {
            return Err(invalid("smoothing_alpha", g.smoothing_alpha, "0.0 < alpha < 1.0"));
        }
        if !(g.range_floor > 0.0) {
            return Err(invalid("range_floor", g.range_floor, "greater than 0.0"));
        }
        if !(g.max_semitones > 0.0 && g.max_semitones <= 24.0) {
            return Err(invalid("max_semitones", g.max_semitones, "0.0 < x <= 24.0"));
        }
        if !(0.0..=1.0).contains(&g.volume_floor) {
            return Err(invalid("volume_floor", g.volume_floor, "0.0 to 1.0"));
        }
        if g.hold_threshold == 0 {
            return Err(invalid("hold_threshold", g.hold_threshold, "at least 1"));
        }
        if !(g.open_hand_spread > 0.0) {
            return Err(invalid("open_hand_spread", g.open_hand_spread, "greater than 0.0"));
        }
        if g.min_extended_fingers == 0 || g.min_extended_fingers > 4 {
            return Err(invalid("min_extended_fingers", g.min_extended_fingers, "1 to 4"));
        }

        let a = &self.audio;
        if a.sample_rate < 8000 {
            return Err(invalid("sample_rate", a.sample_rate, "at least 8000"));
        }
        if a.block_size == 0 {
            return Err(invalid("block_size", a.block_size, "at least 1"));
        }
        if !(0.0..=1.0).contains(&a.reverb_room_size) {
            return Err(invalid("reverb_room_size", a.reverb_room_size, "0.0 to 1.0"));
        }
        if !(0.0..=1.0).contains(&a.reverb_damping) {
            return Err(invalid("reverb_damping", a.reverb_damping, "0.0 to 1.0"));
        }
        if !matches!(a.take_bit_depth, 16 | 24 | 32) {
            return Err(invalid("take_bit_depth", a.take_bit_depth, "16, 24 or 32"));
        }

        if self.control.tick_hz == 0 || self.control.tick_hz > 1000 {
            return Err(invalid("tick_hz", self.control.tick_hz, "1 to 1000"));
        }
        Ok(())
    }
}

fn invalid(field: &str, value: impl std::fmt::Display, expected: &str) -> PinchError {
    PinchError::InvalidConfig {
        reason: format!("{} = {} (expected {})", field, value, expected),
    }
}
