//! Gesture interpreter
//!
//! Turns one landmark frame into a [`ControlSignal`]:
//! pinch distance -> calibrated position `n` -> raw channel values ->
//! mode-gated smoothing. An open-hand gesture cycles the active mode.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::calibration::CalibrationState;
use super::landmarks::{Frame, INDEX_TIP, THUMB_TIP};
use super::mode::{Channel, ControlMode};
use super::smoothing::SmoothingState;
use super::toggle::{is_open_hand, GestureState, ToggleRules};
use crate::config::GestureConfig;

/// Per-frame output of the interpreter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlSignal {
    pub pitch_semitones: f32,
    pub volume_factor: f32,
    pub reverb_mix: f32,
    pub mode: ControlMode,
    pub has_hand: bool,
}

impl ControlSignal {
    /// Signal used before any hand has been seen: unity volume, dry, no shift
    pub fn neutral() -> Self {
        Self {
            pitch_semitones: 0.0,
            volume_factor: 1.0,
            reverb_mix: 0.0,
            mode: ControlMode::default(),
            has_hand: false,
        }
    }

    /// Playback-rate ratio for the pitch offset
    pub fn playback_rate(&self) -> f32 {
        semitones_to_ratio(self.pitch_semitones)
    }
}

impl Default for ControlSignal {
    fn default() -> Self {
        Self::neutral()
    }
}

/// Convert a semitone offset to a frequency ratio
#[inline]
pub fn semitones_to_ratio(semitones: f32) -> f32 {
    2.0_f32.powf(semitones / 12.0)
}

/// Unsmoothed channel values for a normalized pinch position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawChannels {
    pub pitch: f32,
    pub volume: f32,
    pub reverb_mix: f32,
}

impl RawChannels {
    /// Map `n` in [0, 1]; a closed pinch raises pitch, an open one lowers it
    pub fn from_position(n: f32, max_semitones: f32, volume_floor: f32) -> Self {
        let n = n.clamp(0.0, 1.0);
        Self {
            pitch: (0.5 - n) * 2.0 * max_semitones,
            volume: n.max(volume_floor),
            reverb_mix: n,
        }
    }

    fn get(&self, channel: Channel) -> f32 {
        match channel {
            Channel::Pitch => self.pitch,
            Channel::Volume => self.volume,
            Channel::ReverbMix => self.reverb_mix,
        }
    }
}

/// Stateful frame-to-signal converter for one control session
#[derive(Debug, Clone)]
pub struct GestureInterpreter {
    max_semitones: f32,
    volume_floor: f32,
    rules: ToggleRules,
    calibration: CalibrationState,
    smoothing: SmoothingState,
    gesture: GestureState,
    last_signal: ControlSignal,
}

impl GestureInterpreter {
    /// Create an interpreter whose calibration window opens at `start_time`
    pub fn new(config: &GestureConfig, start_time: Duration) -> Self {
        let neutral = ControlSignal::neutral();
        Self {
            max_semitones: config.max_semitones,
            volume_floor: config.volume_floor,
            rules: ToggleRules {
                hold_threshold: config.hold_threshold,
                cooldown: config.cooldown(),
                open_hand_spread: config.open_hand_spread,
                min_extended_fingers: config.min_extended_fingers,
            },
            calibration: CalibrationState::new(
                start_time,
                config.calibration_window(),
                config.range_floor,
                config.calibration_policy,
            ),
            smoothing: SmoothingState::new(
                config.smoothing_alpha,
                neutral.pitch_semitones,
                neutral.volume_factor,
                neutral.reverb_mix,
            ),
            gesture: GestureState::default(),
            last_signal: neutral,
        }
    }

    /// Process one frame observed at `now`
    pub fn process(&mut self, frame: &Frame, now: Duration) -> ControlSignal {
        let hand = match frame.hand.as_ref() {
            Some(hand) => hand,
            None => {
                // Hold the last signal; a missing hand never counts toward a toggle
                self.gesture.interrupt();
                self.last_signal.has_hand = false;
                return self.last_signal;
            }
        };

        let dist = frame
            .diagonal_distance(THUMB_TIP, INDEX_TIP)
            .unwrap_or_default();
        self.calibration.observe(dist, now);
        let n = self.calibration.normalize(dist);
        let raw = RawChannels::from_position(n, self.max_semitones, self.volume_floor);

        let open = is_open_hand(hand, frame.aspect_ratio, &self.rules);
        self.gesture.register(open, now, &self.rules);

        let channel = self.gesture.mode().channel();
        self.smoothing.update(channel, raw.get(channel));

        self.last_signal = self.emit();
        self.last_signal
    }

    fn emit(&self) -> ControlSignal {
        let max = self.max_semitones;
        ControlSignal {
            pitch_semitones: self.smoothing.value(Channel::Pitch).clamp(-max, max),
            volume_factor: self
                .smoothing
                .value(Channel::Volume)
                .clamp(self.volume_floor, 1.0),
            reverb_mix: self.smoothing.value(Channel::ReverbMix).clamp(0.0, 1.0),
            mode: self.gesture.mode(),
            has_hand: true,
        }
    }

    pub fn last_signal(&self) -> ControlSignal {
        self.last_signal
    }

    pub fn mode(&self) -> ControlMode {
        self.gesture.mode()
    }

    pub fn calibration(&self) -> &CalibrationState {
        &self.calibration
    }

    pub fn gesture_state(&self) -> &GestureState {
        &self.gesture
    }

    pub fn smoothing(&self) -> &SmoothingState {
        &self.smoothing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::pose::{open_hand, pinch};
    use approx::assert_abs_diff_eq;
    use test_case::test_case;

    const ASPECT: f32 = 4.0 / 3.0;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn pinch_frame(dist: f32, t: Duration) -> Frame {
        Frame::new(t, ASPECT, Some(pinch(dist, ASPECT)))
    }

    fn open_frame(t: Duration) -> Frame {
        Frame::new(t, ASPECT, Some(open_hand()))
    }

    /// Interpreter calibrated to the range [0.05, 0.45] with the window closed
    fn calibrated(config: &GestureConfig) -> (GestureInterpreter, u64) {
        let mut interp = GestureInterpreter::new(config, Duration::ZERO);
        interp.process(&pinch_frame(0.05, ms(0)), ms(0));
        interp.process(&pinch_frame(0.45, ms(100)), ms(100));
        (interp, config.calibration_window_ms)
    }

    #[test_case(0.0, 6.0 ; "closed pinch is max pitch")]
    #[test_case(1.0, -6.0 ; "open pinch is min pitch")]
    #[test_case(0.5, 0.0 ; "middle is unshifted")]
    fn test_pitch_mapping(n: f32, expected: f32) {
        let raw = RawChannels::from_position(n, 6.0, 0.05);
        assert_abs_diff_eq!(raw.pitch, expected, epsilon = 1e-6);
    }

    #[test]
    fn test_volume_floor() {
        let raw = RawChannels::from_position(0.0, 6.0, 0.05);
        assert_eq!(raw.volume, 0.05);
        assert_eq!(raw.reverb_mix, 0.0);
    }

    #[test]
    fn test_semitone_ratio() {
        assert_abs_diff_eq!(semitones_to_ratio(12.0), 2.0, epsilon = 1e-6);
        assert_abs_diff_eq!(semitones_to_ratio(-12.0), 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(semitones_to_ratio(0.0), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_no_hand_holds_last_signal() {
        let config = GestureConfig::default();
        let (mut interp, window) = calibrated(&config);
        let mut last = ControlSignal::neutral();
        for i in 0..20 {
            let t = ms(window + i * 16);
            last = interp.process(&pinch_frame(0.05, t), t);
        }
        assert!(last.has_hand);

        for i in 0..500 {
            let t = ms(window + 1000 + i * 16);
            let held = interp.process(&Frame::empty(t, ASPECT), t);
            assert!(!held.has_hand);
            assert_eq!(held.pitch_semitones, last.pitch_semitones);
            assert_eq!(held.volume_factor, last.volume_factor);
            assert_eq!(held.mode, last.mode);
        }
    }

    #[test]
    fn test_closed_pinch_converges_to_max_pitch() {
        let config = GestureConfig::default();
        let (mut interp, window) = calibrated(&config);
        let mut signal = ControlSignal::neutral();
        for i in 0..40 {
            let t = ms(window + i * 16);
            signal = interp.process(&pinch_frame(0.05, t), t);
        }
        assert_abs_diff_eq!(signal.pitch_semitones, 6.0, epsilon = 1e-2);
        assert!(signal.pitch_semitones <= 6.0);
        assert_eq!(signal.mode, ControlMode::Pitch);
    }

    #[test]
    fn test_open_hand_toggles_to_volume() {
        let config = GestureConfig::default();
        let (mut interp, window) = calibrated(&config);
        let mut signal = ControlSignal::neutral();
        for i in 0..config.hold_threshold as u64 {
            let t = ms(window + i * 16);
            signal = interp.process(&open_frame(t), t);
        }
        assert_eq!(signal.mode, ControlMode::Volume);
        assert_eq!(interp.mode(), ControlMode::Volume);
    }

    #[test]
    fn test_single_open_frame_does_not_toggle() {
        let config = GestureConfig::default();
        let (mut interp, window) = calibrated(&config);
        let t = ms(window);
        interp.process(&open_frame(t), t);
        interp.process(&pinch_frame(0.2, t + ms(16)), t + ms(16));
        assert_eq!(interp.mode(), ControlMode::Pitch);
        assert_eq!(interp.gesture_state().hold_frame_count(), 0);
    }

    #[test]
    fn test_mode_switch_resumes_without_jump() {
        let config = GestureConfig::default();
        let (mut interp, window) = calibrated(&config);
        let mut t = window;

        // Drive pitch up with a closed pinch
        for _ in 0..30 {
            interp.process(&pinch_frame(0.05, ms(t)), ms(t));
            t += 16;
        }
        let volume_before = interp.last_signal().volume_factor;

        // Toggle into volume mode
        let mut toggled = interp.last_signal();
        for _ in 0..config.hold_threshold {
            toggled = interp.process(&open_frame(ms(t)), ms(t));
            t += 16;
        }
        assert_eq!(toggled.mode, ControlMode::Volume);
        // The revealed channel took one EMA step from where it was held
        assert!((toggled.volume_factor - volume_before).abs() <= config.smoothing_alpha + 1e-6);

        // Pitch now holds while volume follows the pinch
        let pitch_held = toggled.pitch_semitones;
        for _ in 0..10 {
            let s = interp.process(&pinch_frame(0.45, ms(t)), ms(t));
            assert_eq!(s.pitch_semitones, pitch_held);
            t += 16;
        }
        assert!(interp.last_signal().volume_factor > toggled.volume_factor);
    }

    #[test]
    fn test_signal_bounds_hold_for_wild_input() {
        let config = GestureConfig::default();
        let mut interp = GestureInterpreter::new(&config, Duration::ZERO);
        for i in 0..200u64 {
            let dist = if i % 3 == 0 { 0.0 } else { 0.9 };
            let t = ms(i * 16);
            let s = interp.process(&pinch_frame(dist, t), t);
            assert!(s.pitch_semitones.abs() <= config.max_semitones);
            assert!(s.volume_factor >= config.volume_floor && s.volume_factor <= 1.0);
            assert!((0.0..=1.0).contains(&s.reverb_mix));
        }
    }
}
