//! Integration Tests
//!
//! End-to-end tests: scripted hand -> gesture loop -> audio graph -> takes.

use std::fs;
use std::time::Duration;

use approx::assert_abs_diff_eq;
use pretty_assertions::assert_eq;
use tempfile::tempdir;

use pinchwave::cli::commands::{read_take_info, render, RenderOptions};
use pinchwave::config::{AudioConfig, GestureConfig, PinchConfig};
use pinchwave::control::{ControlLoop, TickOutcome};
use pinchwave::engine::{
    generate_test_tone, AudioGraphController, BufferSink, ChannelLayout, NullSink, TakeEncoder, WavEncoder,
};
use pinchwave::gesture::{ControlMode, ControlSignal, Frame, GestureInterpreter};
use pinchwave::session::{OfflineSession, RecordWindow, RecordingState};
use pinchwave::sim::pose::pinch;
use pinchwave::sim::{scripted_hand, GestureScript, Keyframe, Pose};

const ASPECT: f32 = 4.0 / 3.0;

/// Helper: a WAV file's bytes holding a short tone
fn tone_wav(seconds: f32) -> Vec<u8> {
    let tone = generate_test_tone(330.0, seconds, 48000);
    WavEncoder::new(16).encode(&tone).unwrap()
}

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

// === Graph Lifecycle ===

#[test]
fn test_reinitialize_leaves_exactly_one_source() {
    let mut controller = AudioGraphController::new(&AudioConfig::default());
    let bytes = tone_wav(0.5);

    controller.initialize_from_bytes(&bytes).unwrap();
    controller.initialize_from_bytes(&bytes).unwrap();
    assert_eq!(controller.active_sources(), 1);

    controller.initialize(generate_test_tone(220.0, 0.25, 48000)).unwrap();
    assert_eq!(controller.active_sources(), 1);

    controller.teardown();
    assert_eq!(controller.active_sources(), 0);
}

// === Recording ===

/// Two back-to-back takes; with `toggle_every` set, mute also flips before
/// the first take, every few blocks while recording, and between takes
fn record_with_mute_pattern(toggle_every: Option<usize>) -> (Vec<u8>, Vec<u8>) {
    let mut controller = AudioGraphController::new(&AudioConfig::default());
    controller.initialize_from_bytes(&tone_wav(0.5)).unwrap();
    controller
        .apply_control(&ControlSignal {
            pitch_semitones: 3.0,
            volume_factor: 0.7,
            reverb_mix: 0.4,
            ..ControlSignal::neutral()
        })
        .unwrap();

    let record = |controller: &mut AudioGraphController| {
        if toggle_every.is_some() {
            controller.toggle_mute().unwrap();
        }
        assert!(controller.start_recording().unwrap());
        for block in 0..40 {
            if let Some(every) = toggle_every {
                if block % every == 0 {
                    controller.toggle_mute().unwrap();
                }
            }
            controller.render(1024, &mut NullSink).unwrap();
        }
        controller.stop_recording().unwrap().unwrap().payload
    };

    let first = record(&mut controller);
    let second = record(&mut controller);
    (first, second)
}

#[test]
fn test_mute_never_changes_recorded_take() {
    let (unmuted_first, unmuted_second) = record_with_mute_pattern(None);
    let (toggled_first, toggled_second) = record_with_mute_pattern(Some(3));
    assert!(unmuted_first.len() > 40 * 1024);
    assert!(unmuted_first == toggled_first, "mute toggling altered the first take");
    assert!(unmuted_second == toggled_second, "mute toggling altered the second take");
    assert!(unmuted_first != unmuted_second);
}

#[test]
fn test_review_keeps_loop_running_and_silences_monitor() {
    let mut controller = AudioGraphController::new(&AudioConfig::default());
    controller.initialize_from_bytes(&tone_wav(0.5)).unwrap();

    controller.start_recording().unwrap();
    controller.render(4096, &mut NullSink).unwrap();
    let take = controller.stop_recording().unwrap().unwrap();
    assert_eq!(controller.takes().len(), 1);

    assert!(controller.begin_take_review(take.id).unwrap());
    assert_eq!(controller.recording_state(), RecordingState::Reviewing(take.id));
    assert!(!controller.start_recording().unwrap());

    let mut sink = BufferSink::new(ChannelLayout::Stereo, 48000);
    controller.render(2048, &mut sink).unwrap();
    assert_eq!(sink.buffer().peak(), 0.0);
    assert_eq!(controller.active_sources(), 1);

    assert!(controller.end_take_review().unwrap());
    let mut sink = BufferSink::new(ChannelLayout::Stereo, 48000);
    controller.render(2048, &mut sink).unwrap();
    assert!(sink.buffer().peak() > 0.5);
    assert_eq!(controller.recording_state(), RecordingState::Armed);
}

// === Calibration ===

#[test]
fn test_calibration_sweep_then_midpoint() {
    let config = GestureConfig::default();
    let mut interpreter = GestureInterpreter::new(&config, Duration::ZERO);

    // Wide to closed across the first second of the window
    for i in 0..=60u64 {
        let dist = 0.40 - 0.36 * (i as f32 / 60.0);
        let frame = Frame::new(ms(i * 16), ASPECT, Some(pinch(dist, ASPECT)));
        interpreter.process(&frame, ms(i * 16));
    }
    let calibration = interpreter.calibration();
    assert_abs_diff_eq!(calibration.d_min(), 0.04, epsilon = 1e-4);
    assert_abs_diff_eq!(calibration.d_max(), 0.40, epsilon = 1e-4);

    // Halfway after the window closes
    let mut signal = ControlSignal::neutral();
    for i in 0..40u64 {
        let now = ms(2000 + i * 16);
        signal = interpreter.process(&Frame::new(now, ASPECT, Some(pinch(0.22, ASPECT))), now);
    }
    assert_abs_diff_eq!(interpreter.calibration().normalize(0.22), 0.5, epsilon = 1e-3);
    assert_abs_diff_eq!(signal.pitch_semitones, 0.0, epsilon = 0.02);

    // Frozen: a wider pinch no longer moves the bounds
    let now = ms(3000);
    interpreter.process(&Frame::new(now, ASPECT, Some(pinch(0.60, ASPECT))), now);
    assert_abs_diff_eq!(interpreter.calibration().d_max(), 0.40, epsilon = 1e-4);
}

// === Gesture Loop ===

#[test]
fn test_scripted_loop_holds_signal_when_hand_leaves() {
    let script = GestureScript::new(
        ASPECT,
        vec![
            Keyframe::new(0, Pose::Pinch, 0.30),
            Keyframe::new(500, Pose::Pinch, 0.05),
            Keyframe::new(1000, Pose::Absent, 0.0),
            Keyframe::new(2000, Pose::Absent, 0.0),
        ],
    )
    .unwrap();
    let (camera, landmarks) = scripted_hand(script);
    let config = PinchConfig::default();
    let mut control = ControlLoop::start(Box::new(camera), Box::new(landmarks), &config, Duration::ZERO).unwrap();

    let mut last_with_hand = None;
    let mut last = None;
    let mut t = Duration::ZERO;
    while t <= ms(2000) {
        if let TickOutcome::Signal(signal) = control.poll(t) {
            if signal.has_hand {
                last_with_hand = Some(signal);
            }
            last = Some(signal);
        }
        t += ms(4);
    }

    let held = last_with_hand.unwrap();
    let last = last.unwrap();
    assert!(!last.has_hand);
    assert_eq!(last.pitch_semitones, held.pitch_semitones);
    assert_eq!(last.volume_factor, held.volume_factor);
    assert_eq!(last.mode, held.mode);

    // Roughly 60 ticks per second of script
    assert!((115..=125).contains(&control.ticks()), "ticks: {}", control.ticks());
}

#[test]
fn test_offline_session_cycles_modes_and_records() {
    let config = PinchConfig::default();
    let mut controller = AudioGraphController::new(&config.audio);
    controller.initialize_from_bytes(&tone_wav(1.0)).unwrap();

    let script = GestureScript::demo();
    let duration = script.duration();
    let (camera, landmarks) = scripted_hand(script);
    let control = ControlLoop::start(Box::new(camera), Box::new(landmarks), &config, Duration::ZERO).unwrap();

    let window = RecordWindow::new(ms(1000), ms(3000)).unwrap();
    let report = OfflineSession::new(&mut controller, control, config.control.tick_interval())
        .run(duration, Some(window))
        .unwrap();

    let modes: Vec<ControlMode> = report.signals.iter().map(|(_, s)| s.mode).collect();
    assert_eq!(modes.first(), Some(&ControlMode::Pitch));
    assert!(modes.contains(&ControlMode::Volume));
    assert_eq!(modes.last(), Some(&ControlMode::ReverbMix));

    // Hand drops out between 5.6 s and 6.2 s
    assert!(report.signals.iter().any(|(_, s)| !s.has_hand));

    let take = report.take.unwrap();
    assert_abs_diff_eq!(take.duration_secs(), 2.0, epsilon = 0.02);
    assert_eq!(report.monitor.len(), 9 * 48000);
    assert_eq!(controller.takes().len(), 1);
    assert_eq!(controller.recording_state(), RecordingState::Armed);
}

// === CLI ===

#[test]
fn test_render_command_writes_take_and_monitor() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("loop.wav");
    let take_path = dir.path().join("take.wav");
    let monitor_path = dir.path().join("monitor.wav");
    fs::write(&input, tone_wav(0.75)).unwrap();

    let opts = RenderOptions {
        input,
        take: Some(take_path.clone()),
        monitor: Some(monitor_path.clone()),
        record_from_ms: 500,
        record_to_ms: Some(1500),
        ..RenderOptions::default()
    };
    let report = render(&opts).unwrap();

    let take = report.take.unwrap();
    let info = read_take_info(&take_path).unwrap();
    assert_eq!(info.sha256, take.sha256);
    assert_eq!(info.channels, 2);
    assert_abs_diff_eq!(info.duration_secs(), 1.0, epsilon = 0.02);

    let monitor = read_take_info(&monitor_path).unwrap();
    assert_abs_diff_eq!(monitor.duration_secs(), 9.0, epsilon = 0.01);
}

#[test]
fn test_render_command_rejects_undecodable_input() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("broken.wav");
    fs::write(&input, b"not a wav").unwrap();

    let opts = RenderOptions {
        input,
        ..RenderOptions::default()
    };
    let err = render(&opts).unwrap_err();
    assert_eq!(err.error_code(), "DECODE_ERROR");
    assert!(!err.recovery_suggestions().is_empty());
}
