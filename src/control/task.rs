//! Cooperative gesture task
//!
//! The loop is polled by its owner at whatever rate it likes; it only does
//! work once per tick interval and yields one [`ControlSignal`] per tick.
//! Cancellation goes through a [`StopToken`] that can be cloned into any
//! other part of the program.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};

use super::source::{LandmarkSource, VideoSource};
use crate::config::PinchConfig;
use crate::error::Result;
use crate::gesture::{ControlSignal, Frame, GestureInterpreter};

/// Shared cancellation flag for a control loop
#[derive(Debug, Clone, Default)]
pub struct StopToken(Arc<AtomicBool>);

impl StopToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_stop_requested(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Result of one poll
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// A tick ran and produced a signal
    Signal(ControlSignal),
    /// Not due yet, or no new camera frame
    Idle,
    /// The loop has shut down
    Stopped,
}

/// Gesture control session: camera -> landmarks -> interpreter
pub struct ControlLoop {
    video: Box<dyn VideoSource>,
    landmarks: Box<dyn LandmarkSource>,
    interpreter: GestureInterpreter,
    stop: StopToken,
    interval: Duration,
    next_due: Duration,
    running: bool,
    ticks: u64,
}

impl ControlLoop {
    /// Open the camera and start a session whose clock starts at `start_time`
    ///
    /// A camera error is returned as-is and the landmark session is closed;
    /// no loop exists afterwards.
    pub fn start(
        mut video: Box<dyn VideoSource>,
        mut landmarks: Box<dyn LandmarkSource>,
        config: &PinchConfig,
        start_time: Duration,
    ) -> Result<Self> {
        if let Err(e) = video.open() {
            warn!("Gesture control not started: {}", e);
            landmarks.close();
            return Err(e);
        }
        info!(
            "Gesture control started ({} Hz, calibrating for {} ms)",
            config.control.tick_hz, config.gesture.calibration_window_ms
        );
        Ok(Self {
            video,
            landmarks,
            interpreter: GestureInterpreter::new(&config.gesture, start_time),
            stop: StopToken::new(),
            interval: config.control.tick_interval(),
            next_due: start_time,
            running: true,
            ticks: 0,
        })
    }

    /// Token that cancels this loop on its next poll
    pub fn stop_token(&self) -> StopToken {
        self.stop.clone()
    }

    /// Run one tick if it is due
    pub fn poll(&mut self, now: Duration) -> TickOutcome {
        if !self.running {
            return TickOutcome::Stopped;
        }
        if self.stop.is_stop_requested() {
            self.shutdown();
            return TickOutcome::Stopped;
        }
        if now < self.next_due {
            return TickOutcome::Idle;
        }
        // Skip missed ticks instead of bursting to catch up
        while self.next_due <= now {
            self.next_due += self.interval;
        }

        let video_frame = match self.video.grab(now) {
            Some(frame) => frame,
            None => return TickOutcome::Idle,
        };
        let hand = self.landmarks.detect(&video_frame, video_frame.timestamp);
        let frame = Frame::new(video_frame.timestamp, video_frame.aspect_ratio(), hand);

        self.ticks += 1;
        TickOutcome::Signal(self.interpreter.process(&frame, now))
    }

    /// Cancel the loop, release the camera and close the landmark session
    ///
    /// Safe to call any number of times.
    pub fn shutdown(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.stop.request_stop();
        self.video.release();
        self.landmarks.close();
        debug!("Gesture control stopped after {} ticks", self.ticks);
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn interpreter(&self) -> &GestureInterpreter {
        &self.interpreter
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

impl Drop for ControlLoop {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::source::VideoFrame;
    use crate::error::PinchError;
    use crate::gesture::landmarks::HandLandmarks;
    use crate::sim::pose::pinch;
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Counters {
        released: Cell<u32>,
        closed: Cell<u32>,
        detected: Cell<u32>,
    }

    struct FakeCamera {
        counters: Rc<Counters>,
        fail: bool,
    }

    impl VideoSource for FakeCamera {
        fn open(&mut self) -> Result<()> {
            if self.fail {
                return Err(PinchError::Device {
                    reason: "permission denied".to_string(),
                });
            }
            Ok(())
        }

        fn grab(&mut self, now: Duration) -> Option<VideoFrame> {
            Some(VideoFrame {
                width: 640,
                height: 480,
                timestamp: now,
            })
        }

        fn release(&mut self) {
            self.counters.released.set(self.counters.released.get() + 1);
        }
    }

    struct FakeDetector {
        counters: Rc<Counters>,
    }

    impl LandmarkSource for FakeDetector {
        fn detect(&mut self, _frame: &VideoFrame, _ts: Duration) -> Option<HandLandmarks> {
            self.counters.detected.set(self.counters.detected.get() + 1);
            Some(pinch(0.1, 4.0 / 3.0))
        }

        fn close(&mut self) {
            self.counters.closed.set(self.counters.closed.get() + 1);
        }
    }

    fn start(counters: &Rc<Counters>, fail: bool) -> Result<ControlLoop> {
        ControlLoop::start(
            Box::new(FakeCamera {
                counters: Rc::clone(counters),
                fail,
            }),
            Box::new(FakeDetector {
                counters: Rc::clone(counters),
            }),
            &PinchConfig::default(),
            Duration::ZERO,
        )
    }

    #[test]
    fn test_device_error_prevents_start() {
        let counters = Rc::new(Counters::default());
        let err = start(&counters, true).err().unwrap();
        assert_eq!(err.error_code(), "DEVICE_ERROR");
        assert_eq!(counters.closed.get(), 1);
        assert_eq!(counters.detected.get(), 0);
    }

    #[test]
    fn test_ticks_at_fixed_cadence() {
        let counters = Rc::new(Counters::default());
        let mut control = start(&counters, false).unwrap();

        let mut signals = 0;
        // Poll every millisecond for one second
        for ms in 0..1000 {
            if let TickOutcome::Signal(s) = control.poll(Duration::from_millis(ms)) {
                assert!(s.has_hand);
                signals += 1;
            }
        }
        assert!((59..=61).contains(&signals), "got {} ticks", signals);
        assert_eq!(control.ticks(), signals);
    }

    #[test]
    fn test_stop_token_cancels_loop() {
        let counters = Rc::new(Counters::default());
        let mut control = start(&counters, false).unwrap();
        let token = control.stop_token();

        assert!(matches!(control.poll(Duration::ZERO), TickOutcome::Signal(_)));
        token.request_stop();
        assert_eq!(control.poll(Duration::from_millis(100)), TickOutcome::Stopped);
        assert!(!control.is_running());
        assert_eq!(counters.released.get(), 1);
        assert_eq!(counters.closed.get(), 1);
    }

    #[test]
    fn test_shutdown_is_idempotent() {
        let counters = Rc::new(Counters::default());
        let mut control = start(&counters, false).unwrap();
        control.shutdown();
        control.shutdown();
        drop(control);
        assert_eq!(counters.released.get(), 1);
        assert_eq!(counters.closed.get(), 1);
    }
}
