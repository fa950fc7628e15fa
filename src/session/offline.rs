//! Offline performance rendering
//!
//! Drives a gesture loop and an audio graph from one virtual clock that
//! advances in audio frames. Between gesture ticks the graph renders in
//! tick-sized slices, so parameter changes land where they would in real
//! time.

use std::time::Duration;

use log::{debug, info};

use crate::control::{ControlLoop, TickOutcome};
use crate::engine::buffer::{AudioBuffer, ChannelLayout};
use crate::engine::controller::AudioGraphController;
use crate::engine::sink::BufferSink;
use crate::error::{PinchError, Result};
use crate::gesture::ControlSignal;
use crate::session::Take;

/// Span of the performance to capture as a take
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordWindow {
    pub from: Duration,
    pub to: Duration,
}

impl RecordWindow {
    pub fn new(from: Duration, to: Duration) -> Result<Self> {
        if to <= from {
            return Err(PinchError::InvalidConfig {
                reason: format!(
                    "record window ends ({} ms) before it starts ({} ms)",
                    to.as_millis(),
                    from.as_millis()
                ),
            });
        }
        Ok(Self { from, to })
    }
}

/// What an offline run produced
#[derive(Debug)]
pub struct OfflineReport {
    /// Everything the monitor output played
    pub monitor: AudioBuffer,
    pub take: Option<Take>,
    /// Every signal the gesture loop emitted, with its tick time
    pub signals: Vec<(Duration, ControlSignal)>,
}

/// Runs a performance faster than real time
pub struct OfflineSession<'a> {
    controller: &'a mut AudioGraphController,
    control: ControlLoop,
    tick_interval: Duration,
}

impl<'a> OfflineSession<'a> {
    pub fn new(controller: &'a mut AudioGraphController, control: ControlLoop, tick_interval: Duration) -> Self {
        Self {
            controller,
            control,
            tick_interval,
        }
    }

    /// Render `duration` of audio, optionally recording `window`
    pub fn run(mut self, duration: Duration, window: Option<RecordWindow>) -> Result<OfflineReport> {
        let sample_rate = self.controller.config().sample_rate;
        let total_frames = frames_for(duration, sample_rate);
        let tick_frames = frames_for(self.tick_interval, sample_rate).max(1);

        let mut sink = BufferSink::new(ChannelLayout::Stereo, sample_rate);
        let mut signals = Vec::new();
        let mut take = None;
        let mut recording = false;
        let mut rendered = 0usize;

        while rendered < total_frames {
            let now = time_at(rendered, sample_rate);

            if let Some(w) = window {
                if !recording && take.is_none() && now >= w.from && now < w.to {
                    recording = self.controller.start_recording()?;
                } else if recording && now >= w.to {
                    take = self.controller.stop_recording()?;
                    recording = false;
                }
            }

            match self.control.poll(now) {
                TickOutcome::Signal(signal) => {
                    self.controller.apply_control(&signal)?;
                    signals.push((now, signal));
                }
                TickOutcome::Idle => {}
                TickOutcome::Stopped => debug!("Gesture loop stopped at {:?}", now),
            }

            let frames = tick_frames.min(total_frames - rendered);
            self.controller.render(frames, &mut sink)?;
            rendered += frames;
        }

        if recording {
            take = self.controller.stop_recording()?;
        }
        self.control.shutdown();

        info!(
            "Offline render complete: {:.2}s, {} gesture ticks",
            duration.as_secs_f64(),
            self.control.ticks()
        );
        Ok(OfflineReport {
            monitor: sink.into_buffer(),
            take,
            signals,
        })
    }
}

fn frames_for(duration: Duration, sample_rate: u32) -> usize {
    (duration.as_secs_f64() * sample_rate as f64).round() as usize
}

fn time_at(frames: usize, sample_rate: u32) -> Duration {
    Duration::from_secs_f64(frames as f64 / sample_rate as f64)
}
