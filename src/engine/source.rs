//! Looping buffer source
//!
//! A source plays a decoded buffer in a loop at a variable rate. Sources
//! are single-use: once stopped they cannot be started again, and a new
//! graph needs a new source. A shared counter tracks how many sources are
//! currently playing so callers can verify that rebuilding a graph never
//! leaves an old loop running.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use log::warn;

use super::buffer::AudioBuffer;

/// Count of sources currently playing
#[derive(Debug, Clone, Default)]
pub struct SourceTracker(Arc<AtomicUsize>);

impl SourceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    fn acquire(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    fn release(&self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceState {
    Pending,
    Playing,
    Stopped,
}

#[derive(Debug)]
pub struct LoopSource {
    buffer: Arc<AudioBuffer>,
    position: f64,
    state: SourceState,
    tracker: SourceTracker,
}

impl LoopSource {
    pub fn new(buffer: Arc<AudioBuffer>, tracker: SourceTracker) -> Self {
        Self {
            buffer,
            position: 0.0,
            state: SourceState::Pending,
            tracker,
        }
    }

    /// Begin playback; returns false if the source was already used
    pub fn start(&mut self) -> bool {
        match self.state {
            SourceState::Pending => {
                self.state = SourceState::Playing;
                self.tracker.acquire();
                true
            }
            SourceState::Playing => false,
            SourceState::Stopped => {
                warn!("Loop source cannot be restarted after stop");
                false
            }
        }
    }

    /// Stop playback permanently (no-op if not playing)
    pub fn stop(&mut self) {
        if self.state == SourceState::Playing {
            self.tracker.release();
        }
        self.state = SourceState::Stopped;
    }

    pub fn state(&self) -> SourceState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == SourceState::Playing
    }

    /// Read position in source frames
    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn buffer(&self) -> &AudioBuffer {
        &self.buffer
    }

    /// Fill a stereo block, advancing `rate` source frames per output frame
    ///
    /// A mono buffer is copied to both channels. Outside the playing state
    /// the block is silent.
    pub fn render(&mut self, rate: f32, left: &mut [f32], right: &mut [f32]) {
        let len = self.buffer.len();
        if self.state != SourceState::Playing || len == 0 {
            left.fill(0.0);
            right.fill(0.0);
            return;
        }

        let src_left = self.buffer.channel(0);
        let src_right = if self.buffer.channels() > 1 {
            self.buffer.channel(1)
        } else {
            src_left
        };
        let rate = if rate.is_finite() { rate.max(0.0) as f64 } else { 1.0 };
        let len_f = len as f64;

        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            let idx = self.position as usize;
            let frac = (self.position - idx as f64) as f32;
            let next = if idx + 1 >= len { 0 } else { idx + 1 };
            *l = src_left[idx] + (src_left[next] - src_left[idx]) * frac;
            *r = src_right[idx] + (src_right[next] - src_right[idx]) * frac;

            self.position += rate;
            if self.position >= len_f {
                self.position %= len_f;
            }
        }
    }
}

impl Drop for LoopSource {
    fn drop(&mut self) {
        self.stop();
    }
}
