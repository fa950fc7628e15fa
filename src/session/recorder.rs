//! Take recorder
//!
//! Captures blocks from the graph's recording tap and turns them into a
//! [`Take`] when stopped.

use log::{debug, info};

use super::take::Take;
use crate::engine::buffer::{AudioBuffer, ChannelLayout};
use crate::engine::io::TakeEncoder;
use crate::error::Result;

/// Seconds of capture space reserved up front
const PREALLOCATED_SECS: usize = 30;

/// Capture sink for the recording tap
pub trait Recorder {
    /// Begin a new capture, discarding any unfinished one
    fn start(&mut self, layout: ChannelLayout, sample_rate: u32);

    /// Append one planar block; ignored when not capturing
    fn push(&mut self, block: &[&[f32]]);

    /// Finish the capture; `None` if nothing was being captured
    fn stop(&mut self) -> Result<Option<Take>>;

    /// Drop an unfinished capture without producing a take
    fn abort(&mut self);

    fn is_capturing(&self) -> bool;
}

/// Recorder that buffers PCM and encodes it on stop
pub struct TakeRecorder {
    encoder: Box<dyn TakeEncoder + Send>,
    capture: Option<AudioBuffer>,
}

impl TakeRecorder {
    pub fn new(encoder: Box<dyn TakeEncoder + Send>) -> Self {
        Self {
            encoder,
            capture: None,
        }
    }

    /// Frames captured so far in the current take
    pub fn captured_frames(&self) -> usize {
        self.capture.as_ref().map(AudioBuffer::len).unwrap_or(0)
    }
}

impl std::fmt::Debug for TakeRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TakeRecorder")
            .field("mime_type", &self.encoder.mime_type())
            .field("captured_frames", &self.captured_frames())
            .finish()
    }
}

impl Recorder for TakeRecorder {
    fn start(&mut self, layout: ChannelLayout, sample_rate: u32) {
        let mut capture = AudioBuffer::new(0, layout, sample_rate);
        let reserve = sample_rate as usize * PREALLOCATED_SECS;
        for channel in &mut capture.samples {
            channel.reserve(reserve);
        }
        self.capture = Some(capture);
    }

    fn push(&mut self, block: &[&[f32]]) {
        if let Some(capture) = self.capture.as_mut() {
            capture.append(block);
        }
    }

    fn stop(&mut self) -> Result<Option<Take>> {
        let Some(capture) = self.capture.take() else {
            return Ok(None);
        };
        let payload = self.encoder.encode(&capture)?;
        let take = Take::new(
            payload,
            self.encoder.mime_type(),
            capture.sample_rate,
            capture.channels(),
            capture.len(),
        );
        info!(
            "Take {} finalized: {:.2}s, {} bytes",
            take.id,
            take.duration_secs(),
            take.payload.len()
        );
        Ok(Some(take))
    }

    fn abort(&mut self) {
        if let Some(capture) = self.capture.take() {
            debug!("Discarded unfinished take of {} frames", capture.len());
        }
    }

    fn is_capturing(&self) -> bool {
        self.capture.is_some()
    }
}
