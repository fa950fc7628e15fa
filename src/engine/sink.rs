//! Audio output sinks
//!
//! The graph hands each rendered monitor block to an [`AudioSink`]. A real
//! output device implements this trait; the sinks here collect or discard
//! audio for offline rendering and tests.

use super::buffer::{AudioBuffer, ChannelLayout};

/// Destination for monitor blocks
pub trait AudioSink {
    /// Accept one planar block (one slice per channel, equal lengths)
    fn write(&mut self, block: &[&[f32]]);
}

/// Sink that accumulates everything written to it
#[derive(Debug, Clone)]
pub struct BufferSink {
    buffer: AudioBuffer,
}

impl BufferSink {
    pub fn new(layout: ChannelLayout, sample_rate: u32) -> Self {
        Self {
            buffer: AudioBuffer::new(0, layout, sample_rate),
        }
    }

    pub fn buffer(&self) -> &AudioBuffer {
        &self.buffer
    }

    pub fn into_buffer(self) -> AudioBuffer {
        self.buffer
    }
}

impl AudioSink for BufferSink {
    fn write(&mut self, block: &[&[f32]]) {
        self.buffer.append(block);
    }
}

/// Sink that drops all audio
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl AudioSink for NullSink {
    fn write(&mut self, _block: &[&[f32]]) {}
}
