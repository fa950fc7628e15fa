//! Camera and landmark collaborators
//!
//! Both are external: the crate only depends on these traits. A real
//! deployment wraps a camera API and a hand-landmark model; tests and the
//! CLI use the scripted implementations in [`crate::sim`].

use std::time::Duration;

use crate::error::Result;
use crate::gesture::landmarks::HandLandmarks;

/// Metadata of one captured video frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoFrame {
    pub width: u32,
    pub height: u32,
    /// Capture time relative to the session start
    pub timestamp: Duration,
}

impl VideoFrame {
    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0 {
            return 1.0;
        }
        self.width as f32 / self.height as f32
    }
}

/// A camera stream
pub trait VideoSource {
    /// Acquire the device; fails with `PinchError::Device`
    fn open(&mut self) -> Result<()>;

    /// Latest frame, or `None` when nothing new is ready
    fn grab(&mut self, now: Duration) -> Option<VideoFrame>;

    /// Release the device. Must tolerate being called more than once.
    fn release(&mut self);
}

/// A per-frame hand landmark detector
pub trait LandmarkSource {
    /// Landmarks of at most one hand in `frame`
    fn detect(&mut self, frame: &VideoFrame, timestamp: Duration) -> Option<HandLandmarks>;

    /// Close the detector session. Must tolerate being called more than once.
    fn close(&mut self);
}
