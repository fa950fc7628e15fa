//! Shared graph parameters
//!
//! The control side and the render path share only scalar parameters.
//! Each one is an `f32` stored as bits in an `AtomicU32`; reads and writes
//! are relaxed since a block picking up a value one block late is fine.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// A single lock-free `f32` parameter
#[derive(Debug, Clone)]
pub struct SharedParam(Arc<AtomicU32>);

impl SharedParam {
    pub fn new(value: f32) -> Self {
        Self(Arc::new(AtomicU32::new(value.to_bits())))
    }

    #[inline]
    pub fn get(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    #[inline]
    pub fn set(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }
}

/// Every parameter the controller can change on a live graph
///
/// Cloning shares the underlying atomics, so the graph and the controller
/// each hold a handle to the same values.
#[derive(Debug, Clone)]
pub struct GraphParams {
    /// Loop source playback rate (resample pitch mode)
    pub playback_rate: SharedParam,
    /// Pitch shifter ratio (time-preserving pitch mode)
    pub pitch_ratio: SharedParam,
    pub volume: SharedParam,
    pub dry: SharedParam,
    pub wet: SharedParam,
    /// Monitor output gain, 0 when muted or reviewing a take
    pub monitor: SharedParam,
}

impl Default for GraphParams {
    fn default() -> Self {
        Self {
            playback_rate: SharedParam::new(1.0),
            pitch_ratio: SharedParam::new(1.0),
            volume: SharedParam::new(1.0),
            dry: SharedParam::new(1.0),
            wet: SharedParam::new(0.0),
            monitor: SharedParam::new(1.0),
        }
    }
}

impl GraphParams {
    /// Restore the neutral values a fresh graph starts from
    pub fn reset(&self) {
        self.playback_rate.set(1.0);
        self.pitch_ratio.set(1.0);
        self.volume.set(1.0);
        self.dry.set(1.0);
        self.wet.set(0.0);
    }
}
