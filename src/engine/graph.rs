//! Audio Graph
//!
//! ```text
//! loop source -> volume -> [pitch shifter] -+-> dry gain ----------+-> tap -> monitor gain -> output
//!                                           +-> reverb -> wet gain +
//! ```
//!
//! The tap carries the mixed signal before the monitor gain, so muting the
//! monitor never changes what gets recorded. The pitch shifter is present
//! only in time-preserving pitch mode; otherwise pitch follows the source
//! playback rate.

use std::sync::Arc;

use super::buffer::AudioBuffer;
use super::params::GraphParams;
use super::source::{LoopSource, SourceTracker};
use crate::config::{AudioConfig, PitchMode};
use crate::dsp::{apply_gain, PitchShifter, Reverb, StereoProcessor};
use crate::error::{PinchError, Result};

/// One rendered block, borrowed from the graph's scratch buffers
#[derive(Debug)]
pub struct RenderedBlock<'a> {
    /// Output after the monitor gain
    pub monitor: [&'a [f32]; 2],
    /// Output before the monitor gain
    pub tap: [&'a [f32]; 2],
}

impl RenderedBlock<'_> {
    pub fn frames(&self) -> usize {
        self.tap[0].len()
    }
}

#[derive(Debug)]
struct Scratch {
    left: Vec<f32>,
    right: Vec<f32>,
}

impl Scratch {
    fn new(block_size: usize) -> Self {
        Self {
            left: vec![0.0; block_size],
            right: vec![0.0; block_size],
        }
    }
}

/// A built processing graph around one loop source
#[derive(Debug)]
pub struct AudioGraph {
    source: LoopSource,
    reverb: Reverb,
    pitch: Option<PitchShifter>,
    params: GraphParams,
    block_size: usize,
    sample_rate: u32,
    // dry path doubles as the mix bus
    mix: Scratch,
    wet: Scratch,
    monitor: Scratch,
}

impl AudioGraph {
    /// Build a graph over `audio` and start its source
    ///
    /// # Arguments
    /// * `audio` - Decoded audio at the configured sample rate
    /// * `params` - Handle to the parameters the controller writes
    /// * `tracker` - Live-source counter shared across graphs
    pub fn build(
        audio: Arc<AudioBuffer>,
        config: &AudioConfig,
        params: GraphParams,
        tracker: SourceTracker,
    ) -> Result<Self> {
        if config.block_size == 0 {
            return Err(PinchError::InvalidConfig {
                reason: "block_size must be at least 1".to_string(),
            });
        }
        let reverb = Reverb::new(config.sample_rate, config.reverb_room_size, config.reverb_damping)?;
        let pitch = match config.pitch_mode {
            PitchMode::Resample => None,
            PitchMode::TimePreserving => Some(PitchShifter::new(config.sample_rate)?),
        };

        let mut source = LoopSource::new(audio, tracker);
        source.start();

        Ok(Self {
            source,
            reverb,
            pitch,
            params,
            block_size: config.block_size,
            sample_rate: config.sample_rate,
            mix: Scratch::new(config.block_size),
            wet: Scratch::new(config.block_size),
            monitor: Scratch::new(config.block_size),
        })
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn source(&self) -> &LoopSource {
        &self.source
    }

    pub fn has_pitch_shifter(&self) -> bool {
        self.pitch.is_some()
    }

    /// Stop the source; the graph renders silence afterwards
    pub fn stop(&mut self) {
        self.source.stop();
    }

    /// Render up to one block
    ///
    /// `frames` is capped at the block size. Nothing here allocates.
    pub fn render(&mut self, frames: usize) -> RenderedBlock<'_> {
        let n = frames.min(self.block_size);
        let mix_l = &mut self.mix.left[..n];
        let mix_r = &mut self.mix.right[..n];

        let rate = match self.pitch {
            Some(_) => 1.0,
            None => self.params.playback_rate.get(),
        };
        self.source.render(rate, mix_l, mix_r);
        apply_gain(mix_l, mix_r, self.params.volume.get());

        if let Some(pitch) = self.pitch.as_mut() {
            pitch.set_ratio(self.params.pitch_ratio.get());
            pitch.process(mix_l, mix_r);
        }

        // Wet path
        let wet_l = &mut self.wet.left[..n];
        let wet_r = &mut self.wet.right[..n];
        wet_l.copy_from_slice(mix_l);
        wet_r.copy_from_slice(mix_r);
        self.reverb.process(wet_l, wet_r);

        // Recombine into the tap
        let dry = self.params.dry.get();
        let wet = self.params.wet.get();
        for (m, w) in mix_l.iter_mut().zip(wet_l.iter()) {
            *m = *m * dry + *w * wet;
        }
        for (m, w) in mix_r.iter_mut().zip(wet_r.iter()) {
            *m = *m * dry + *w * wet;
        }

        // Monitor path
        let mon_l = &mut self.monitor.left[..n];
        let mon_r = &mut self.monitor.right[..n];
        let monitor = self.params.monitor.get();
        for (o, m) in mon_l.iter_mut().zip(mix_l.iter()) {
            *o = *m * monitor;
        }
        for (o, m) in mon_r.iter_mut().zip(mix_r.iter()) {
            *o = *m * monitor;
        }

        RenderedBlock {
            monitor: [&self.monitor.left[..n], &self.monitor.right[..n]],
            tap: [&self.mix.left[..n], &self.mix.right[..n]],
        }
    }
}
