//! Audio Graph Controller
//!
//! Owns the audio graph for one loaded file and is the only thing the
//! control side talks to. It maps control signals onto graph parameters,
//! drives the recording session, and applies the take review policy: the
//! loop keeps running during review and only the monitor is silenced, so
//! ending review never needs a new source.

use std::sync::Arc;

use log::{info, warn};
use uuid::Uuid;

use super::buffer::{AudioBuffer, ChannelLayout};
use super::graph::AudioGraph;
use super::io::{resample_channels, AudioDecoder, WavDecoder, WavEncoder};
use super::params::GraphParams;
use super::sink::AudioSink;
use super::source::SourceTracker;
use crate::config::{AudioConfig, PitchMode};
use crate::error::{PinchError, Result};
use crate::gesture::interpreter::{semitones_to_ratio, ControlSignal};
use crate::session::{Recorder, RecordingSession, RecordingState, Take, TakeRecorder, TakeStore};

const COMPONENT: &str = "audio graph";

pub struct AudioGraphController {
    config: AudioConfig,
    decoder: Box<dyn AudioDecoder + Send>,
    recorder: Box<dyn Recorder + Send>,
    params: GraphParams,
    tracker: SourceTracker,
    graph: Option<AudioGraph>,
    session: RecordingSession,
    takes: TakeStore,
    /// User's mute choice, independent of review silencing
    muted: bool,
}

impl std::fmt::Debug for AudioGraphController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioGraphController")
            .field("initialized", &self.graph.is_some())
            .field("state", &self.session.state())
            .field("muted", &self.muted)
            .field("takes", &self.takes.len())
            .finish()
    }
}

impl AudioGraphController {
    /// Controller with the WAV decoder and a WAV take recorder
    pub fn new(config: &AudioConfig) -> Self {
        Self::with_collaborators(
            config,
            Box::new(WavDecoder::new(config.sample_rate)),
            Box::new(TakeRecorder::new(Box::new(WavEncoder::new(config.take_bit_depth)))),
        )
    }

    pub fn with_collaborators(
        config: &AudioConfig,
        decoder: Box<dyn AudioDecoder + Send>,
        recorder: Box<dyn Recorder + Send>,
    ) -> Self {
        Self {
            config: config.clone(),
            decoder,
            recorder,
            params: GraphParams::default(),
            tracker: SourceTracker::new(),
            graph: None,
            session: RecordingSession::new(),
            takes: TakeStore::new(),
            muted: false,
        }
    }

    // ========================================================================
    // Graph Lifecycle
    // ========================================================================

    /// Build a graph over decoded audio, replacing any existing one
    ///
    /// The old source is stopped before the new one starts, so at most one
    /// loop plays at any time.
    pub fn initialize(&mut self, audio: AudioBuffer) -> Result<()> {
        // `samples` is public, so the channel shape is rechecked here
        let audio = AudioBuffer::from_channels(audio.samples, audio.sample_rate)?;
        if audio.is_empty() {
            return Err(PinchError::EmptyAudio);
        }
        let audio = if audio.sample_rate == self.config.sample_rate {
            audio
        } else {
            let resampled = resample_channels(&audio.samples, audio.sample_rate, self.config.sample_rate);
            AudioBuffer::from_channels(resampled, self.config.sample_rate)?
        };

        self.release_graph();
        self.params.reset();

        let duration = audio.duration_secs();
        let layout = audio.layout();
        let graph = AudioGraph::build(Arc::new(audio), &self.config, self.params.clone(), self.tracker.clone())?;
        self.graph = Some(graph);
        self.session.on_graph_ready();
        self.refresh_monitor();

        info!(
            "Audio graph ready: {:.2}s, {:?} @ {} Hz, pitch mode {:?}",
            duration, layout, self.config.sample_rate, self.config.pitch_mode
        );
        Ok(())
    }

    /// Decode `bytes` and build a graph; the current graph survives a decode failure
    pub fn initialize_from_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        let audio = self.decoder.decode(bytes)?;
        self.initialize(audio)
    }

    /// Release the graph and return to Idle; safe to call repeatedly
    pub fn teardown(&mut self) {
        if self.graph.is_none() && self.session.state() == RecordingState::Idle {
            return;
        }
        self.release_graph();
        self.session.teardown();
        info!("Audio graph torn down");
    }

    fn release_graph(&mut self) {
        if let Some(mut old) = self.graph.take() {
            old.stop();
        }
        if self.recorder.is_capturing() {
            warn!("Graph released mid-recording; unfinished take discarded");
            self.recorder.abort();
            self.session.stop_recording();
        }
        if self.session.end_review() {
            self.refresh_monitor();
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.graph.is_some()
    }

    /// Number of loop sources currently playing
    pub fn active_sources(&self) -> usize {
        self.tracker.active()
    }

    fn require_graph(&self) -> Result<()> {
        if self.graph.is_some() {
            Ok(())
        } else {
            Err(PinchError::NotInitialized { component: COMPONENT })
        }
    }

    // ========================================================================
    // Control
    // ========================================================================

    /// Push a control signal onto the graph parameters
    pub fn apply_control(&mut self, signal: &ControlSignal) -> Result<()> {
        self.require_graph()?;

        let ratio = semitones_to_ratio(signal.pitch_semitones);
        match self.config.pitch_mode {
            PitchMode::Resample => self.params.playback_rate.set(ratio),
            PitchMode::TimePreserving => self.params.pitch_ratio.set(ratio),
        }
        self.params.volume.set(signal.volume_factor);
        let mix = signal.reverb_mix.clamp(0.0, 1.0);
        self.params.dry.set(1.0 - mix);
        self.params.wet.set(mix);
        Ok(())
    }

    /// Flip the monitor mute; returns the new mute state
    ///
    /// Only the monitor gain changes. The recording tap is unaffected.
    pub fn toggle_mute(&mut self) -> Result<bool> {
        self.require_graph()?;
        self.muted = !self.muted;
        self.refresh_monitor();
        info!("Monitor {}", if self.muted { "muted" } else { "unmuted" });
        Ok(self.muted)
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    fn refresh_monitor(&self) {
        let silent = self.muted || self.session.is_reviewing();
        self.params.monitor.set(if silent { 0.0 } else { 1.0 });
    }

    // ========================================================================
    // Recording
    // ========================================================================

    /// Start capturing the recording tap; `Ok(false)` if not allowed now
    pub fn start_recording(&mut self) -> Result<bool> {
        self.require_graph()?;
        if !self.session.start_recording() {
            return Ok(false);
        }
        self.recorder.start(ChannelLayout::Stereo, self.config.sample_rate);
        info!("Recording started");
        Ok(true)
    }

    /// Finish the current take; `Ok(None)` if nothing was recording
    pub fn stop_recording(&mut self) -> Result<Option<Take>> {
        self.require_graph()?;
        if !self.session.stop_recording() {
            return Ok(None);
        }
        let Some(take) = self.recorder.stop()? else {
            return Ok(None);
        };
        self.takes.insert(take.clone());
        Ok(Some(take))
    }

    pub fn recording_state(&self) -> RecordingState {
        self.session.state()
    }

    pub fn takes(&self) -> &TakeStore {
        &self.takes
    }

    pub fn take(&self, id: Uuid) -> Option<&Take> {
        self.takes.get(id)
    }

    /// Drop a take and its payload, ending its review first if it is playing
    pub fn discard_take(&mut self, id: Uuid) -> Result<Take> {
        self.takes.require(id)?;
        if self.session.state() == RecordingState::Reviewing(id) && self.session.end_review() {
            self.refresh_monitor();
        }
        let take = self
            .takes
            .remove(id)
            .ok_or_else(|| PinchError::TakeNotFound { id: id.to_string() })?;
        info!("Discarded take {} ({} bytes)", id, take.payload.len());
        Ok(take)
    }

    // ========================================================================
    // Take Review
    // ========================================================================

    /// Take playback started elsewhere; silence the monitor
    pub fn begin_take_review(&mut self, id: Uuid) -> Result<bool> {
        self.require_graph()?;
        self.takes.require(id)?;
        if !self.session.begin_review(id) {
            return Ok(false);
        }
        self.refresh_monitor();
        info!("Reviewing take {}", id);
        Ok(true)
    }

    /// Take playback ended; restore the user's mute choice
    pub fn end_take_review(&mut self) -> Result<bool> {
        self.require_graph()?;
        if !self.session.end_review() {
            return Ok(false);
        }
        self.refresh_monitor();
        Ok(true)
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    /// Render `frames` frames into `sink`, feeding the recorder while recording
    pub fn render(&mut self, frames: usize, sink: &mut dyn AudioSink) -> Result<usize> {
        let graph = self
            .graph
            .as_mut()
            .ok_or(PinchError::NotInitialized { component: COMPONENT })?;
        let recording = self.session.is_recording();

        let mut remaining = frames;
        while remaining > 0 {
            let block = graph.render(remaining);
            let n = block.frames();
            sink.write(&block.monitor);
            if recording {
                self.recorder.push(&block.tap);
            }
            remaining -= n;
        }
        Ok(frames)
    }

    pub fn params(&self) -> &GraphParams {
        &self.params
    }

    pub fn config(&self) -> &AudioConfig {
        &self.config
    }
}

impl Drop for AudioGraphController {
    fn drop(&mut self) {
        self.teardown();
    }
}
