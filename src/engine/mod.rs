//! Audio Engine Module
//!
//! Playback and capture side of Pinchwave:
//! - Audio buffer and WAV decode/encode
//! - Looping source and the processing graph
//! - Lock-free parameters shared with the control side
//! - The controller that owns it all

pub mod buffer;
pub mod controller;
pub mod graph;
pub mod io;
pub mod params;
pub mod sink;
pub mod source;

pub use buffer::{generate_test_tone, AudioBuffer, ChannelLayout, DEFAULT_SAMPLE_RATE};
pub use controller::AudioGraphController;
pub use graph::{AudioGraph, RenderedBlock};
pub use io::{AudioDecoder, TakeEncoder, WavDecoder, WavEncoder};
pub use params::{GraphParams, SharedParam};
pub use sink::{AudioSink, BufferSink, NullSink};
pub use source::{LoopSource, SourceState, SourceTracker};
