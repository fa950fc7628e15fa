//! Pinchwave - Gesture-Controlled Audio
//!
//! Pinchwave loops an audio file and bends it with one hand: the distance
//! between thumb and index fingertip drives pitch, volume or reverb mix,
//! and an open-hand gesture cycles which of the three is active.
//!
//! # Architecture
//!
//! - `control`: camera and landmark interfaces, polled gesture loop
//! - `gesture`: landmarks in, smoothed control signals out
//! - `engine`: looping source, effects graph and its controller
//! - `session`: recording tap capture, takes, offline rendering
//! - `sim`: scripted hand for offline runs and tests

pub mod cli;
pub mod config;
pub mod control;
pub mod dsp;
pub mod engine;
pub mod error;
pub mod gesture;
pub mod session;
pub mod sim;

pub use config::PinchConfig;
pub use engine::AudioGraphController;
pub use error::{PinchError, Result};
pub use gesture::{ControlSignal, GestureInterpreter};
