//! Gesture Control Module
//!
//! External camera/landmark interfaces and the cooperative per-frame task
//! that feeds the interpreter.

pub mod source;
pub mod task;

pub use source::{LandmarkSource, VideoFrame, VideoSource};
pub use task::{ControlLoop, StopToken, TickOutcome};
