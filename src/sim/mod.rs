//! Simulated Hand
//!
//! Synthetic landmark poses and scripted performances standing in for a
//! camera and a landmark model. Used by the CLI and the test suite.

pub mod pose;
pub mod script;

pub use script::{scripted_hand, GestureScript, Keyframe, Pose, ScriptedCamera, ScriptedLandmarks};
