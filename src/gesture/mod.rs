//! Gesture Interpretation Module
//!
//! Converts per-frame hand landmarks into smoothed, mode-aware control
//! signals:
//! - Landmark frames and frame-relative geometry
//! - Pinch-range calibration
//! - Per-channel smoothing
//! - Debounced open-hand mode toggling

pub mod calibration;
pub mod interpreter;
pub mod landmarks;
pub mod mode;
pub mod smoothing;
pub mod toggle;

pub use calibration::CalibrationState;
pub use interpreter::{semitones_to_ratio, ControlSignal, GestureInterpreter, RawChannels};
pub use landmarks::{Frame, HandLandmarks, Point};
pub use mode::{Channel, ControlMode};
pub use smoothing::SmoothingState;
pub use toggle::{GestureState, ToggleRules};
