//! Control modes
//!
//! A mode decides which smoothed channel follows the pinch. Modes cycle
//! Pitch -> Volume -> ReverbMix -> Pitch on every toggle gesture.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A smoothed control channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    Pitch,
    Volume,
    ReverbMix,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Pitch, Channel::Volume, Channel::ReverbMix];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            Channel::Pitch => 0,
            Channel::Volume => 1,
            Channel::ReverbMix => 2,
        }
    }
}

/// The currently active control mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ControlMode {
    #[default]
    Pitch,
    Volume,
    ReverbMix,
}

impl ControlMode {
    /// Next mode in the cycle
    pub fn next(self) -> Self {
        match self {
            ControlMode::Pitch => ControlMode::Volume,
            ControlMode::Volume => ControlMode::ReverbMix,
            ControlMode::ReverbMix => ControlMode::Pitch,
        }
    }

    /// Channel that is updated while this mode is active
    pub fn channel(self) -> Channel {
        match self {
            ControlMode::Pitch => Channel::Pitch,
            ControlMode::Volume => Channel::Volume,
            ControlMode::ReverbMix => Channel::ReverbMix,
        }
    }
}

impl fmt::Display for ControlMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlMode::Pitch => write!(f, "pitch"),
            ControlMode::Volume => write!(f, "volume"),
            ControlMode::ReverbMix => write!(f, "reverb"),
        }
    }
}
