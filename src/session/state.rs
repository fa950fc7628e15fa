//! Recording session state machine
//!
//! ```text
//! Idle --graph ready--> Armed <--start/stop--> Recording
//!                         |
//!                         +--review--> Reviewing --end--> Armed
//! any --teardown--> Idle
//! ```
//!
//! Invalid transitions are no-ops that report `false`, never errors.

use std::fmt;

use log::{debug, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordingState {
    /// No audio graph
    #[default]
    Idle,
    /// Graph ready, not capturing
    Armed,
    /// Capturing the recording tap
    Recording,
    /// Playing back a finished take
    Reviewing(Uuid),
}

impl fmt::Display for RecordingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordingState::Idle => write!(f, "Idle"),
            RecordingState::Armed => write!(f, "Armed"),
            RecordingState::Recording => write!(f, "Recording"),
            RecordingState::Reviewing(id) => write!(f, "Reviewing({})", id),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecordingSession {
    state: RecordingState,
}

impl RecordingSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RecordingState {
        self.state
    }

    pub fn is_recording(&self) -> bool {
        self.state == RecordingState::Recording
    }

    pub fn is_reviewing(&self) -> bool {
        matches!(self.state, RecordingState::Reviewing(_))
    }

    /// A graph was built. Only moves Idle to Armed.
    pub fn on_graph_ready(&mut self) -> bool {
        if self.state == RecordingState::Idle {
            self.transition(RecordingState::Armed);
            true
        } else {
            false
        }
    }

    pub fn start_recording(&mut self) -> bool {
        match self.state {
            RecordingState::Armed => {
                self.transition(RecordingState::Recording);
                true
            }
            RecordingState::Recording => {
                debug!("Start recording ignored: already recording");
                false
            }
            other => {
                warn!("Start recording ignored in state {}", other);
                false
            }
        }
    }

    pub fn stop_recording(&mut self) -> bool {
        if self.state == RecordingState::Recording {
            self.transition(RecordingState::Armed);
            true
        } else {
            debug!("Stop recording ignored in state {}", self.state);
            false
        }
    }

    pub fn begin_review(&mut self, take: Uuid) -> bool {
        match self.state {
            RecordingState::Armed => {
                self.transition(RecordingState::Reviewing(take));
                true
            }
            RecordingState::Reviewing(current) => {
                // Switching takes mid-review
                self.transition(RecordingState::Reviewing(take));
                current != take
            }
            other => {
                warn!("Take review ignored in state {}", other);
                false
            }
        }
    }

    pub fn end_review(&mut self) -> bool {
        if self.is_reviewing() {
            self.transition(RecordingState::Armed);
            true
        } else {
            false
        }
    }

    /// Back to Idle from anywhere
    pub fn teardown(&mut self) {
        if self.state != RecordingState::Idle {
            self.transition(RecordingState::Idle);
        }
    }

    fn transition(&mut self, next: RecordingState) {
        debug!("Recording session: {} -> {}", self.state, next);
        self.state = next;
    }
}
