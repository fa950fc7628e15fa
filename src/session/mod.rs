//! Recording Session
//!
//! Capture of the recording tap into takes, the state machine that governs
//! when capture and take review are allowed, and offline rendering of a
//! whole performance.

pub mod offline;
pub mod recorder;
pub mod state;
pub mod take;

pub use offline::{OfflineReport, OfflineSession, RecordWindow};
pub use recorder::{Recorder, TakeRecorder};
pub use state::{RecordingSession, RecordingState};
pub use take::{payload_digest, Take, TakeStore};
