//! Error handling for Pinchwave
//!
//! Every error that reaches the caller is meant to be shown as a status
//! line; nothing here is retried automatically.

use thiserror::Error;

/// Result type alias for Pinchwave operations
pub type Result<T> = std::result::Result<T, PinchError>;

/// Main error type for Pinchwave operations
#[derive(Error, Debug)]
pub enum PinchError {
    // Input audio
    #[error("Could not decode input audio: {reason}")]
    Decode {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Unsupported audio format: {format}")]
    UnsupportedFormat { format: String },

    #[error("Audio contains no samples")]
    EmptyAudio,

    // Camera / landmark session
    #[error("Camera unavailable: {reason}")]
    Device { reason: String },

    // Lifecycle misuse
    #[error("{component} is not initialized")]
    NotInitialized { component: &'static str },

    // Takes
    #[error("Take not found: {id}")]
    TakeNotFound { id: String },

    #[error("Could not encode take: {reason}")]
    Encode { reason: String },

    // Configuration
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("Invalid gesture script: {reason}")]
    InvalidScript { reason: String },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PinchError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            PinchError::Decode { .. } => "DECODE_ERROR",
            PinchError::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            PinchError::EmptyAudio => "EMPTY_AUDIO",
            PinchError::Device { .. } => "DEVICE_ERROR",
            PinchError::NotInitialized { .. } => "NOT_INITIALIZED",
            PinchError::TakeNotFound { .. } => "TAKE_NOT_FOUND",
            PinchError::Encode { .. } => "ENCODE_ERROR",
            PinchError::InvalidConfig { .. } => "INVALID_CONFIG",
            PinchError::InvalidScript { .. } => "INVALID_SCRIPT",
            PinchError::Io(_) => "IO_ERROR",
            PinchError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Check if the user can recover by picking another input or retrying by hand
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            PinchError::Decode { .. }
                | PinchError::UnsupportedFormat { .. }
                | PinchError::EmptyAudio
                | PinchError::Device { .. }
                | PinchError::TakeNotFound { .. }
        )
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            PinchError::Decode { .. } => vec![
                "Check that the file plays in another application",
                "Try converting the file to WAV first",
            ],
            PinchError::UnsupportedFormat { .. } => vec![
                "Use a mono or stereo WAV file",
                "Supported sample formats: 8/16/24/32-bit integer, 32-bit float",
            ],
            PinchError::EmptyAudio => vec!["Load a file that contains audio"],
            PinchError::Device { .. } => vec![
                "Check that no other application is using the camera",
                "Grant camera permission and start gesture control again",
            ],
            PinchError::NotInitialized { .. } => vec!["Load an audio file first"],
            PinchError::TakeNotFound { .. } => vec!["Record a new take"],
            _ => vec![],
        }
    }

    /// Shorthand for a decode failure that wraps another error
    pub(crate) fn decode<E>(reason: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        PinchError::Decode {
            reason: reason.into(),
            source: Some(Box::new(source)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = PinchError::NotInitialized {
            component: "audio graph",
        };
        assert_eq!(err.error_code(), "NOT_INITIALIZED");
        assert_eq!(err.to_string(), "audio graph is not initialized");
    }

    #[test]
    fn test_recovery_suggestions() {
        let err = PinchError::Device {
            reason: "permission denied".to_string(),
        };
        assert!(!err.recovery_suggestions().is_empty());
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_decode_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::InvalidData, "bad header");
        let err = PinchError::decode("not a RIFF file", io);
        assert!(std::error::Error::source(&err).is_some());
        assert!(!PinchError::InvalidConfig { reason: "x".into() }.is_recoverable());
    }
}
