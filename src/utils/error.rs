//! Error types and handling
//!
//! Common error types used across the application.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum RecordingError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not open encoder: {0}")]
    EncoderOpen(String),

    #[error("Screen capture failed: {0}")]
    Capture(String),

    #[error("Could not write frame: {0}")]
    EncodeWrite(String),

    #[error("Preview encoding failed: {0}")]
    Preview(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("A recording is already in progress")]
    AlreadyRecording,

    #[error("No recording in progress")]
    NotRecording,

    #[error("Probe failed: {0}")]
    Probe(String),
}

/// Error response for frontend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl From<&RecordingError> for ErrorResponse {
    fn from(error: &RecordingError) -> Self {
        let code = match error {
            RecordingError::Io(_) => "IO_ERROR",
            RecordingError::EncoderOpen(_) => "ENCODER_OPEN_ERROR",
            RecordingError::Capture(_) => "CAPTURE_ERROR",
            RecordingError::EncodeWrite(_) => "ENCODE_WRITE_ERROR",
            RecordingError::Preview(_) => "PREVIEW_ERROR",
            RecordingError::InvalidConfig(_) => "INVALID_CONFIG",
            RecordingError::AlreadyRecording => "ALREADY_RECORDING",
            RecordingError::NotRecording => "NOT_RECORDING",
            RecordingError::Probe(_) => "PROBE_ERROR",
        };

        ErrorResponse {
            code: code.to_string(),
            message: error.to_string(),
        }
    }
}

impl From<RecordingError> for String {
    fn from(e: RecordingError) -> String {
        e.to_string()
    }
}

/// Result type alias using RecordingError
pub type RecordingResult<T> = Result<T, RecordingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_response_carries_code_and_message() {
        let err = RecordingError::EncoderOpen("bad path".into());
        let resp = ErrorResponse::from(&err);
        assert_eq!(resp.code, "ENCODER_OPEN_ERROR");
        assert!(resp.message.contains("bad path"));
    }

    #[test]
    fn stringifies_via_display() {
        let s: String = RecordingError::AlreadyRecording.into();
        assert_eq!(s, "A recording is already in progress");
    }
}
