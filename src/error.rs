//! Error handling for Louder
//!
//! Errors only surface on setup and offline paths. The block pipeline
//! itself never fails.

use thiserror::Error;

/// Result type alias for Louder operations
pub type Result<T> = std::result::Result<T, LouderError>;

/// Main error type for Louder operations
#[derive(Error, Debug)]
pub enum LouderError {
    // Parameter Errors
    #[error("Unknown parameter: {name}")]
    UnknownParameter { name: String },

    #[error("Invalid value for parameter '{param}': {value} (expected {expected})")]
    InvalidParameter {
        param: String,
        value: String,
        expected: String,
    },

    // Configuration Errors
    #[error("Invalid processing configuration: {reason}")]
    InvalidConfig { reason: String },

    // Audio Errors
    #[error("Invalid audio: {reason}")]
    InvalidAudio { reason: String },

    #[error("Unsupported audio format: {format}")]
    UnsupportedFormat { format: String },

    #[error("Audio contains no samples")]
    EmptyAudio,

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl LouderError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            LouderError::UnknownParameter { .. } => "UNKNOWN_PARAMETER",
            LouderError::InvalidParameter { .. } => "INVALID_PARAMETER",
            LouderError::InvalidConfig { .. } => "INVALID_CONFIG",
            LouderError::InvalidAudio { .. } => "INVALID_AUDIO",
            LouderError::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            LouderError::EmptyAudio => "EMPTY_AUDIO",
            LouderError::Io(_) => "IO_ERROR",
            LouderError::Wav(_) => "WAV_ERROR",
            LouderError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    pub(crate) fn invalid_param(param: &str, value: impl ToString, expected: &str) -> Self {
        LouderError::InvalidParameter {
            param: param.to_string(),
            value: value.to_string(),
            expected: expected.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = LouderError::UnknownParameter {
            name: "gain".to_string(),
        };
        assert_eq!(err.error_code(), "UNKNOWN_PARAMETER");
        assert_eq!(LouderError::EmptyAudio.error_code(), "EMPTY_AUDIO");
    }

    #[test]
    fn test_invalid_param_message() {
        let err = LouderError::invalid_param("drive", "abc", "a number");
        assert_eq!(
            err.to_string(),
            "Invalid value for parameter 'drive': abc (expected a number)"
        );
    }
}
