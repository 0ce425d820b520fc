//! Error types shared across the bridge.

use std::error::Error;
use std::fmt;
use thiserror::Error;

/// Rejection of a value that cannot become a domain value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },
}

impl ValidationError {
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }
}

/// Stable codes carried in error payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ValidationFailed,
    NotConnected,
    ConnectionFailed,
    TransportError,
    PipelineClosed,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::NotConnected => "NOT_CONNECTED",
            ErrorCode::ConnectionFailed => "CONNECTION_FAILED",
            ErrorCode::TransportError => "TRANSPORT_ERROR",
            ErrorCode::PipelineClosed => "PIPELINE_CLOSED",
        };
        write!(f, "{}", s)
    }
}

/// A coded error, rendered as `[CODE] message`.
#[derive(Debug, Clone)]
pub struct DomainError {
    pub code: ErrorCode,
    pub message: String,
}

impl DomainError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl Error for DomainError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_field_names_the_field() {
        let err = ValidationError::empty_field("channel");
        assert_eq!(err.to_string(), "Field 'channel' cannot be empty");
    }

    #[test]
    fn domain_error_displays_code_and_message() {
        let err = DomainError::new(ErrorCode::NotConnected, "No client");
        assert_eq!(err.to_string(), "[NOT_CONNECTED] No client");
    }

    #[test]
    fn error_codes_render_screaming_case() {
        assert_eq!(ErrorCode::PipelineClosed.to_string(), "PIPELINE_CLOSED");
        assert_eq!(ErrorCode::ConnectionFailed.to_string(), "CONNECTION_FAILED");
    }
}
