//! Errors raised while bridging actions to the messaging client.

use serde_json::{json, Value as JsonValue};
use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, ValidationError};

#[derive(Debug, Clone, Error)]
pub enum PusherError {
    /// An intent needed a client but none has been constructed.
    #[error("No messaging client; dispatch a connect action first")]
    NotConnected,

    #[error("Invalid channel: {0}")]
    InvalidChannel(#[from] ValidationError),

    /// The messaging client could not be constructed or reached.
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Transport error: {0}")]
    Transport(String),

    /// The dispatch pipeline no longer accepts actions.
    #[error("Action pipeline closed")]
    PipelineClosed,
}

impl PusherError {
    pub fn connection(message: impl Into<String>) -> Self {
        PusherError::Connection(message.into())
    }

    pub fn transport(message: impl Into<String>) -> Self {
        PusherError::Transport(message.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            PusherError::NotConnected => ErrorCode::NotConnected,
            PusherError::InvalidChannel(_) => ErrorCode::ValidationFailed,
            PusherError::Connection(_) => ErrorCode::ConnectionFailed,
            PusherError::Transport(_) => ErrorCode::TransportError,
            PusherError::PipelineClosed => ErrorCode::PipelineClosed,
        }
    }

    /// JSON form used as the payload of a connection-error action.
    pub fn to_payload(&self) -> JsonValue {
        json!({
            "code": self.code().to_string(),
            "message": self.to_string(),
        })
    }
}

impl From<PusherError> for DomainError {
    fn from(err: PusherError) -> Self {
        DomainError::new(err.code(), err.to_string())
    }
}

impl From<redis::RedisError> for PusherError {
    fn from(err: redis::RedisError) -> Self {
        if err.is_connection_refusal() || err.is_connection_dropped() || err.is_timeout() {
            PusherError::Connection(err.to_string())
        } else {
            PusherError::Transport(err.to_string())
        }
    }
}
