//! Handler error types

use crate::protocol::{ErrorCode, ServerFrame};
use room_core::DomainError;
use room_service::ServiceError;
use thiserror::Error;

/// Handler error type
///
/// Every variant is recoverable: it becomes an `error` frame for the sender
/// and the connection stays open.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Undecodable, unknown or binary frame
    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    /// `join` on a connection that already joined
    #[error("Already joined")]
    AlreadyJoined,

    /// `message` before `join`
    #[error("Not joined")]
    NotJoined,

    #[error("Invalid name: {0}")]
    InvalidName(String),

    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    #[error("Rate limited for {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// Store failure while joining
    #[error("Join failed: {0}")]
    JoinFailed(#[source] ServiceError),

    /// Store failure while posting a message
    #[error("Send failed: {0}")]
    SendFailed(#[source] ServiceError),
}

impl HandlerError {
    /// Map a join failure, keeping name validation distinct from store errors
    pub fn join_failed(err: ServiceError) -> Self {
        match err {
            ServiceError::Domain(DomainError::InvalidName(msg)) => Self::InvalidName(msg),
            other => Self::JoinFailed(other),
        }
    }

    /// Map a send failure, keeping content validation distinct from store errors
    pub fn send_failed(err: ServiceError) -> Self {
        match err {
            ServiceError::Domain(DomainError::InvalidMessage(msg)) => Self::InvalidMessage(msg),
            other => Self::SendFailed(other),
        }
    }

    /// Wire error code for this failure
    pub fn to_error_code(&self) -> ErrorCode {
        match self {
            Self::InvalidName(_) => ErrorCode::InvalidName,
            Self::InvalidMessage(_) => ErrorCode::InvalidMessage,
            Self::NotJoined => ErrorCode::NotJoined,
            Self::RateLimited { .. } => ErrorCode::RateLimit,
            Self::InvalidFrame(_)
            | Self::AlreadyJoined
            | Self::JoinFailed(_)
            | Self::SendFailed(_) => ErrorCode::InternalError,
        }
    }

    /// Text shown to the client; store details stay in the logs
    pub fn client_message(&self) -> String {
        match self {
            Self::InvalidFrame(_) => "Unknown message type".to_string(),
            Self::AlreadyJoined => "Already joined".to_string(),
            Self::NotJoined => "Please join the chat room first".to_string(),
            Self::InvalidName(msg) | Self::InvalidMessage(msg) => msg.clone(),
            Self::RateLimited { retry_after_secs } => {
                format!("Too many messages. Try again in {retry_after_secs} seconds")
            }
            Self::JoinFailed(_) => "Server error. Please try again".to_string(),
            Self::SendFailed(_) => "Failed to send message".to_string(),
        }
    }

    /// Whether this is worth an error-level log line
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::JoinFailed(_) | Self::SendFailed(_))
    }

    /// The `error` frame sent back to the client
    pub fn to_frame(&self) -> ServerFrame {
        ServerFrame::error(self.to_error_code(), self.client_message())
    }
}

/// Handler result type
pub type HandlerResult<T> = Result<T, HandlerError>;
