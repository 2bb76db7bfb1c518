//! Shared error type across forumpulse crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Invalid input / malformed envelope.
    BadRequest,
    /// Session token resolution failed.
    AuthFailed,
    /// Send attempted on a connection that is no longer open.
    ConnectionClosed,
    /// A connection's outbound queue is full.
    QueueOverflow,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in logs and HTTP responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::AuthFailed => "AUTH_FAILED",
            ClientCode::ConnectionClosed => "CONNECTION_CLOSED",
            ClientCode::QueueOverflow => "QUEUE_OVERFLOW",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, HubError>;

/// Unified error type used by the core protocol and the hub.
///
/// Nothing here is fatal to the process: every variant is local to a single
/// connection or a single send, and recoverable by the caller reconnecting.
#[derive(Debug, Error)]
pub enum HubError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("auth failed")]
    AuthFailed,
    #[error("connection closed")]
    ConnectionClosed,
    #[error("outbound queue overflow")]
    QueueOverflow,
    #[error("internal: {0}")]
    Internal(String),
}

impl HubError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            HubError::BadRequest(_) => ClientCode::BadRequest,
            HubError::AuthFailed => ClientCode::AuthFailed,
            HubError::ConnectionClosed => ClientCode::ConnectionClosed,
            HubError::QueueOverflow => ClientCode::QueueOverflow,
            HubError::Internal(_) => ClientCode::Internal,
        }
    }
}
