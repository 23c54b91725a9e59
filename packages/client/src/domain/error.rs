//! Error types of the direct-message client.

use thiserror::Error;

/// Value object validation errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Thread ID is blank
    #[error("Thread ID must not be empty")]
    EmptyThreadId,

    /// Thread ID contains "/" or is "." / ".."
    #[error("Thread ID '{0}' is not a valid path segment")]
    InvalidThreadId(String),
}

/// Errors from the REST backend (thread lookup and token issuance)
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// No credentials are configured
    #[error("Not authenticated")]
    Unauthenticated,

    /// Credentials were rejected
    #[error("Request was rejected as unauthorized (HTTP {0})")]
    Unauthorized(u16),

    /// Any other non-success status
    #[error("Unexpected HTTP status {0}")]
    Status(u16),

    /// The request could not be sent or completed
    #[error("Request failed: {0}")]
    Request(String),

    /// The response body did not have the expected shape
    #[error("Failed to decode response: {0}")]
    Decode(String),
}

/// Transport-level errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The transport URL could not be built
    #[error("Invalid transport URL: {0}")]
    InvalidUrl(String),

    /// The connection could not be established
    #[error("Connection error: {0}")]
    Connect(String),

    /// The server answered the handshake with a non-upgrade status
    #[error("Handshake rejected with HTTP {0}")]
    Rejected(u16),

    /// An outbound frame could not be serialized
    #[error("Failed to encode frame: {0}")]
    Encode(String),

    /// The transport is already closed
    #[error("Transport is closed")]
    Closed,
}

/// Errors returned to the UI by `send_message`
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SendError {
    /// No live connection; nothing is buffered
    #[error("Not connected")]
    NotConnected,

    /// Blank messages are never sent
    #[error("Message must not be empty")]
    EmptyMessage,

    #[error(transparent)]
    Transport(#[from] TransportError),
}
