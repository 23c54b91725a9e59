//! Error types for the CLI client.

use thiserror::Error;

use crate::domain::{DomainError, GatewayError};

/// Client-specific errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// The thread given on the command line is not a valid ID
    #[error("Invalid thread: {0}")]
    InvalidThread(#[from] DomainError),

    /// The REST backend could not be used
    #[error("Backend error: {0}")]
    Gateway(#[from] GatewayError),
}
