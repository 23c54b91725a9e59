//! REST collaborator traits
//!
//! The connection core only needs two things from the backend: thread
//! metadata and a fresh connection token per attempt. Concrete
//! implementations live in the infrastructure layer.

use async_trait::async_trait;

use super::{ConnectionToken, GatewayError, Thread, ThreadId};

/// Thread metadata lookup
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ThreadInfoLoader: Send + Sync {
    async fn load_thread(&self, thread_id: &ThreadId) -> Result<Thread, GatewayError>;
}

/// Issues single-use connection tokens
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConnectionTokenProvider: Send + Sync {
    /// Whether credentials are available. Connecting is a no-op otherwise.
    fn is_authenticated(&self) -> bool;

    /// Issue a token for exactly one handshake
    async fn issue_token(&self, thread_id: &ThreadId) -> Result<ConnectionToken, GatewayError>;
}
