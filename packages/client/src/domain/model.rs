//! Value objects and entities of a direct-message thread.

use std::fmt;
use std::time::Duration;

use super::{DomainError, MessageStore, TypingTracker};

/// Identifier of a direct-message thread
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ThreadId(String);

impl ThreadId {
    /// Create a thread ID, rejecting blank values, path separators and the
    /// `.`/`..` segments (the ID becomes a path segment of the transport URL).
    pub fn new(value: String) -> Result<Self, DomainError> {
        let value = value.trim().to_string();
        if value.is_empty() {
            return Err(DomainError::EmptyThreadId);
        }
        if value.contains('/') || value == "." || value == ".." {
            return Err(DomainError::InvalidThreadId(value));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ThreadId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Server-assigned message identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageId(String);

impl MessageId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A received direct message. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub thread_id: Option<ThreadId>,
    pub sender_id: Option<String>,
    pub content: String,
    /// Server-assigned timestamp, kept verbatim
    pub sent_at: Option<String>,
}

/// A participant of a thread, as reported by the REST backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub id: String,
    pub username: String,
}

/// Thread metadata. Owned by the external loader and read-only here.
#[derive(Debug, Clone, PartialEq)]
pub struct Thread {
    pub id: ThreadId,
    pub participants: Vec<Participant>,
    pub metadata: serde_json::Value,
}

/// Opaque single-use credential for one transport handshake.
///
/// Not `Clone`: building the transport URL consumes it, so a token can
/// never be replayed on a later attempt.
pub struct ConnectionToken(String);

impl ConnectionToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn into_secret(self) -> String {
        self.0
    }
}

impl fmt::Debug for ConnectionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ConnectionToken(<redacted>)")
    }
}

/// Connection status exposed to the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Error,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Error => "error",
        };
        f.write_str(label)
    }
}

/// An armed reconnect timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrySchedule {
    /// 1-based reconnect attempt number
    pub attempt: u32,
    pub delay: Duration,
}

/// Mutable per-thread state owned by the connection task
#[derive(Debug, Clone, Default)]
pub struct ConversationState {
    pub messages: MessageStore,
    pub typing: TypingTracker,
    /// Latest user-visible error (server-pushed or terminal)
    pub error: Option<String>,
}

impl ConversationState {
    pub fn reset(&mut self) {
        self.messages.reset();
        self.typing.reset();
        self.error = None;
    }
}

/// Read-only view of a thread's connection, published to the UI
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatSnapshot {
    pub thread_id: Option<ThreadId>,
    pub messages: Vec<Message>,
    pub typing_users: Vec<String>,
    pub status: ConnectionState,
    pub error: Option<String>,
    pub retry: Option<RetrySchedule>,
}

impl ChatSnapshot {
    pub fn is_connected(&self) -> bool {
        self.status == ConnectionState::Connected
    }
}
