//! Domain layer: value objects, bounded per-thread state, the reconnect
//! policy and the traits the connection core depends on.

pub mod error;
pub mod gateway;
pub mod message_store;
pub mod model;
pub mod reconnect;
pub mod transport;
pub mod typing_tracker;

pub use error::{DomainError, GatewayError, SendError, TransportError};
pub use gateway::{ConnectionTokenProvider, ThreadInfoLoader};
pub use message_store::{MAX_MESSAGES, MessageStore};
pub use model::{
    ChatSnapshot, ConnectionState, ConnectionToken, ConversationState, Message, MessageId,
    Participant, RetrySchedule, Thread, ThreadId,
};
pub use reconnect::{ReconnectConfig, ReconnectDecision, ReconnectPolicy};
pub use transport::{
    CLOSE_ABNORMAL, CLOSE_NO_STATUS, CLOSE_NORMAL, Transport, TransportCommand,
    TransportConnector, TransportEvent, TransportReceiver, TransportSender,
};
pub use typing_tracker::TypingTracker;

#[cfg(test)]
pub use gateway::{MockConnectionTokenProvider, MockThreadInfoLoader};
