//! UseCase: 受信フレームの振り分け
//!
//! `event` フィールドでフレームを判別し、MessageStore / TypingTracker /
//! エラー表示スロットに反映します。1 フレームのパース失敗は呼び出し側で
//! ログ出力してスキップされ、接続には影響しません。

use thiserror::Error;

use crate::{
    domain::{ConversationState, DomainError, Message, ThreadId},
    infrastructure::dto::websocket::InboundFrame,
};

/// Errors for a single inbound frame
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Invalid message payload: {0}")]
    InvalidMessage(#[from] DomainError),
}

/// What a frame did to the conversation state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A message was stored; `evicted` older ones were dropped
    MessageAppended { evicted: usize },
    /// The message belongs to another thread
    ForeignMessage,
    /// Typing set was updated (`changed` is false for redundant events)
    TypingUpdated { changed: bool },
    /// A server-pushed error is now in the error slot
    ServerError,
    /// Heartbeat acknowledgment
    Pong,
    /// Unrecognized event kind
    Ignored,
}

impl DispatchOutcome {
    /// Whether the snapshot needs to be republished
    pub fn changes_state(&self) -> bool {
        match self {
            Self::MessageAppended { .. } | Self::ServerError => true,
            Self::TypingUpdated { changed } => *changed,
            Self::ForeignMessage | Self::Pong | Self::Ignored => false,
        }
    }
}

/// Routes inbound frames of one thread
#[derive(Debug, Clone)]
pub struct EventDispatcher {
    thread_id: ThreadId,
}

impl EventDispatcher {
    pub fn new(thread_id: ThreadId) -> Self {
        Self { thread_id }
    }

    pub fn dispatch(
        &self,
        raw: &str,
        state: &mut ConversationState,
    ) -> Result<DispatchOutcome, DispatchError> {
        let frame: InboundFrame = serde_json::from_str(raw)?;

        let outcome = match frame {
            InboundFrame::NewMessage { message } => {
                let message = Message::try_from(message)?;
                if message
                    .thread_id
                    .as_ref()
                    .is_some_and(|id| *id != self.thread_id)
                {
                    tracing::debug!(
                        "Dropping message '{}' addressed to another thread",
                        message.id.as_str()
                    );
                    return Ok(DispatchOutcome::ForeignMessage);
                }
                let evicted = state.messages.append(message);
                DispatchOutcome::MessageAppended { evicted }
            }
            InboundFrame::Typing {
                username,
                is_typing,
                ..
            } => {
                let changed = if is_typing {
                    state.typing.add(&username)
                } else {
                    state.typing.remove(&username)
                };
                DispatchOutcome::TypingUpdated { changed }
            }
            InboundFrame::Error { message } => {
                tracing::warn!("Server reported an error: {}", message);
                state.error = Some(message);
                DispatchOutcome::ServerError
            }
            InboundFrame::Pong => {
                tracing::trace!("Heartbeat acknowledged");
                DispatchOutcome::Pong
            }
            InboundFrame::Unknown => {
                tracing::debug!("Ignoring unrecognized event");
                DispatchOutcome::Ignored
            }
        };

        Ok(outcome)
    }
}
