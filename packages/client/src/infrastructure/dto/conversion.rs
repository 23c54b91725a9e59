//! Conversion logic between DTOs and domain entities.

use crate::domain::{
    ConnectionToken, DomainError, Message, MessageId, Participant, Thread, ThreadId,
};
use crate::infrastructure::dto::{http, websocket as dto};

// ========================================
// DTO → Domain Entity
// ========================================

impl TryFrom<dto::MessagePayload> for Message {
    type Error = DomainError;

    fn try_from(dto: dto::MessagePayload) -> Result<Self, Self::Error> {
        Ok(Self {
            id: MessageId::new(dto.id),
            thread_id: dto.thread_id.map(ThreadId::new).transpose()?,
            sender_id: dto.sender_id,
            content: dto.content,
            sent_at: dto.sent_at,
        })
    }
}

impl From<http::ParticipantResponse> for Participant {
    fn from(dto: http::ParticipantResponse) -> Self {
        Self {
            id: dto.id,
            username: dto.username,
        }
    }
}

impl TryFrom<http::ThreadResponse> for Thread {
    type Error = DomainError;

    fn try_from(dto: http::ThreadResponse) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ThreadId::new(dto.id)?,
            participants: dto.participants.into_iter().map(Into::into).collect(),
            metadata: dto.metadata,
        })
    }
}

impl From<http::TokenResponse> for ConnectionToken {
    fn from(dto: http::TokenResponse) -> Self {
        ConnectionToken::new(dto.token)
    }
}
