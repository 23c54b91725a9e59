//! WebSocket frame DTOs.
//!
//! Inbound frames are discriminated by `event`, outbound frames by `type`.

use serde::{Deserialize, Serialize};

use super::string_or_number;

/// Server → client frame
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum InboundFrame {
    NewMessage {
        message: MessagePayload,
    },
    Typing {
        #[serde(rename = "userId", default, deserialize_with = "string_or_number::optional")]
        user_id: Option<String>,
        username: String,
        #[serde(rename = "isTyping")]
        is_typing: bool,
    },
    Error {
        message: String,
    },
    Pong,
    /// Any event kind this client does not know yet
    #[serde(other)]
    Unknown,
}

/// Message body of a `new_message` frame
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MessagePayload {
    #[serde(deserialize_with = "string_or_number::required")]
    pub id: String,
    #[serde(rename = "threadId", default, deserialize_with = "string_or_number::optional")]
    pub thread_id: Option<String>,
    #[serde(rename = "senderId", default, deserialize_with = "string_or_number::optional")]
    pub sender_id: Option<String>,
    pub content: String,
    #[serde(rename = "sentAt", default, deserialize_with = "string_or_number::optional")]
    pub sent_at: Option<String>,
}

/// Client → server frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundFrame {
    Ping,
    SendMessage { content: String },
    Typing { is_typing: bool },
}
