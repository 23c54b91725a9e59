//! Turns successive snapshots into the lines to print.
//!
//! The snapshot always carries the whole bounded message list; the renderer
//! remembers what it already printed and emits only the difference.

use crate::domain::{ChatSnapshot, ConnectionState, Message, MessageId, Participant, RetrySchedule};

use super::formatter::MessageFormatter;

/// Messages after `last_seen`.
///
/// When `last_seen` is absent from the list (evicted, or the view was
/// reset) every message counts as unseen.
pub fn unseen_messages<'a>(messages: &'a [Message], last_seen: Option<&MessageId>) -> &'a [Message] {
    let Some(last_seen) = last_seen else {
        return messages;
    };
    match messages.iter().rposition(|m| m.id == *last_seen) {
        Some(index) => &messages[index + 1..],
        None => messages,
    }
}

#[derive(Debug, Default)]
pub struct SnapshotRenderer {
    participants: Vec<Participant>,
    last_seen: Option<MessageId>,
    typing: Vec<String>,
    status: ConnectionState,
    retry: Option<RetrySchedule>,
    error: Option<String>,
}

impl SnapshotRenderer {
    pub fn new(participants: Vec<Participant>) -> Self {
        Self {
            participants,
            ..Self::default()
        }
    }

    /// Lines describing what changed since the previous snapshot
    pub fn render(&mut self, snapshot: &ChatSnapshot) -> Vec<String> {
        let mut lines = Vec::new();

        if snapshot.status != self.status || snapshot.retry != self.retry {
            self.status = snapshot.status;
            self.retry = snapshot.retry;
            lines.push(MessageFormatter::format_status(snapshot));
        }

        for message in unseen_messages(&snapshot.messages, self.last_seen.as_ref()) {
            lines.push(MessageFormatter::format_message(message, &self.participants));
        }
        self.last_seen = snapshot.messages.last().map(|m| m.id.clone());

        if snapshot.typing_users != self.typing {
            self.typing = snapshot.typing_users.clone();
            if let Some(line) = MessageFormatter::format_typing(&self.typing) {
                lines.push(line);
            }
        }

        if snapshot.error != self.error {
            self.error = snapshot.error.clone();
            // Terminal errors are already part of the status line
            if snapshot.status != ConnectionState::Error
                && let Some(error) = &self.error
            {
                lines.push(MessageFormatter::format_error(error));
            }
        }

        lines
    }
}
