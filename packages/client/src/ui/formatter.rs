//! Message formatting utilities for client display.

use tayori_shared::time::rfc3339_to_jst;

use crate::domain::{ChatSnapshot, ConnectionState, Message, Participant, Thread};

const RULE: &str = "============================================================";
const THIN_RULE: &str = "------------------------------------------------------------";

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format the thread header listing all participants
    pub fn format_thread_header(thread: &Thread) -> String {
        let mut output = String::new();
        output.push_str(&format!("\n\n{}\n", RULE));
        output.push_str(&format!("Thread {}\n", thread.id));
        output.push_str("Participants:\n");

        if thread.participants.is_empty() {
            output.push_str("(No participants)\n");
        } else {
            for participant in &thread.participants {
                output.push_str(&format!("{} (id: {})\n", participant.username, participant.id));
            }
        }

        output.push_str(&format!("{}\n", RULE));
        output
    }

    /// Format a received message.
    ///
    /// The sender is shown by username when it is a known participant,
    /// otherwise by raw sender ID.
    pub fn format_message(message: &Message, participants: &[Participant]) -> String {
        let sender = message
            .sender_id
            .as_deref()
            .map(|sender_id| {
                participants
                    .iter()
                    .find(|p| p.id == sender_id)
                    .map_or(sender_id, |p| p.username.as_str())
            })
            .unwrap_or("unknown");
        let sent_at = message
            .sent_at
            .as_deref()
            .map(Self::display_timestamp)
            .unwrap_or_else(|| "-".to_string());

        format!(
            "\n{}\n@{}: {}\nsent at {}\n{}\n",
            THIN_RULE, sender, message.content, sent_at, THIN_RULE
        )
    }

    /// Format the typing line; `None` when nobody is typing
    pub fn format_typing(usernames: &[String]) -> Option<String> {
        match usernames {
            [] => None,
            [one] => Some(format!("{} is typing...", one)),
            many => Some(format!("{} are typing...", many.join(", "))),
        }
    }

    /// Format the connection status line
    pub fn format_status(snapshot: &ChatSnapshot) -> String {
        match (snapshot.status, snapshot.retry) {
            (ConnectionState::Disconnected, Some(retry)) => format!(
                "* connection lost; reconnecting in {}s (attempt {})",
                retry.delay.as_secs(),
                retry.attempt
            ),
            (ConnectionState::Error, _) => format!(
                "* connection failed: {} (type /reconnect to try again)",
                snapshot.error.as_deref().unwrap_or("unknown error")
            ),
            (status, _) => format!("* {}", status),
        }
    }

    /// Format a confirmation message after sending
    pub fn format_sent_confirmation(sent_at: &str) -> String {
        format!("sent at {}\n", sent_at)
    }

    /// Format an error reported by the server or by a failed action
    pub fn format_error(message: &str) -> String {
        format!("! {}\n", message)
    }

    fn display_timestamp(raw: &str) -> String {
        rfc3339_to_jst(raw).unwrap_or_else(|| raw.to_string())
    }
}
