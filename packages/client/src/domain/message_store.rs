//! 受信メッセージのバッファ
//!
//! 受信順（サーバーが順序の権威）で保持し、上限を超えた分は先頭から破棄します。
//! タイムスタンプによる並べ替えは行いません。

use std::collections::VecDeque;

use super::Message;

/// Maximum number of messages kept per thread
pub const MAX_MESSAGES: usize = 100;

/// Bounded, append-only message buffer (FIFO eviction)
#[derive(Debug, Clone)]
pub struct MessageStore {
    messages: VecDeque<Message>,
    capacity: usize,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::with_capacity(MAX_MESSAGES)
    }

    /// Create a store with a custom capacity (at least 1)
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            messages: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append to the tail, evicting from the head past capacity.
    ///
    /// Returns the number of evicted messages.
    pub fn append(&mut self, message: Message) -> usize {
        self.messages.push_back(message);
        let mut evicted = 0;
        while self.messages.len() > self.capacity {
            self.messages.pop_front();
            evicted += 1;
        }
        evicted
    }

    pub fn reset(&mut self) {
        self.messages.clear();
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    pub fn to_vec(&self) -> Vec<Message> {
        self.messages.iter().cloned().collect()
    }
}

impl Default for MessageStore {
    fn default() -> Self {
        Self::new()
    }
}
