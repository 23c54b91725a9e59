//! Ephemeral set of usernames currently composing a message.

use std::collections::BTreeSet;

/// Set of typing users. Entries only leave on an explicit stop event or a reset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypingTracker {
    usernames: BTreeSet<String>,
}

impl TypingTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the user was not already typing
    pub fn add(&mut self, username: &str) -> bool {
        self.usernames.insert(username.to_string())
    }

    /// Returns `true` if the user was typing
    pub fn remove(&mut self, username: &str) -> bool {
        self.usernames.remove(username)
    }

    pub fn contains(&self, username: &str) -> bool {
        self.usernames.contains(username)
    }

    pub fn reset(&mut self) {
        self.usernames.clear();
    }

    pub fn len(&self) -> usize {
        self.usernames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.usernames.is_empty()
    }

    /// Usernames in lexical order
    pub fn usernames(&self) -> Vec<String> {
        self.usernames.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_is_idempotent() {
        // テスト項目: 同じユーザーを複数回追加しても重複しない
        // given (前提条件):
        let mut tracker = TypingTracker::new();

        // when (操作):
        let first = tracker.add("alice");
        let second = tracker.add("alice");

        // then (期待する結果):
        assert!(first);
        assert!(!second);
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn test_toggle_true_then_false_empties_entry() {
        // テスト項目: 入力中 true → false でユーザーのエントリが消える
        // given (前提条件):
        let mut tracker = TypingTracker::new();
        tracker.add("alice");

        // when (操作):
        let removed = tracker.remove("alice");

        // then (期待する結果):
        assert!(removed);
        assert!(!tracker.contains("alice"));
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_remove_unknown_user_is_noop() {
        // テスト項目: 入力中でないユーザーの削除は何もしない
        // given (前提条件):
        let mut tracker = TypingTracker::new();
        tracker.add("bob");

        // when (操作):
        let removed = tracker.remove("alice");

        // then (期待する結果):
        assert!(!removed);
        assert_eq!(tracker.usernames(), ["bob"]);
    }

    #[test]
    fn test_usernames_are_sorted_and_reset_clears() {
        // テスト項目: ユーザー名がソート済みで返され、reset で空になる
        // given (前提条件):
        let mut tracker = TypingTracker::new();
        tracker.add("charlie");
        tracker.add("alice");

        // when (操作):
        let names = tracker.usernames();
        tracker.reset();

        // then (期待する結果):
        assert_eq!(names, ["alice", "charlie"]);
        assert!(tracker.is_empty());
    }
}
