//! Bounded table chat.

use std::collections::VecDeque;

use time::OffsetDateTime;

/// Longest accepted message, in characters.
pub const MAX_MESSAGE_CHARS: usize = 280;

/// A posted chat line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub player_name: String,
    pub text: String,
    pub timestamp: OffsetDateTime,
}

/// Keeps the most recent `capacity` messages, oldest first.
#[derive(Debug, Clone)]
pub struct ChatLog {
    messages: VecDeque<ChatMessage>,
    capacity: usize,
}

impl ChatLog {
    /// Log retaining at most `capacity` messages (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            messages: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a message, evicting the oldest when full.
    pub fn push(&mut self, message: ChatMessage) {
        if self.messages.len() == self.capacity {
            self.messages.pop_front();
        }
        self.messages.push_back(message);
    }

    /// The last `count` messages, oldest first.
    pub fn recent(&self, count: usize) -> impl Iterator<Item = &ChatMessage> {
        let skip = self.messages.len().saturating_sub(count);
        self.messages.iter().skip(skip)
    }
}
