//! Message history tracking for debugging and diagnostics.

use std::collections::{HashMap, VecDeque};
use std::time::Instant;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Direction of a recorded message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageType {
    Send,
    Receive,
}

/// A recorded message in the history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub msg_type: MessageType,
    /// `service.method` the message addresses
    pub command: String,
    pub message: Value,
    /// Seconds since history creation
    pub timestamp: f64,
}

/// Bounded log of the messages exchanged with one bulb.
#[derive(Debug, Clone)]
pub struct MessageHistory {
    latest: HashMap<(MessageType, String), Value>,
    last_error: Option<String>,
    start_time: Instant,
    entries: VecDeque<HistoryEntry>,
    max_entries: usize,
}

impl Default for MessageHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageHistory {
    pub const DEFAULT_MAX_ENTRIES: usize = 100;

    pub fn new() -> Self {
        Self {
            latest: HashMap::new(),
            last_error: None,
            start_time: Instant::now(),
            entries: VecDeque::new(),
            max_entries: Self::DEFAULT_MAX_ENTRIES,
        }
    }

    pub fn with_max_entries(max_entries: usize) -> Self {
        Self {
            max_entries,
            ..Self::new()
        }
    }

    /// Record a protocol message. Messages that are not shaped
    /// `{service: {method: ...}}` are ignored.
    pub fn record(&mut self, msg_type: MessageType, message: &Value) {
        let Some(command) = command_path(message) else {
            return;
        };

        self.latest
            .insert((msg_type, command.clone()), message.clone());

        self.entries.push_back(HistoryEntry {
            msg_type,
            command,
            message: message.clone(),
            timestamp: self.start_time.elapsed().as_secs_f64(),
        });

        while self.entries.len() > self.max_entries {
            self.entries.pop_front();
        }
    }

    pub fn record_error(&mut self, error: &str) {
        self.last_error = Some(error.to_string());
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Most recent message of the given direction for `service.method`.
    pub fn latest(&self, msg_type: MessageType, command: &str) -> Option<&Value> {
        self.latest.get(&(msg_type, command.to_string()))
    }

    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.latest.clear();
        self.entries.clear();
        self.last_error = None;
    }

    pub fn summary(&self) -> HistorySummary {
        let count = |t: MessageType| self.latest.keys().filter(|(m, _)| *m == t).count();
        HistorySummary {
            send_count: count(MessageType::Send),
            receive_count: count(MessageType::Receive),
            total_entries: self.entries.len(),
            last_error: self.last_error.clone(),
        }
    }
}

/// Summary of message history for diagnostics.
///
/// The counts are of distinct commands seen, not of messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistorySummary {
    pub send_count: usize,
    pub receive_count: usize,
    pub total_entries: usize,
    pub last_error: Option<String>,
}

fn command_path(message: &Value) -> Option<String> {
    let (service, body) = message.as_object()?.iter().next()?;
    let (method, _) = body.as_object()?.iter().next()?;
    Some(format!("{service}.{method}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_message() {
        let mut history = MessageHistory::new();
        history.record(
            MessageType::Send,
            &json!({"system": {"get_sysinfo": {}}}),
        );

        assert_eq!(history.len(), 1);
        assert!(
            history
                .latest(MessageType::Send, "system.get_sysinfo")
                .is_some()
        );
    }

    #[test]
    fn test_ignores_unshaped_message() {
        let mut history = MessageHistory::new();
        history.record(MessageType::Receive, &json!("not a command"));
        history.record(MessageType::Receive, &json!({"system": 1}));
        assert!(history.is_empty());
    }

    #[test]
    fn test_record_error() {
        let mut history = MessageHistory::new();
        history.record_error("Connection timeout");
        assert_eq!(history.last_error(), Some("Connection timeout"));
    }

    #[test]
    fn test_max_entries() {
        let mut history = MessageHistory::with_max_entries(2);
        for i in 0..5 {
            history.record(
                MessageType::Send,
                &json!({"system": {format!("method{}", i): {}}}),
            );
        }
        assert_eq!(history.len(), 2);
        assert_eq!(history.summary().send_count, 5);
    }
}
