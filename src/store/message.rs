//! Message type and its persisted form

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// A single stored message
///
/// Fields are private: once created a message never changes. Messages only
/// disappear through a clear of the whole collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    id: u64,
    text: String,
    timestamp: DateTime<Local>,
}

impl Message {
    pub(crate) fn new(id: u64, text: String, timestamp: DateTime<Local>) -> Self {
        Self { id, text, timestamp }
    }

    /// Unique id, strictly increasing in creation order
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Creation time
    pub fn timestamp(&self) -> &DateTime<Local> {
        &self.timestamp
    }
}

/// On-disk record for one message
///
/// `isSpeaking` is part of the stored shape but carries no state: playback
/// never survives a restart, so it is written as `false` and ignored on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredMessage {
    pub id: u64,
    pub text: String,
    pub timestamp: DateTime<Local>,
    #[serde(default)]
    pub is_speaking: bool,
}

impl From<&Message> for StoredMessage {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id,
            text: message.text.clone(),
            timestamp: message.timestamp,
            is_speaking: false,
        }
    }
}

impl From<StoredMessage> for Message {
    fn from(record: StoredMessage) -> Self {
        Message::new(record.id, record.text, record.timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_stored_shape() {
        let ts = Local.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).single().unwrap();
        let message = Message::new(1704103200000, "नमस्ते".to_string(), ts);
        let json = serde_json::to_value(StoredMessage::from(&message)).unwrap();

        assert_eq!(json["id"], 1704103200000u64);
        assert_eq!(json["text"], "नमस्ते");
        assert_eq!(json["isSpeaking"], false);
        assert!(json["timestamp"].as_str().unwrap().starts_with("2024-01-01T10:00:00"));
    }

    #[test]
    fn test_parse_utc_timestamp() {
        let json = r#"{"id":5,"text":"hi","timestamp":"2024-01-01T10:00:00.000Z","isSpeaking":true}"#;
        let record: StoredMessage = serde_json::from_str(json).unwrap();
        let message = Message::from(record);

        assert_eq!(message.id(), 5);
        assert_eq!(message.timestamp().timestamp(), 1704103200);
    }

    #[test]
    fn test_missing_is_speaking_defaults() {
        let json = r#"{"id":7,"text":"x","timestamp":"2024-01-01T10:00:00+05:30"}"#;
        let record: StoredMessage = serde_json::from_str(json).unwrap();
        assert!(!record.is_speaking);
    }
}
