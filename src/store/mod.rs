//! Message store
//!
//! Owns the ordered message collection and the app title, and keeps both in
//! sync with local storage. Every change to the collection rewrites the whole
//! collection entry; the expected size is a few hundred short messages at
//! most.

pub mod dates;
pub mod message;
pub mod storage;

pub use dates::{calendar_date, date_label, date_label_now, format_time, needs_date_separator};
pub use message::{Message, StoredMessage};
pub use storage::{FileStorage, LocalStorage, MemoryStorage};

use crate::error::InvalidTitle;
use crate::{ReaderError, Result};
use chrono::{DateTime, Local};
use log::{debug, info, warn};
use std::collections::HashSet;

/// Storage key holding the serialized message collection
pub const MESSAGES_KEY: &str = "messages";

/// Storage key holding the app title
pub const TITLE_KEY: &str = "appTitle";

/// Title shown until the user picks one
pub const DEFAULT_TITLE: &str = "Message Reader";

/// Longest accepted title, in characters
pub const MAX_TITLE_LEN: usize = 30;

/// Ordered, persisted message collection plus the app title
pub struct MessageStore<S: LocalStorage = Box<dyn LocalStorage>> {
    storage: S,
    messages: Vec<Message>,
    title: String,
    /// Highest id handed out this session; survives `clear`
    last_id: u64,
}

impl<S: LocalStorage> MessageStore<S> {
    /// Load the collection and title from storage
    ///
    /// Missing or unreadable data falls back to an empty collection and the
    /// default title. This never fails.
    pub fn initialize(storage: S) -> Self {
        let messages = Self::load_messages(&storage);
        let title = Self::load_title(&storage);
        let last_id = messages.iter().map(Message::id).max().unwrap_or(0);

        info!("Loaded {} messages, title {:?}", messages.len(), title);

        Self {
            storage,
            messages,
            title,
            last_id,
        }
    }

    fn load_messages(storage: &S) -> Vec<Message> {
        let raw = match storage.get_item(MESSAGES_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!("Could not read stored messages: {}", e);
                return Vec::new();
            }
        };

        let records: Vec<StoredMessage> = match serde_json::from_str(&raw) {
            Ok(records) => records,
            Err(e) => {
                warn!("Ignoring malformed stored messages: {}", e);
                return Vec::new();
            }
        };

        let mut seen = HashSet::new();
        records
            .into_iter()
            .filter(|record| {
                if record.id == u64::MAX {
                    warn!("Dropping stored message with id {}: no later id would fit", record.id);
                    return false;
                }
                let fresh = seen.insert(record.id);
                if !fresh {
                    debug!("Dropping duplicate message id {}", record.id);
                }
                fresh
            })
            .map(Message::from)
            .collect()
    }

    fn load_title(storage: &S) -> String {
        match storage.get_item(TITLE_KEY) {
            Ok(Some(title)) => match validate_title(&title) {
                Ok(title) => title,
                Err(e) => {
                    warn!("Ignoring stored title: {}", e);
                    DEFAULT_TITLE.to_string()
                }
            },
            Ok(None) => DEFAULT_TITLE.to_string(),
            Err(e) => {
                warn!("Could not read stored title: {}", e);
                DEFAULT_TITLE.to_string()
            }
        }
    }

    /// Append a message created now
    ///
    /// Blank or whitespace-only text is ignored and returns `Ok(None)`.
    pub fn append(&mut self, text: &str) -> Result<Option<&Message>> {
        self.append_at(text, Local::now())
    }

    /// Append a message with an explicit creation time
    ///
    /// The id is derived from the timestamp in milliseconds, bumped past the
    /// last id when the clock has not moved forward.
    pub fn append_at(&mut self, text: &str, timestamp: DateTime<Local>) -> Result<Option<&Message>> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }

        let millis = u64::try_from(timestamp.timestamp_millis()).unwrap_or(0);
        let next = self
            .last_id
            .checked_add(1)
            .ok_or_else(|| ReaderError::Storage("Message ids exhausted".to_string()))?;
        let id = millis.max(next);
        self.last_id = id;

        self.messages.push(Message::new(id, text.to_string(), timestamp));
        debug!("Appended message {} ({} chars)", id, text.chars().count());

        self.persist_messages()?;
        Ok(self.messages.last())
    }

    /// Remove every message and the stored collection entry
    pub fn clear(&mut self) -> Result<()> {
        info!("Clearing {} messages", self.messages.len());
        self.messages.clear();
        self.storage.remove_item(MESSAGES_KEY)
    }

    /// Change the app title
    ///
    /// The title is trimmed; blank titles and titles over
    /// [`MAX_TITLE_LEN`] characters are refused, never truncated.
    pub fn set_title(&mut self, title: &str) -> Result<&str> {
        let title = validate_title(title)?;
        if title != self.title {
            debug!("Title changed to {:?}", title);
        }
        self.title = title;
        self.storage.set_item(TITLE_KEY, &self.title)?;
        Ok(&self.title)
    }

    fn persist_messages(&mut self) -> Result<()> {
        let records: Vec<StoredMessage> = self.messages.iter().map(StoredMessage::from).collect();
        let json = serde_json::to_string(&records)?;
        self.storage.set_item(MESSAGES_KEY, &json)
    }

    /// Messages in insertion order
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Look up a message by id
    pub fn get(&self, id: u64) -> Option<&Message> {
        self.messages.iter().find(|m| m.id() == id)
    }

    /// Look up a message by its 1-based position in the list
    pub fn get_by_position(&self, position: usize) -> Option<&Message> {
        position.checked_sub(1).and_then(|i| self.messages.get(i))
    }

    /// Most recent message
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Give the storage back, e.g. to reload from it
    pub fn into_storage(self) -> S {
        self.storage
    }
}

/// Trim a title and check it against the length rules
pub fn validate_title(title: &str) -> std::result::Result<String, InvalidTitle> {
    let title = title.trim();
    let len = title.chars().count();

    if len == 0 {
        Err(InvalidTitle::Blank)
    } else if len > MAX_TITLE_LEN {
        Err(InvalidTitle::TooLong {
            len,
            max: MAX_TITLE_LEN,
        })
    } else {
        Ok(title.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 1, 1, h, m, 0).single().unwrap()
    }

    #[test]
    fn test_initialize_empty() {
        let store = MessageStore::initialize(MemoryStorage::new());
        assert!(store.is_empty());
        assert_eq!(store.title(), DEFAULT_TITLE);
    }

    #[test]
    fn test_same_millisecond_ids_increase() {
        let mut store = MessageStore::initialize(MemoryStorage::new());
        let ts = at(10, 0);
        let a = store.append_at("one", ts).unwrap().unwrap().id();
        let b = store.append_at("two", ts).unwrap().unwrap().id();
        let c = store.append_at("three", ts).unwrap().unwrap().id();

        assert_eq!(a, ts.timestamp_millis() as u64);
        assert_eq!(b, a + 1);
        assert_eq!(c, a + 2);
    }

    #[test]
    fn test_clock_going_backwards() {
        let mut store = MessageStore::initialize(MemoryStorage::new());
        let a = store.append_at("later", at(12, 0)).unwrap().unwrap().id();
        let b = store.append_at("earlier", at(9, 0)).unwrap().unwrap().id();
        assert!(b > a);
    }

    fn stored_with_id(id: u64) -> MemoryStorage {
        let json = format!(
            r#"[{{"id":{},"text":"old","timestamp":"2024-01-01T10:00:00Z"}}]"#,
            id
        );
        let mut storage = MemoryStorage::new();
        storage.set_item(MESSAGES_KEY, &json).unwrap();
        storage
    }

    #[test]
    fn test_max_stored_id_is_dropped() {
        let mut store = MessageStore::initialize(stored_with_id(u64::MAX));
        assert!(store.is_empty());

        let id = store.append_at("next", at(10, 0)).unwrap().unwrap().id();
        assert_eq!(id, at(10, 0).timestamp_millis() as u64);
    }

    #[test]
    fn test_ids_exhausted_is_an_error() {
        let mut store = MessageStore::initialize(stored_with_id(u64::MAX - 1));
        assert_eq!(store.len(), 1);

        let id = store.append_at("last", at(10, 0)).unwrap().unwrap().id();
        assert_eq!(id, u64::MAX);

        let err = store.append_at("one too many", at(10, 0)).unwrap_err();
        assert!(matches!(err, ReaderError::Storage(_)));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_append_trims() {
        let mut store = MessageStore::initialize(MemoryStorage::new());
        let message = store.append("  नमस्ते दुनिया \n").unwrap().unwrap();
        assert_eq!(message.text(), "नमस्ते दुनिया");
    }

    #[test]
    fn test_blank_append_does_not_write() {
        let mut store = MessageStore::initialize(MemoryStorage::new());
        assert!(store.append(" \t\n").unwrap().is_none());
        assert!(store.is_empty());
        assert!(!store.storage().contains(MESSAGES_KEY));
    }

    #[test]
    fn test_position_lookup() {
        let mut store = MessageStore::initialize(MemoryStorage::new());
        store.append_at("a", at(1, 0)).unwrap();
        store.append_at("b", at(2, 0)).unwrap();

        assert!(store.get_by_position(0).is_none());
        assert_eq!(store.get_by_position(1).unwrap().text(), "a");
        assert_eq!(store.get_by_position(2).unwrap().text(), "b");
        assert!(store.get_by_position(3).is_none());
    }

    #[test]
    fn test_validate_title() {
        assert_eq!(validate_title("  Hello  ").unwrap(), "Hello");
        assert_eq!(validate_title("   "), Err(InvalidTitle::Blank));
        assert_eq!(validate_title(&"a".repeat(30)).unwrap().len(), 30);
        assert_eq!(
            validate_title(&"a".repeat(31)),
            Err(InvalidTitle::TooLong { len: 31, max: 30 })
        );
        // Counted in characters, not bytes
        assert!(validate_title(&"न".repeat(30)).is_ok());
    }

    #[test]
    fn test_duplicate_ids_dropped_on_load() {
        let mut storage = MemoryStorage::new();
        storage
            .set_item(
                MESSAGES_KEY,
                r#"[{"id":1,"text":"a","timestamp":"2024-01-01T10:00:00Z","isSpeaking":false},
                    {"id":1,"text":"b","timestamp":"2024-01-01T10:01:00Z","isSpeaking":false}]"#,
            )
            .unwrap();

        let store = MessageStore::initialize(storage);
        assert_eq!(store.len(), 1);
        assert_eq!(store.messages()[0].text(), "a");
    }
}
