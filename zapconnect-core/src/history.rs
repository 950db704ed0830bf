//! Send History
//!
//! Keeps the most recent sends so a number/message pair can be reused.
//!
//! ## Storage Format
//!
//! The log is stored in a single key-value slot (default key
//! `zapConnectHistory`) as a JSON array, newest first:
//!
//! ```json
//! [
//!     {
//!         "id": 1760620800123,
//!         "phone": "+1 (555) 019-9000",
//!         "message": "Hello",
//!         "timestamp": "10/16/2026, 3:20:00 PM"
//!     }
//! ]
//! ```
//!
//! `number` and `body` are accepted as aliases of `phone` and `message` on
//! read. An absent or unreadable slot loads as an empty log.
//!
//! ## Bounds
//!
//! At most [`MAX_ENTRIES`] entries are kept. Appending to a full log drops
//! the oldest entry; a persisted payload over the bound is cut on load.

use crate::storage::KeyValueStore;
use crate::{Result, ZapError};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Maximum number of entries kept in the log
pub const MAX_ENTRIES: usize = 10;

/// Body recorded when a message is sent without text
pub const EMPTY_BODY_PLACEHOLDER: &str = "(No text)";

/// Default storage slot for the log
pub const DEFAULT_STORAGE_KEY: &str = "zapConnectHistory";

/// A past send action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    id: i64,

    /// Recipient exactly as typed, before normalization
    #[serde(rename = "phone", alias = "number")]
    number: String,

    #[serde(rename = "message", alias = "body")]
    body: String,

    /// Display-only creation time
    #[serde(rename = "timestamp", alias = "created_at", alias = "createdAt")]
    created_at: String,
}

impl HistoryEntry {
    /// Create an entry
    ///
    /// An empty `body` is recorded as [`EMPTY_BODY_PLACEHOLDER`]; any other
    /// text, whitespace included, is kept verbatim.
    pub fn new(
        id: i64,
        number: impl Into<String>,
        body: impl Into<String>,
        created_at: impl Into<String>,
    ) -> Self {
        let body = body.into();
        let body = if body.is_empty() {
            EMPTY_BODY_PLACEHOLDER.to_string()
        } else {
            body
        };

        Self {
            id,
            number: number.into(),
            body,
            created_at: created_at.into(),
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn created_at(&self) -> &str {
        &self.created_at
    }
}

/// Bounded, newest-first sequence of history entries
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct HistoryLog {
    entries: Vec<HistoryEntry>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a log from newest-first entries, keeping the first [`MAX_ENTRIES`]
    pub fn from_entries(mut entries: Vec<HistoryEntry>) -> Self {
        entries.truncate(MAX_ENTRIES);
        Self { entries }
    }

    /// Decode a persisted payload
    pub fn decode(payload: &str) -> Result<Self> {
        let entries: Vec<HistoryEntry> = serde_json::from_str(payload)
            .map_err(|e| ZapError::malformed_state(e.to_string()))?;

        if entries.len() > MAX_ENTRIES {
            warn!(
                "Persisted history holds {} entries, keeping newest {}",
                entries.len(),
                MAX_ENTRIES
            );
        }

        Ok(Self::from_entries(entries))
    }

    /// Encode for persistence
    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// New log with `entry` in front, oldest entries dropped past the bound
    pub fn prepend(&self, entry: HistoryEntry) -> Self {
        let mut entries = Vec::with_capacity((self.entries.len() + 1).min(MAX_ENTRIES));
        entries.push(entry);
        entries.extend(self.entries.iter().take(MAX_ENTRIES - 1).cloned());
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HistoryEntry> {
        self.entries.iter()
    }

    /// Highest id present, if any
    pub fn max_id(&self) -> Option<i64> {
        self.entries.iter().map(HistoryEntry::id).max()
    }
}

impl<'a> IntoIterator for &'a HistoryLog {
    type Item = &'a HistoryEntry;
    type IntoIter = std::slice::Iter<'a, HistoryEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Persisted owner of the history log
///
/// Every mutation writes through to storage before returning. Storage
/// failures are logged and kept as a pending warning; the in-memory log
/// stays authoritative for the session either way.
pub struct HistoryStore<S> {
    storage: S,
    key: String,
    log: HistoryLog,
    warning: Option<ZapError>,
}

impl<S: KeyValueStore> HistoryStore<S> {
    /// Open the store on `storage` using the default slot, loading saved state
    pub fn open(storage: S) -> Self {
        Self::open_with_key(storage, DEFAULT_STORAGE_KEY)
    }

    /// Open the store on an explicit slot
    pub fn open_with_key(storage: S, key: impl Into<String>) -> Self {
        let mut store = Self {
            storage,
            key: key.into(),
            log: HistoryLog::new(),
            warning: None,
        };
        store.log = store.load();
        info!(
            "Loaded {} history entries from '{}'",
            store.log.len(),
            store.key
        );
        store
    }

    /// Read the persisted log
    ///
    /// Missing, unreadable or malformed state all yield an empty log.
    pub fn load(&self) -> HistoryLog {
        let payload = match self.storage.get(&self.key) {
            Ok(Some(payload)) => payload,
            Ok(None) => {
                debug!("No persisted history under '{}'", self.key);
                return HistoryLog::new();
            }
            Err(e) => {
                warn!("Failed to read history '{}': {}", self.key, e);
                return HistoryLog::new();
            }
        };

        match HistoryLog::decode(&payload) {
            Ok(log) => log,
            Err(e) => {
                warn!("Ignoring persisted history '{}': {}", self.key, e);
                HistoryLog::new()
            }
        }
    }

    /// Current in-memory log
    pub fn log(&self) -> &HistoryLog {
        &self.log
    }

    /// Prepend `entry`, enforce the bound, persist
    pub fn append(&mut self, entry: HistoryEntry) -> &HistoryLog {
        debug!("Appending history entry {}", entry.id());
        self.log = self.log.prepend(entry);

        if let Err(e) = self.save() {
            warn!("Failed to persist history '{}': {}", self.key, e);
            self.warning = Some(e);
        }

        &self.log
    }

    /// Empty the log and delete the persisted slot
    pub fn clear(&mut self) -> &HistoryLog {
        self.log = HistoryLog::new();

        match self.storage.remove(&self.key) {
            Ok(()) => info!("Cleared history '{}'", self.key),
            Err(e) => {
                warn!("Failed to remove persisted history '{}': {}", self.key, e);
                self.warning = Some(e);
            }
        }

        &self.log
    }

    fn save(&mut self) -> Result<()> {
        let payload = self.log.encode()?;
        self.storage.set(&self.key, &payload)
    }

    /// Take the last persistence failure, if one is pending
    pub fn take_warning(&mut self) -> Option<ZapError> {
        self.warning.take()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn entry(id: i64) -> HistoryEntry {
        HistoryEntry::new(id, format!("+{}", id), format!("message {}", id), "now")
    }

    fn log_of(count: i64) -> HistoryLog {
        (1..=count).fold(HistoryLog::new(), |log, id| log.prepend(entry(id)))
    }

    /// Storage that fails every write
    struct BrokenStore {
        inner: MemoryStore,
    }

    impl KeyValueStore for BrokenStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            self.inner.get(key)
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<()> {
            Err(ZapError::persistence("quota exceeded"))
        }

        fn remove(&mut self, _key: &str) -> Result<()> {
            Err(ZapError::persistence("read-only"))
        }
    }

    #[test]
    fn test_entry_placeholder() {
        assert_eq!(HistoryEntry::new(1, "1", "", "t").body(), "(No text)");
        assert_eq!(HistoryEntry::new(1, "1", "  ", "t").body(), "  ");
        assert_eq!(HistoryEntry::new(1, "1", "hi", "t").body(), "hi");
    }

    #[test]
    fn test_prepend_grows_until_bound() {
        for k in 0..MAX_ENTRIES as i64 {
            let log = log_of(k);
            assert_eq!(log.len(), k as usize);
            assert_eq!(log.prepend(entry(100)).len(), k as usize + 1);
        }
    }

    #[test]
    fn test_prepend_at_bound_drops_oldest() {
        let full = log_of(10);
        assert_eq!(full.len(), 10);
        assert_eq!(full.get(9).unwrap().id(), 1);

        let next = full.prepend(entry(11));
        assert_eq!(next.len(), 10);
        assert_eq!(next.get(0).unwrap().id(), 11);
        assert_eq!(next.get(9).unwrap().id(), 2);
        assert!(next.iter().all(|e| e.id() != 1));

        // Original snapshot is untouched
        assert_eq!(full.get(0).unwrap().id(), 10);
    }

    #[test]
    fn test_encode_uses_stored_field_names() {
        let log = HistoryLog::new().prepend(HistoryEntry::new(7, "+1 555", "Hi", "today"));
        let json: serde_json::Value = serde_json::from_str(&log.encode().unwrap()).unwrap();

        assert_eq!(json[0]["id"], 7);
        assert_eq!(json[0]["phone"], "+1 555");
        assert_eq!(json[0]["message"], "Hi");
        assert_eq!(json[0]["timestamp"], "today");
    }

    #[test]
    fn test_decode_accepts_aliases() {
        let payload = r#"[{"id": 3, "number": "123", "body": "yo", "timestamp": "t"}]"#;
        let log = HistoryLog::decode(payload).unwrap();
        assert_eq!(log.get(0).unwrap().number(), "123");
        assert_eq!(log.get(0).unwrap().body(), "yo");
    }

    #[test]
    fn test_decode_truncates_oversized_payload() {
        let entries: Vec<HistoryEntry> = (0..15).rev().map(entry).collect();
        let payload = serde_json::to_string(&entries).unwrap();

        let log = HistoryLog::decode(&payload).unwrap();
        assert_eq!(log.len(), MAX_ENTRIES);
        assert_eq!(log.get(0).unwrap().id(), 14);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            HistoryLog::decode("not json"),
            Err(ZapError::MalformedState(_))
        ));
        assert!(HistoryLog::decode(r#"{"id": 1}"#).is_err());
    }

    #[test]
    fn test_store_load_missing_and_malformed() {
        let store = HistoryStore::open(MemoryStore::new());
        assert!(store.log().is_empty());

        let mut storage = MemoryStore::new();
        storage.set(DEFAULT_STORAGE_KEY, "{{{").unwrap();
        let store = HistoryStore::open(storage);
        assert!(store.log().is_empty());
    }

    #[test]
    fn test_store_append_persists() {
        let mut store = HistoryStore::open(MemoryStore::new());
        store.append(entry(1));
        store.append(entry(2));

        assert_eq!(store.load(), *store.log());
        assert_eq!(store.load().get(0).unwrap().id(), 2);
    }

    #[test]
    fn test_store_clear_removes_slot() {
        let mut store = HistoryStore::open(MemoryStore::new());
        store.append(entry(1));
        assert!(store.storage().contains(DEFAULT_STORAGE_KEY));

        assert!(store.clear().is_empty());
        assert!(!store.storage().contains(DEFAULT_STORAGE_KEY));
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_store_failure_keeps_memory_state() {
        let mut store = HistoryStore::open(BrokenStore {
            inner: MemoryStore::new(),
        });

        assert_eq!(store.append(entry(1)).len(), 1);
        assert!(matches!(
            store.take_warning(),
            Some(ZapError::Persistence(_))
        ));
        assert!(store.take_warning().is_none());

        assert!(store.clear().is_empty());
        assert!(store.take_warning().is_some());
    }
}
