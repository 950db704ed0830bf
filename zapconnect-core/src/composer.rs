//! Composer
//!
//! Owns the draft (recipient + message), the visible view and the history
//! store, and turns a send request into a deep link, a history entry and a
//! hand-off to the link opener.
//!
//! ## Send flow
//!
//! ```text
//! draft.number ──▶ normalize ──┐
//!                              ├──▶ LinkBuilder ──▶ uri ──▶ LinkOpener (fire-and-forget)
//! draft.body ──────────────────┘
//!        │
//!        └──▶ HistoryEntry ──▶ HistoryStore::append ──▶ storage
//! ```
//!
//! The draft is left as-is after a send so the same message can be edited
//! and resent straight away.

use crate::config::DEFAULT_TIMESTAMP_FORMAT;
use crate::history::{HistoryEntry, HistoryLog, HistoryStore};
use crate::link::LinkBuilder;
use crate::normalize::normalize;
use crate::opener::LinkOpener;
use crate::storage::KeyValueStore;
use crate::templates::{default_templates, insert_template};
use crate::{Result, ZapError};
use chrono::{DateTime, Local, Utc};
use std::fmt::Write;
use tracing::{debug, info};

/// Editable draft field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    Number,
    Body,
}

/// Unsent composition
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftState {
    /// Recipient as typed
    pub number: String,
    /// Message text, may be empty
    pub body: String,
}

/// Which projection of the composer state is shown
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum View {
    #[default]
    Compose,
    History,
    /// Has no state of its own and shows the compose view
    Settings,
}

impl View {
    /// The view actually rendered for this selection
    pub fn projection(self) -> View {
        match self {
            View::Compose | View::Settings => View::Compose,
            View::History => View::History,
        }
    }
}

/// Settings the composer is built with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposerSettings {
    pub link: LinkBuilder,
    /// strftime-style format for entry timestamps
    pub timestamp_format: String,
    pub templates: Vec<String>,
}

impl Default for ComposerSettings {
    fn default() -> Self {
        Self {
            link: LinkBuilder::default(),
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
            templates: default_templates(),
        }
    }
}

/// Result of a successful send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    /// Link handed to the opener
    pub uri: String,
    /// Entry recorded in history
    pub entry: HistoryEntry,
}

/// Draft, view and history orchestration
pub struct Composer<S, O> {
    draft: DraftState,
    view: View,
    templates_open: bool,
    store: HistoryStore<S>,
    opener: O,
    settings: ComposerSettings,
    last_id: i64,
}

impl<S: KeyValueStore, O: LinkOpener> Composer<S, O> {
    /// Create a composer with default settings
    pub fn new(store: HistoryStore<S>, opener: O) -> Self {
        Self::with_settings(store, opener, ComposerSettings::default())
    }

    /// Create a composer with explicit settings
    pub fn with_settings(store: HistoryStore<S>, opener: O, settings: ComposerSettings) -> Self {
        let last_id = store.log().max_id().unwrap_or(0);

        Self {
            draft: DraftState::default(),
            view: View::default(),
            templates_open: false,
            store,
            opener,
            settings,
            last_id,
        }
    }

    pub fn draft(&self) -> &DraftState {
        &self.draft
    }

    /// Selected view
    pub fn view(&self) -> View {
        self.view
    }

    /// Switch views
    pub fn show(&mut self, view: View) {
        debug!("View {:?} -> {:?}", self.view, view);
        self.view = view;
    }

    /// Overwrite a draft field; validation waits until send
    pub fn update_draft(&mut self, field: DraftField, value: impl Into<String>) {
        let value = value.into();
        match field {
            DraftField::Number => self.draft.number = value,
            DraftField::Body => self.draft.body = value,
        }
    }

    /// Current history snapshot
    pub fn history(&self) -> &HistoryLog {
        self.store.log()
    }

    pub fn store(&self) -> &HistoryStore<S> {
        &self.store
    }

    pub fn opener(&self) -> &O {
        &self.opener
    }

    pub fn settings(&self) -> &ComposerSettings {
        &self.settings
    }

    pub fn templates(&self) -> &[String] {
        &self.settings.templates
    }

    pub fn templates_open(&self) -> bool {
        self.templates_open
    }

    /// Show or hide the template picker
    pub fn toggle_templates(&mut self) -> bool {
        self.templates_open = !self.templates_open;
        self.templates_open
    }

    /// Append template `index` to the draft body and close the picker
    pub fn insert_template(&mut self, index: usize) -> Result<()> {
        let template = self
            .settings
            .templates
            .get(index)
            .ok_or(ZapError::TemplateNotFound(index))?;

        self.draft.body = insert_template(&self.draft.body, template);
        self.templates_open = false;
        Ok(())
    }

    /// Link a send would open right now, `None` without a recipient
    pub fn preview_link(&self) -> Option<String> {
        if self.draft.number.is_empty() {
            return None;
        }
        Some(
            self.settings
                .link
                .build(&normalize(&self.draft.number), &self.draft.body),
        )
    }

    /// Record the draft in history and hand its link to the opener
    ///
    /// Only a literally empty number is rejected; a whitespace-only number
    /// goes through and yields a link without digits.
    pub fn send(&mut self) -> Result<SentMessage> {
        if self.draft.number.is_empty() {
            debug!("Send blocked: empty recipient");
            return Err(ZapError::EmptyRecipient);
        }

        let normalized = normalize(&self.draft.number);
        let uri = self.settings.link.build(&normalized, &self.draft.body);

        let entry = HistoryEntry::new(
            self.next_id(),
            self.draft.number.clone(),
            self.draft.body.clone(),
            self.format_timestamp(Local::now()),
        );

        let history_len = self.store.append(entry.clone()).len();
        info!(
            "Handing off message to {} ({} entries in history)",
            normalized, history_len
        );

        self.opener.open(&uri);

        Ok(SentMessage { uri, entry })
    }

    /// Load an entry back into the draft and switch to compose
    pub fn reuse(&mut self, entry: &HistoryEntry) {
        debug!("Reusing history entry {}", entry.id());
        self.draft.number = entry.number().to_string();
        self.draft.body = entry.body().to_string();
        self.view = View::Compose;
    }

    /// Reuse the entry at `index` in the current snapshot
    pub fn reuse_at(&mut self, index: usize) -> Result<()> {
        let entry = self
            .store
            .log()
            .get(index)
            .cloned()
            .ok_or(ZapError::EntryNotFound(index))?;
        self.reuse(&entry);
        Ok(())
    }

    /// Drop all history, including the persisted copy
    pub fn clear_history(&mut self) -> &HistoryLog {
        self.store.clear()
    }

    /// Pending persistence failure, if any
    pub fn take_warning(&mut self) -> Option<ZapError> {
        self.store.take_warning()
    }

    /// Millisecond clock, bumped past every id already issued
    fn next_id(&mut self) -> i64 {
        let id = Utc::now()
            .timestamp_millis()
            .max(self.last_id.saturating_add(1));
        self.last_id = id;
        id
    }

    fn format_timestamp(&self, now: DateTime<Local>) -> String {
        let mut out = String::new();
        if write!(out, "{}", now.format(&self.settings.timestamp_format)).is_err() {
            out.clear();
            let _ = write!(out, "{}", now.format(DEFAULT_TIMESTAMP_FORMAT));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::{DEFAULT_STORAGE_KEY, MAX_ENTRIES};
    use crate::storage::MemoryStore;
    use std::cell::RefCell;

    /// Opener that records every link it is given
    #[derive(Default)]
    struct RecordingOpener {
        opened: RefCell<Vec<String>>,
    }

    impl LinkOpener for RecordingOpener {
        fn open(&self, uri: &str) {
            self.opened.borrow_mut().push(uri.to_string());
        }
    }

    fn composer() -> Composer<MemoryStore, RecordingOpener> {
        Composer::new(
            HistoryStore::open(MemoryStore::new()),
            RecordingOpener::default(),
        )
    }

    #[test]
    fn test_initial_state() {
        let composer = composer();
        assert_eq!(composer.view(), View::Compose);
        assert_eq!(composer.draft(), &DraftState::default());
        assert!(composer.history().is_empty());
        assert!(!composer.templates_open());
    }

    #[test]
    fn test_send_scenario() {
        let mut composer = composer();
        composer.update_draft(DraftField::Number, "+1 (555) 019-9000");
        composer.update_draft(DraftField::Body, "Hello");

        let sent = composer.send().unwrap();
        assert_eq!(sent.uri, "https://wa.me/15550199000?text=Hello");
        assert_eq!(sent.entry.number(), "+1 (555) 019-9000");
        assert_eq!(sent.entry.body(), "Hello");
        assert!(!sent.entry.created_at().is_empty());

        assert_eq!(composer.history().len(), 1);
        assert_eq!(composer.history().get(0), Some(&sent.entry));
        assert_eq!(
            *composer.opener().opened.borrow(),
            vec!["https://wa.me/15550199000?text=Hello".to_string()]
        );

        // Draft survives the send
        assert_eq!(composer.draft().number, "+1 (555) 019-9000");
        assert_eq!(composer.draft().body, "Hello");
    }

    #[test]
    fn test_send_empty_body_uses_placeholder() {
        let mut composer = composer();
        composer.update_draft(DraftField::Number, "5550199");

        let sent = composer.send().unwrap();
        assert_eq!(sent.uri, "https://wa.me/5550199?text=");
        assert_eq!(sent.entry.body(), "(No text)");
    }

    #[test]
    fn test_send_empty_number_is_blocked() {
        let mut composer = composer();
        composer.update_draft(DraftField::Body, "Hello");

        assert!(matches!(composer.send(), Err(ZapError::EmptyRecipient)));
        assert!(composer.history().is_empty());
        assert!(composer.opener().opened.borrow().is_empty());
        assert!(!composer.store().storage().contains(DEFAULT_STORAGE_KEY));
        assert!(composer.preview_link().is_none());
    }

    #[test]
    fn test_whitespace_number_is_sent() {
        let mut composer = composer();
        composer.update_draft(DraftField::Number, "   ");
        composer.update_draft(DraftField::Body, "  ");

        let sent = composer.send().unwrap();
        assert_eq!(sent.uri, "https://wa.me/?text=%20%20");
        assert_eq!(sent.entry.number(), "   ");
        assert_eq!(sent.entry.body(), "  ");
    }

    #[test]
    fn test_ids_strictly_increase() {
        let mut composer = composer();
        composer.update_draft(DraftField::Number, "1");

        let ids: Vec<i64> = (0..5).map(|_| composer.send().unwrap().entry.id()).collect();
        assert!(ids.windows(2).all(|w| w[1] > w[0]), "{ids:?}");
    }

    #[test]
    fn test_ids_continue_past_loaded_history() {
        let far_future = Utc::now().timestamp_millis() + 1_000_000;
        let mut storage = MemoryStore::new();
        let log = HistoryLog::new().prepend(HistoryEntry::new(far_future, "1", "x", "t"));
        storage
            .set(DEFAULT_STORAGE_KEY, &log.encode().unwrap())
            .unwrap();

        let mut composer = Composer::new(HistoryStore::open(storage), RecordingOpener::default());
        composer.update_draft(DraftField::Number, "2");
        assert_eq!(composer.send().unwrap().entry.id(), far_future + 1);
    }

    #[test]
    fn test_ids_saturate_at_loaded_maximum() {
        let mut storage = MemoryStore::new();
        let log = HistoryLog::new().prepend(HistoryEntry::new(i64::MAX, "1", "x", "t"));
        storage
            .set(DEFAULT_STORAGE_KEY, &log.encode().unwrap())
            .unwrap();

        let mut composer = Composer::new(HistoryStore::open(storage), RecordingOpener::default());
        composer.update_draft(DraftField::Number, "2");

        let sent = composer.send().unwrap();
        assert_eq!(sent.entry.id(), i64::MAX);
        assert_eq!(composer.history().len(), 2);
        assert_eq!(composer.opener().opened.borrow().len(), 1);
    }

    #[test]
    fn test_eleven_sends_keep_ten() {
        let mut composer = composer();
        for i in 0..11 {
            composer.update_draft(DraftField::Number, format!("555000{:02}", i));
            composer.send().unwrap();
        }

        let history = composer.history();
        assert_eq!(history.len(), MAX_ENTRIES);
        assert_eq!(history.get(0).unwrap().number(), "55500010");
        assert_eq!(history.get(9).unwrap().number(), "55500001");
        assert!(history.iter().all(|e| e.number() != "55500000"));
        assert_eq!(composer.opener().opened.borrow().len(), 11);
    }

    #[test]
    fn test_reuse_loads_draft_without_appending() {
        let mut composer = composer();
        composer.update_draft(DraftField::Number, "111");
        composer.update_draft(DraftField::Body, "first");
        composer.send().unwrap();
        composer.update_draft(DraftField::Number, "222");
        composer.update_draft(DraftField::Body, "");
        composer.send().unwrap();

        composer.show(View::History);
        composer.reuse_at(1).unwrap();

        assert_eq!(composer.view(), View::Compose);
        assert_eq!(composer.draft().number, "111");
        assert_eq!(composer.draft().body, "first");
        assert_eq!(composer.history().len(), 2);

        // The placeholder is what the entry holds, so that is what comes back
        composer.reuse_at(0).unwrap();
        assert_eq!(composer.draft().body, "(No text)");
    }

    #[test]
    fn test_reuse_out_of_range() {
        let mut composer = composer();
        composer.update_draft(DraftField::Number, "keep");
        composer.show(View::History);

        assert!(matches!(
            composer.reuse_at(0),
            Err(ZapError::EntryNotFound(0))
        ));
        assert_eq!(composer.draft().number, "keep");
        assert_eq!(composer.view(), View::History);
    }

    #[test]
    fn test_clear_history() {
        let mut composer = composer();
        composer.update_draft(DraftField::Number, "1");
        composer.send().unwrap();

        assert!(composer.clear_history().is_empty());
        assert!(!composer.store().storage().contains(DEFAULT_STORAGE_KEY));
        assert!(composer.store().load().is_empty());
        // Draft is not part of history
        assert_eq!(composer.draft().number, "1");
    }

    #[test]
    fn test_templates() {
        let mut composer = composer();
        assert!(composer.toggle_templates());

        composer.insert_template(0).unwrap();
        assert_eq!(composer.draft().body, "Hi, I'm interested in your product.");
        assert!(!composer.templates_open());

        composer.insert_template(4).unwrap();
        assert_eq!(
            composer.draft().body,
            "Hi, I'm interested in your product. Hello! Just checking in."
        );

        assert!(matches!(
            composer.insert_template(5),
            Err(ZapError::TemplateNotFound(5))
        ));
    }

    #[test]
    fn test_views() {
        let mut composer = composer();
        composer.show(View::Settings);
        assert_eq!(composer.view(), View::Settings);
        assert_eq!(composer.view().projection(), View::Compose);

        composer.show(View::History);
        assert_eq!(composer.view().projection(), View::History);
    }

    #[test]
    fn test_preview_matches_send() {
        let mut composer = composer();
        composer.update_draft(DraftField::Number, "+44 20 7946 0958");
        composer.update_draft(DraftField::Body, "See you at 5?");

        let preview = composer.preview_link().unwrap();
        assert_eq!(preview, "https://wa.me/442079460958?text=See%20you%20at%205%3F");
        assert!(composer.history().is_empty());
        assert_eq!(composer.send().unwrap().uri, preview);
    }

    #[test]
    fn test_custom_settings() {
        let settings = ComposerSettings {
            link: LinkBuilder::new("https://api.whatsapp.com/send/"),
            timestamp_format: "%Y".to_string(),
            templates: vec!["On my way".to_string()],
        };
        let mut composer = Composer::with_settings(
            HistoryStore::open(MemoryStore::new()),
            RecordingOpener::default(),
            settings,
        );
        composer.update_draft(DraftField::Number, "12");
        composer.insert_template(0).unwrap();

        let sent = composer.send().unwrap();
        assert_eq!(sent.uri, "https://api.whatsapp.com/send/12?text=On%20my%20way");
        assert_eq!(sent.entry.created_at().len(), 4);
    }
}
