//! ZapConnect Core
//!
//! Composes WhatsApp deep links from a recipient number and a message, and
//! keeps a short persisted history of sends for reuse.
//!
//! ## Components
//!
//! - [`normalize`]: reduces a typed phone number to its digits
//! - [`LinkBuilder`]: builds `https://wa.me/<digits>?text=<encoded>` links
//! - [`HistoryStore`]: bounded, newest-first log persisted in a
//!   [`KeyValueStore`] slot
//! - [`Composer`]: draft state, view selection, send/reuse/clear
//!
//! ## Example
//!
//! ```rust
//! use zapconnect_core::{Composer, DraftField, HistoryStore, MemoryStore, PrintOpener};
//!
//! let store = HistoryStore::open(MemoryStore::new());
//! let mut composer = Composer::new(store, PrintOpener);
//!
//! composer.update_draft(DraftField::Number, "+1 (555) 019-9000");
//! composer.update_draft(DraftField::Body, "Hello");
//!
//! let sent = composer.send()?;
//! assert_eq!(sent.uri, "https://wa.me/15550199000?text=Hello");
//! assert_eq!(composer.history().len(), 1);
//! # Ok::<(), zapconnect_core::ZapError>(())
//! ```

pub mod composer;
pub mod config;
pub mod history;
pub mod link;
pub mod normalize;
pub mod opener;
pub mod storage;
pub mod templates;

mod error;

pub use composer::{Composer, ComposerSettings, DraftField, DraftState, SentMessage, View};
pub use config::Config;
pub use error::{Result, ZapError};
pub use history::{
    HistoryEntry, HistoryLog, HistoryStore, DEFAULT_STORAGE_KEY, EMPTY_BODY_PLACEHOLDER,
    MAX_ENTRIES,
};
pub use link::{build_link, LinkBuilder, DEFAULT_BASE_URL};
pub use normalize::normalize;
pub use opener::{LinkOpener, PrintOpener, SystemOpener};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use templates::{insert_template, DEFAULT_TEMPLATES};
