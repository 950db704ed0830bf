//! Error handling for the composer core
//!
//! All failures the composer can produce live in [`ZapError`]. Most of them
//! are absorbed where they happen:
//!
//! - Normalization and link building are total and never fail.
//! - The history store absorbs storage failures, logs them with `warn!`
//!   and keeps the in-memory log authoritative.
//! - A malformed persisted history decodes to an empty log.
//!
//! The composer hands input errors (`EmptyRecipient`, `EntryNotFound`,
//! `TemplateNotFound`) back to the front-end so it can tell the user.
//!
//! ```rust
//! use zapconnect_core::ZapError;
//!
//! let error = ZapError::EmptyRecipient;
//! assert_eq!(error.to_string(), "Recipient number is empty");
//! assert!(error.is_user_facing());
//! ```

use thiserror::Error;

/// Result type for composer operations
pub type Result<T> = std::result::Result<T, ZapError>;

/// Errors that can occur while composing, sending or persisting
#[derive(Error, Debug)]
pub enum ZapError {
    /// Send was requested with an empty recipient number
    #[error("Recipient number is empty")]
    EmptyRecipient,

    /// No history entry at the requested position
    #[error("History entry not found: {0}")]
    EntryNotFound(usize),

    /// No template at the requested position
    #[error("Template not found: {0}")]
    TemplateNotFound(usize),

    /// I/O error while reading or writing persisted state
    ///
    /// Automatically converted from `std::io::Error`.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error while encoding the history log
    ///
    /// Automatically converted from `serde_json::Error`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Storage backend refused an operation
    #[error("Persistence failure: {0}")]
    Persistence(String),

    /// Persisted history could not be decoded
    #[error("Malformed persisted state: {0}")]
    MalformedState(String),
}

impl ZapError {
    /// Whether this error comes from user input rather than the environment
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            ZapError::EmptyRecipient | ZapError::EntryNotFound(_) | ZapError::TemplateNotFound(_)
        )
    }

    /// Whether this error is a persistence problem the session survives
    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            ZapError::Io(_) | ZapError::Json(_) | ZapError::Persistence(_)
        )
    }

    /// Get a user-friendly message for display
    pub fn user_message(&self) -> String {
        match self {
            ZapError::EmptyRecipient => "Enter a recipient number before sending.".to_string(),
            // Positions are shown 1-based
            ZapError::EntryNotFound(index) => {
                format!("There is no history entry #{}.", index + 1)
            }
            ZapError::TemplateNotFound(index) => {
                format!("There is no template #{}.", index + 1)
            }
            ZapError::Io(e) => {
                format!("Could not save history ({}). Changes are kept for this session.", e)
            }
            ZapError::Json(e) => {
                format!("Could not encode history ({}). Changes are kept for this session.", e)
            }
            ZapError::Persistence(msg) => {
                format!("Could not save history ({}). Changes are kept for this session.", msg)
            }
            ZapError::MalformedState(msg) => {
                format!("Saved history was unreadable ({}) and has been reset.", msg)
            }
        }
    }

    /// Create a persistence error
    pub fn persistence(msg: impl Into<String>) -> Self {
        ZapError::Persistence(msg.into())
    }

    /// Create a malformed state error
    pub fn malformed_state(msg: impl Into<String>) -> Self {
        ZapError::MalformedState(msg.into())
    }
}
