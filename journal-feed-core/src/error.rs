use thiserror::Error;

use crate::record::SourceKind;

/// Error type returned by source clients (simple boxed error, like any transport error).
pub type FetchError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised by the journal pipeline.
///
/// Only [`JournalError::InvalidDateFormat`] is fatal. The per-source variants
/// are collected into the report and never abort sibling sources.
#[derive(Debug, Error)]
pub enum JournalError {
    #[error("Incorrect date format, should be DD/MM/YYYY (got {input:?})")]
    InvalidDateFormat { input: String },

    #[error("fetch from {kind} failed: {message}")]
    SourceFetch { kind: SourceKind, message: String },

    #[error("fetch from {kind} timed out after {seconds}s")]
    SourceTimeout { kind: SourceKind, seconds: u64 },

    #[error("malformed {kind} record: {reason}")]
    MalformedRecord { kind: SourceKind, reason: String },
}

impl JournalError {
    pub(crate) fn malformed(kind: SourceKind, reason: impl Into<String>) -> Self {
        JournalError::MalformedRecord {
            kind,
            reason: reason.into(),
        }
    }
}
