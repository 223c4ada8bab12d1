//! The canonical journal record every source is normalized into.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Which source produced a record.
///
/// The declaration order is also the reconciliation priority order used to
/// seed the merge before sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    TableStore,
    Channel,
    CommitLog,
    AnnotatedEntry,
}

impl SourceKind {
    /// All sources, in reconciliation priority order.
    pub const ALL: [SourceKind; 4] = [
        SourceKind::TableStore,
        SourceKind::Channel,
        SourceKind::CommitLog,
        SourceKind::AnnotatedEntry,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::TableStore => "table-store",
            SourceKind::Channel => "channel",
            SourceKind::CommitLog => "commit-log",
            SourceKind::AnnotatedEntry => "annotated-entry",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized activity record.
///
/// `timestamp` is naive wall-clock time in the configured reference zone
/// (see [`crate::config::JournalConfig`]). Records are created once by a
/// normalizer and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalRecord {
    pub timestamp: NaiveDateTime,
    pub message: String,
    pub author: Option<String>,
    pub source: SourceKind,
}

impl JournalRecord {
    /// Build a record without an author.
    pub fn new(source: SourceKind, timestamp: NaiveDateTime, message: impl Into<String>) -> Self {
        Self {
            timestamp,
            message: message.into(),
            author: None,
            source,
        }
    }

    /// Attach an optional author; `None` leaves the record unattributed.
    pub fn with_author(mut self, author: Option<impl Into<String>>) -> Self {
        self.author = author.map(Into::into);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn source_kind_serializes_kebab_case() {
        let json = serde_json::to_string(&SourceKind::AnnotatedEntry).unwrap();
        assert_eq!(json, "\"annotated-entry\"");
        assert_eq!(SourceKind::CommitLog.to_string(), "commit-log");
    }

    #[test]
    fn new_record_has_no_author_until_set() {
        let ts = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let record = JournalRecord::new(SourceKind::TableStore, ts, "deployed v2");
        assert!(record.author.is_none());

        let record = record.with_author(Some("alice"));
        assert_eq!(record.author.as_deref(), Some("alice"));
        assert_eq!(record.source, SourceKind::TableStore);
    }
}
