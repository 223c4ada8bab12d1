//! # normalize: per-source conversion into [`JournalRecord`]s
//!
//! Every source speaks its own payload dialect. This module holds one
//! [`Normalizer`] per source, all sharing the same contract:
//!
//! - an absent or empty payload yields an empty vector, never an error;
//! - missing optional fields become absent attributes on the record;
//! - a raw item that cannot be parsed is skipped with a warning and the rest
//!   of the payload is still processed;
//! - the payload is only borrowed, never mutated.
//!
//! Payload types deserialize leniently (every field optional) so a partial
//! upstream response still produces whatever records it can.

pub mod annotated;
pub mod channel;
pub mod commit_log;
pub mod table_store;

pub use annotated::{AnnotatedEntry, AnnotatedEntryNormalizer, AnnotatedFeed};
pub use channel::{ChannelHistory, ChannelMessage, ChannelNormalizer, ChannelTs};
pub use commit_log::{CommitAuthor, CommitDetail, CommitItem, CommitLogNormalizer};
pub use table_store::{TableRow, TableScan, TableStoreNormalizer};

use tracing::{debug, warn};

use crate::config::{AnnotatedDayMatch, JournalConfig, OffsetPolicy};
use crate::error::JournalError;
use crate::record::{JournalRecord, SourceKind};
use crate::window::DayWindow;

/// Shared contract for the four source normalizers.
pub trait Normalizer {
    /// The raw payload shape this source delivers.
    type Payload;

    /// Which source the produced records are tagged with.
    const SOURCE: SourceKind;

    fn normalize(&self, payload: Option<&Self::Payload>, window: &DayWindow) -> Vec<JournalRecord>;
}

/// Settings the normalizers read from [`JournalConfig`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeOptions {
    pub offset_policy: OffsetPolicy,
    pub annotated_day_match: AnnotatedDayMatch,
}

impl From<&JournalConfig> for NormalizeOptions {
    fn from(config: &JournalConfig) -> Self {
        Self {
            offset_policy: config.offset_policy,
            annotated_day_match: config.annotated_day_match,
        }
    }
}

/// Run `convert` over every raw item, keeping the records it produces.
///
/// `Ok(None)` means the item was deliberately filtered out; `Err` means it was
/// malformed and is skipped with a warning.
pub(crate) fn collect_records<'a, T: 'a>(
    source: SourceKind,
    items: impl IntoIterator<Item = &'a T>,
    mut convert: impl FnMut(&'a T) -> Result<Option<JournalRecord>, JournalError>,
) -> Vec<JournalRecord> {
    let mut records = Vec::new();
    let mut skipped = 0usize;
    for (index, item) in items.into_iter().enumerate() {
        match convert(item) {
            Ok(Some(record)) => records.push(record),
            Ok(None) => {}
            Err(e) => {
                skipped += 1;
                warn!(%source, index, error = %e, "Skipping malformed record");
            }
        }
    }
    debug!(%source, kept = records.len(), skipped, "Normalized payload");
    records
}

/// Fetch a required text field or report the item as malformed.
pub(crate) fn required<'a>(
    source: SourceKind,
    value: Option<&'a String>,
    field: &str,
) -> Result<&'a str, JournalError> {
    value
        .map(String::as_str)
        .ok_or_else(|| JournalError::malformed(source, format!("missing `{field}`")))
}
