//! Merge the per-source record sequences into one chronological feed.

use tracing::debug;

use crate::record::JournalRecord;

/// Concatenate the four sequences (table-store, channel, commit-log,
/// annotated-entry; absent ones count as empty) and stable-sort by timestamp.
///
/// Records with equal timestamps keep their concatenation order. Nothing is
/// deduplicated.
pub fn reconcile(
    table_store: Option<Vec<JournalRecord>>,
    channel: Option<Vec<JournalRecord>>,
    commit_log: Option<Vec<JournalRecord>>,
    annotated: Option<Vec<JournalRecord>>,
) -> Vec<JournalRecord> {
    let mut feed: Vec<JournalRecord> = [table_store, channel, commit_log, annotated]
        .into_iter()
        .flatten()
        .flatten()
        .collect();

    // `sort_by_key` is stable.
    feed.sort_by_key(|record| record.timestamp);
    debug!(records = feed.len(), "Reconciled feed");
    feed
}
