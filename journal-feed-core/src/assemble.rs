//! High-level pipeline: validate → fetch+normalize each source → reconcile.
//!
//! This module is the orchestration layer. For a target day it:
//!   - renders the day window once, in the configured reference zone
//!   - runs the four source branches concurrently; each branch fetches through
//!     its [`crate::contract`] client and normalizes the payload
//!   - isolates every branch behind its own timeout and error boundary
//!   - reconciles whatever came back into one ordered feed
//!
//! # Error Handling
//! Only an invalid date aborts, and it does so before any fetch. A failing or
//! timed-out source contributes no records and is listed in
//! [`JournalReport::failures`]; the other sources are unaffected.
//!
//! # Navigation
//! - Main entrypoints: [`fetch_journal`], [`assemble`]
//! - Output: [`JournalReport`]

use std::future::Future;
use std::time::Duration;

use chrono::NaiveDate;
use tracing::{debug, error, info, warn};

use crate::config::JournalConfig;
use crate::contract::{FetchError, Sources};
use crate::date::{validate_target_date, TargetDate};
use crate::error::JournalError;
use crate::normalize::{
    AnnotatedEntryNormalizer, ChannelNormalizer, CommitLogNormalizer, NormalizeOptions,
    Normalizer, TableStoreNormalizer,
};
use crate::reconcile::reconcile;
use crate::record::{JournalRecord, SourceKind};
use crate::window::DayWindow;

/// Everything that could be assembled for one day.
#[derive(Debug)]
pub struct JournalReport {
    pub date: NaiveDate,
    /// The day lies after the date validation ran on; expect an empty feed.
    pub is_future: bool,
    /// Reconciled feed, ascending by timestamp.
    pub records: Vec<JournalRecord>,
    /// Sources that failed or timed out, in source priority order.
    pub failures: Vec<SourceFailure>,
}

impl JournalReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Debug)]
pub struct SourceFailure {
    pub source: SourceKind,
    pub error: JournalError,
}

/// Validate `date_text` (DD/MM/YYYY) against `today`, then [`assemble`].
pub async fn fetch_journal(
    date_text: &str,
    today: NaiveDate,
    sources: &Sources<'_>,
    config: &JournalConfig,
) -> Result<JournalReport, JournalError> {
    let target = validate_target_date(date_text, today).map_err(|e| {
        error!(error = %e, "[ASSEMBLE][ERROR] Target date rejected, no source fetched");
        e
    })?;
    Ok(assemble(&target, sources, config).await)
}

/// Fetch, normalize and reconcile all configured sources for `target`.
pub async fn assemble(
    target: &TargetDate,
    sources: &Sources<'_>,
    config: &JournalConfig,
) -> JournalReport {
    let window = DayWindow::new(target.date, config.reference_offset());
    let options = NormalizeOptions::from(config);
    let limit = config.source_timeout();
    info!(
        date = %target.date,
        future = target.is_future,
        sources = sources.configured_count(),
        timeout_secs = limit.as_secs(),
        "[ASSEMBLE] Starting journal assembly"
    );

    let query_key = window.query_key();
    let (mut table_store, mut channel, mut commit_log, mut annotated) = futures::join!(
        run_branch(
            TableStoreNormalizer::new(options),
            sources.table_store.map(|c| c.scan_day(&query_key)),
            &window,
            limit,
        ),
        run_branch(
            ChannelNormalizer,
            sources
                .channel
                .map(|c| c.history(window.start_epoch(), window.end_epoch())),
            &window,
            limit,
        ),
        run_branch(
            CommitLogNormalizer::new(options),
            sources
                .commit_log
                .map(|c| c.commits(window.start(), window.end())),
            &window,
            limit,
        ),
        run_branch(
            AnnotatedEntryNormalizer::new(options),
            sources.annotated.map(|c| c.entries()),
            &window,
            limit,
        ),
    );

    let failures: Vec<SourceFailure> = [
        &mut table_store,
        &mut channel,
        &mut commit_log,
        &mut annotated,
    ]
    .into_iter()
    .filter_map(|branch| branch.failure.take())
    .collect();

    let records = reconcile(
        table_store.records,
        channel.records,
        commit_log.records,
        annotated.records,
    );
    info!(
        date = %target.date,
        records = records.len(),
        failed_sources = failures.len(),
        "[ASSEMBLE] Journal assembled"
    );

    JournalReport {
        date: target.date,
        is_future: target.is_future,
        records,
        failures,
    }
}

struct Branch {
    records: Option<Vec<JournalRecord>>,
    failure: Option<SourceFailure>,
}

async fn run_branch<N, F>(
    normalizer: N,
    fetch: Option<F>,
    window: &DayWindow,
    limit: Duration,
) -> Branch
where
    N: Normalizer,
    F: Future<Output = Result<N::Payload, FetchError>>,
{
    let source = N::SOURCE;
    let Some(fetch) = fetch else {
        debug!(%source, "[ASSEMBLE] Source not configured, skipping");
        return Branch {
            records: None,
            failure: None,
        };
    };

    debug!(%source, filter = ?window.filter_for(source), "[ASSEMBLE] Fetching source");
    match tokio::time::timeout(limit, fetch).await {
        Ok(Ok(payload)) => {
            let records = normalizer.normalize(Some(&payload), window);
            info!(%source, records = records.len(), "[ASSEMBLE] Source normalized");
            Branch {
                records: Some(records),
                failure: None,
            }
        }
        Ok(Err(e)) => {
            warn!(%source, error = %e, "[ASSEMBLE][WARN] Source fetch failed, continuing without it");
            Branch {
                records: None,
                failure: Some(SourceFailure {
                    source,
                    error: JournalError::SourceFetch {
                        kind: source,
                        message: e.to_string(),
                    },
                }),
            }
        }
        Err(_) => {
            warn!(%source, timeout_secs = limit.as_secs(), "[ASSEMBLE][WARN] Source timed out, continuing without it");
            Branch {
                records: None,
                failure: Some(SourceFailure {
                    source,
                    error: JournalError::SourceTimeout {
                        kind: source,
                        seconds: limit.as_secs(),
                    },
                }),
            }
        }
    }
}
