//! # contract: the interface the pipeline consumes from each source
//!
//! The core never talks to the network. Each source is reached through one
//! async trait below; the CLI crate implements them over HTTP and tests use
//! the generated `mockall` mocks.
//!
//! ## Contract
//! - Each method receives the day bounds already rendered in the form the
//!   source's query understands (see [`crate::window::DayWindow`]).
//! - Any transport, auth or status failure is returned as a [`FetchError`];
//!   the pipeline isolates it to that source.
//! - Implementations return the payload untouched. Parsing and day filtering
//!   belong to [`crate::normalize`].
//!
//! ## Mocking & Testing
//! Mocks (`MockTableStoreClient`, `MockChannelClient`, ...) are exported under
//! the `test-export-mocks` feature so downstream crates can use them too.

use async_trait::async_trait;
use chrono::NaiveDateTime;

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

pub use crate::error::FetchError;
use crate::normalize::{AnnotatedFeed, ChannelHistory, CommitItem, TableScan};

/// Key-value table, scanned with a filter on the day key (`%m/%d/%Y`).
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait TableStoreClient: Send + Sync {
    async fn scan_day(&self, query_key: &str) -> Result<TableScan, FetchError>;
}

/// Chat channel history between two epoch-second bounds (inclusive).
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ChannelClient: Send + Sync {
    async fn history(&self, oldest: i64, latest: i64) -> Result<ChannelHistory, FetchError>;
}

/// Commit listing between two wall-clock instants.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait CommitLogClient: Send + Sync {
    async fn commits(
        &self,
        since: NaiveDateTime,
        until: NaiveDateTime,
    ) -> Result<Vec<CommitItem>, FetchError>;
}

/// Free-text entries with sentiment. No server-side date filter exists.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait AnnotatedEntryClient: Send + Sync {
    async fn entries(&self) -> Result<AnnotatedFeed, FetchError>;
}

/// The set of configured sources. A `None` source is simply not queried.
#[derive(Default)]
pub struct Sources<'a> {
    pub table_store: Option<&'a dyn TableStoreClient>,
    pub channel: Option<&'a dyn ChannelClient>,
    pub commit_log: Option<&'a dyn CommitLogClient>,
    pub annotated: Option<&'a dyn AnnotatedEntryClient>,
}

impl Sources<'_> {
    pub fn configured_count(&self) -> usize {
        [
            self.table_store.is_some(),
            self.channel.is_some(),
            self.commit_log.is_some(),
            self.annotated.is_some(),
        ]
        .into_iter()
        .filter(|configured| *configured)
        .count()
    }
}
