#![doc = "journal-feed-core: normalization and reconciliation pipeline for journal-feed."]

//! Given a calendar day, this crate pulls activity from four heterogeneous
//! sources (a key-value table, a chat channel, a commit log and an annotated
//! entry feed), normalizes each into a [`JournalRecord`] and merges them into
//! one chronologically ordered feed.
//!
//! # Pipeline
//!
//! ```text
//! date ──► validate ──┬─► table-store ─────┐
//!                     ├─► channel ─────────┤
//!                     ├─► commit-log ──────┼─► reconcile ──► JournalReport
//!                     └─► annotated-entry ─┘
//! ```
//!
//! Network clients live outside this crate; they plug in through the traits
//! in [`contract`].

pub mod assemble;
pub mod config;
pub mod contract;
pub mod date;
pub mod error;
pub mod normalize;
pub mod reconcile;
pub mod record;
pub mod timeparse;
pub mod window;

pub use assemble::{assemble, fetch_journal, JournalReport, SourceFailure};
pub use config::JournalConfig;
pub use error::JournalError;
pub use record::{JournalRecord, SourceKind};
