///
/// This module implements the CLI interface for journal-feed: command parsing,
/// argument validation, the async entrypoint and the final rendering of the feed.
///
/// All pipeline logic (normalizers, day windows, reconciliation) lives in the
/// [`journal-feed-core`] crate. This module is CLI glue only.
///
/// ## How To Use
/// - From the shell: `journal-feed fetch 01/03/2024 --config journal.yaml`
/// - Programmatically or from tests: call [`run`] with a constructed [`Cli`].
///
/// [`journal-feed-core`]: ../../journal-feed-core/
use crate::clients::HttpSources;
use crate::load_config::{load_config, CliConfig};
use anyhow::Result;
use clap::{Parser, Subcommand};
use journal_feed_core::date::validate_target_date_today;
use journal_feed_core::{assemble, JournalRecord};
use serde::Serialize;
use std::path::PathBuf;

/// How timestamps are rendered in the printed journal.
pub const DISPLAY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// CLI for journal-feed: rebuild one day's activity from every source.
#[derive(Parser)]
#[clap(
    name = "journal-feed",
    version,
    about = "Reconstruct a day's journal from table store, channel, commit log and annotated entries"
)]
pub struct Cli {
    /// Increase output verbosity
    #[clap(short, long, global = true)]
    pub verbose: bool,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch and merge all sources for one day
    Fetch {
        /// Target date in DD/MM/YYYY
        date: String,
        /// Path to the YAML config file
        #[clap(long)]
        config: Option<PathBuf>,
    },
}

/// One printed journal line.
#[derive(Debug, Serialize)]
pub struct JournalLine<'a> {
    pub datetime: String,
    pub message: &'a str,
    pub author: Option<&'a str>,
    pub source: &'static str,
}

impl<'a> From<&'a JournalRecord> for JournalLine<'a> {
    fn from(record: &'a JournalRecord) -> Self {
        Self {
            datetime: record.timestamp.format(DISPLAY_TIMESTAMP_FORMAT).to_string(),
            message: &record.message,
            author: record.author.as_deref(),
            source: record.source.as_str(),
        }
    }
}

/// Render the feed as a pretty-printed JSON array.
pub fn render_journal(records: &[JournalRecord]) -> Result<String> {
    let lines: Vec<JournalLine<'_>> = records.iter().map(JournalLine::from).collect();
    Ok(serde_json::to_string_pretty(&lines)?)
}

/// Async CLI entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Fetch { date, config } => {
            tracing::debug!(date = %date, "Your argument");
            let target = validate_target_date_today(&date).map_err(|e| {
                tracing::error!(command = "fetch", error = %e, "Target date rejected");
                e
            })?;

            let config = match config {
                Some(path) => load_config(path)?,
                None => {
                    tracing::info!("No config file given, no sources will be queried");
                    CliConfig::default()
                }
            };
            config.journal.trace_loaded();

            let clients = HttpSources::from_config(&config.sources)?;
            let report = assemble(&target, &clients.as_sources(), &config.journal).await;

            if report.is_future {
                tracing::warn!(
                    command = "fetch",
                    date = %report.date,
                    "Target date is in the future, the journal is expected to be empty"
                );
            }
            for failure in &report.failures {
                tracing::warn!(
                    command = "fetch",
                    source = %failure.source,
                    error = %failure.error,
                    "Source unavailable, journal is partial"
                );
            }
            tracing::info!(
                command = "fetch",
                records = report.records.len(),
                complete = report.is_complete(),
                "Journal assembled"
            );

            println!("{}", render_journal(&report.records)?);
            Ok(())
        }
    }
}
