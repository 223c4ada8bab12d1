/// `load_config` module: Loads a static YAML config into the pipeline settings and source endpoints.
///
/// This module is the only place where user-supplied YAML is parsed and mapped to typed structs.
///
/// # Responsibilities
/// - Parse the config file into [`CliConfig`]: the core [`JournalConfig`] plus one optional
///   endpoint section per source
/// - Keep secrets out of the file: tokens and API keys are read from the environment by
///   [`crate::clients`] when the clients are built
/// - Surface clear diagnostics: any read or parse failure is an `anyhow::Error` with the path
///
/// A source whose section is absent is not queried. No config at all is valid and yields an
/// empty journal.
///
/// # Example
///
/// ```yaml
/// journal:
///   reference_utc_offset_minutes: 60
///   offset_policy: strip
///   annotated_day_match: textual
///   source_timeout_secs: 20
/// sources:
///   table_store:
///     base_url: https://tables.example.com
///     table: journal
///   channel:
///     base_url: https://slack.com/api
///     channel_id: C0123456
///   commit_log:
///     base_url: https://api.github.com
///     owner: example
///     repo: journal
///   annotated_entry:
///     url: https://entries.example.com/feed
/// ```
use anyhow::Result;
use journal_feed_core::JournalConfig;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{error, info};

#[derive(Debug, Default, Deserialize)]
pub struct CliConfig {
    #[serde(default)]
    pub journal: JournalConfig,
    #[serde(default)]
    pub sources: SourcesSection,
}

#[derive(Debug, Default, Deserialize)]
pub struct SourcesSection {
    #[serde(default)]
    pub table_store: Option<TableStoreSection>,
    #[serde(default)]
    pub channel: Option<ChannelSection>,
    #[serde(default)]
    pub commit_log: Option<CommitLogSection>,
    #[serde(default)]
    pub annotated_entry: Option<AnnotatedEntrySection>,
}

/// HTTP gateway in front of the key-value table. Secret: `TABLE_STORE_API_KEY`.
#[derive(Debug, Clone, Deserialize)]
pub struct TableStoreSection {
    pub base_url: String,
    pub table: String,
}

/// Chat channel history API. Secret: `CHANNEL_TOKEN`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelSection {
    pub base_url: String,
    pub channel_id: String,
    #[serde(default = "default_channel_page_size")]
    pub page_size: u32,
}

fn default_channel_page_size() -> u32 {
    100
}

/// Repository commit listing API. Optional secret: `COMMIT_LOG_TOKEN`.
#[derive(Debug, Clone, Deserialize)]
pub struct CommitLogSection {
    pub base_url: String,
    pub owner: String,
    pub repo: String,
}

/// Annotated entry feed, a single JSON document.
#[derive(Debug, Clone, Deserialize)]
pub struct AnnotatedEntrySection {
    pub url: String,
}

/// Loads a static YAML config file (no secrets).
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CliConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    // An empty file is an empty mapping, not an error.
    if config_content.trim().is_empty() {
        info!(config_path = ?path_ref, "Config file is empty, using defaults");
        return Ok(CliConfig::default());
    }

    match serde_yaml::from_str::<CliConfig>(&config_content) {
        Ok(config) => {
            info!(
                config_path = ?path_ref,
                table_store = config.sources.table_store.is_some(),
                channel = config.sources.channel.is_some(),
                commit_log = config.sources.commit_log.is_some(),
                annotated_entry = config.sources.annotated_entry.is_some(),
                "Parsed config YAML successfully"
            );
            Ok(config)
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            Err(anyhow::anyhow!("Failed to parse config YAML: {e}"))
        }
    }
}
