use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// How timestamps that carry their own UTC offset are mapped to the reference zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OffsetPolicy {
    /// Drop the offset and keep the literal clock time.
    #[default]
    Strip,
    /// Shift the instant into the reference zone.
    Convert,
}

/// How the annotated-entry source decides whether an entry belongs to the target day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotatedDayMatch {
    /// Compare the rendered "Month Day Year" strings exactly.
    #[default]
    Textual,
    /// Parse the entry time and test it against the day window.
    Interval,
}

/// Pipeline configuration shared by every source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalConfig {
    /// Offset of the reference zone, in minutes east of UTC.
    #[serde(default)]
    pub reference_utc_offset_minutes: i32,
    #[serde(default)]
    pub offset_policy: OffsetPolicy,
    #[serde(default)]
    pub annotated_day_match: AnnotatedDayMatch,
    /// Per-source fetch limit. Zero is rejected.
    #[serde(
        default = "default_source_timeout_secs",
        deserialize_with = "deserialize_timeout_secs"
    )]
    pub source_timeout_secs: u64,
}

fn default_source_timeout_secs() -> u64 {
    30
}

fn deserialize_timeout_secs<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let secs = u64::deserialize(deserializer)?;
    if secs == 0 {
        return Err(serde::de::Error::custom(
            "source_timeout_secs must be at least 1",
        ));
    }
    Ok(secs)
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            reference_utc_offset_minutes: 0,
            offset_policy: OffsetPolicy::default(),
            annotated_day_match: AnnotatedDayMatch::default(),
            source_timeout_secs: default_source_timeout_secs(),
        }
    }
}

impl JournalConfig {
    /// The reference zone. Out-of-range offsets fall back to UTC.
    pub fn reference_offset(&self) -> FixedOffset {
        self.reference_utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| Utc.fix())
    }

    /// At least one second, whatever the field holds.
    pub fn source_timeout(&self) -> Duration {
        Duration::from_secs(self.source_timeout_secs.max(1))
    }

    pub fn trace_loaded(&self) {
        info!(
            reference_utc_offset_minutes = self.reference_utc_offset_minutes,
            offset_policy = ?self.offset_policy,
            annotated_day_match = ?self.annotated_day_match,
            source_timeout_secs = self.source_timeout_secs,
            "Loaded JournalConfig"
        );
        debug!(?self, "JournalConfig loaded (full debug)");
    }
}
