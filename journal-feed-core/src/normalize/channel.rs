use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{collect_records, required, Normalizer};
use crate::error::JournalError;
use crate::record::{JournalRecord, SourceKind};
use crate::timeparse::from_epoch_seconds;
use crate::window::DayWindow;

/// A channel history page, fetched between the window's epoch bounds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelHistory {
    #[serde(default)]
    pub ok: Option<bool>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub messages: Vec<ChannelMessage>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelMessage {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub ts: Option<ChannelTs>,
    /// Non-message events (joins, topic changes) carry a subtype. Not filtered yet.
    #[serde(default)]
    pub subtype: Option<String>,
}

/// Fixed-point epoch seconds, e.g. `"1700000000.000200"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChannelTs {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl ChannelTs {
    /// The value truncated to whole seconds.
    pub fn whole_seconds(&self) -> Option<i64> {
        match self {
            ChannelTs::Integer(secs) => Some(*secs),
            ChannelTs::Float(secs) if secs.is_finite() => Some(secs.trunc() as i64),
            ChannelTs::Float(_) => None,
            ChannelTs::Text(text) => text.trim().split('.').next()?.parse().ok(),
        }
    }
}

impl std::fmt::Display for ChannelTs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChannelTs::Integer(secs) => write!(f, "{secs}"),
            ChannelTs::Float(secs) => write!(f, "{secs}"),
            ChannelTs::Text(text) => f.write_str(text),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ChannelNormalizer;

impl Normalizer for ChannelNormalizer {
    type Payload = ChannelHistory;
    const SOURCE: SourceKind = SourceKind::Channel;

    fn normalize(&self, payload: Option<&ChannelHistory>, window: &DayWindow) -> Vec<JournalRecord> {
        let Some(history) = payload else {
            return Vec::new();
        };
        collect_records(Self::SOURCE, &history.messages, |message| {
            let text = required(Self::SOURCE, message.text.as_ref(), "text")?;
            let ts = message
                .ts
                .as_ref()
                .ok_or_else(|| JournalError::malformed(Self::SOURCE, "missing `ts`"))?;
            let timestamp = ts
                .whole_seconds()
                .and_then(|secs| from_epoch_seconds(secs, window.reference()))
                .ok_or_else(|| {
                    JournalError::malformed(Self::SOURCE, format!("unparseable ts {ts}"))
                })?;
            if let Some(subtype) = &message.subtype {
                debug!(subtype = %subtype, %ts, "Channel message carries a subtype");
            }

            Ok(Some(
                JournalRecord::new(Self::SOURCE, timestamp, text)
                    .with_author(message.user.as_deref()),
            ))
        })
    }
}
