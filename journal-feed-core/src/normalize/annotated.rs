//! The annotated-entry feed has no server-side date filter, so entries are
//! re-filtered here. By default the day portion of `time` is compared as text
//! against [`DayWindow::day_text`], which is how the upstream feed's own
//! rendering is matched; the interval mode parses the time instead.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{collect_records, required, NormalizeOptions, Normalizer};
use crate::config::AnnotatedDayMatch;
use crate::error::JournalError;
use crate::record::{JournalRecord, SourceKind};
use crate::timeparse::parse_lenient;
use crate::window::{strip_day_padding, DayWindow};

/// Literal that joins an entry's text and its sentiment label.
pub const SENTIMENT_SEPARATOR: &str = " , sentiment: ";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedFeed {
    #[serde(default)]
    pub entries: Vec<AnnotatedEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedEntry {
    /// e.g. `"March 01 2024 at 10:00am"`.
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub sentiment: Option<String>,
}

impl AnnotatedEntry {
    /// The entry's day as rendered by the feed, padding stripped.
    pub fn day_text(time: &str) -> String {
        strip_day_padding(time.split("at").next().unwrap_or_default())
    }

    /// Entry text with the rendered sentiment appended, when there is one.
    pub fn render_message(text: &str, sentiment: Option<&str>) -> String {
        match sentiment {
            Some(sentiment) => format!("{text}{SENTIMENT_SEPARATOR}{sentiment}"),
            None => text.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AnnotatedEntryNormalizer {
    options: NormalizeOptions,
}

impl AnnotatedEntryNormalizer {
    pub fn new(options: NormalizeOptions) -> Self {
        Self { options }
    }
}

impl Normalizer for AnnotatedEntryNormalizer {
    type Payload = AnnotatedFeed;
    const SOURCE: SourceKind = SourceKind::AnnotatedEntry;

    fn normalize(&self, payload: Option<&AnnotatedFeed>, window: &DayWindow) -> Vec<JournalRecord> {
        let Some(feed) = payload else {
            return Vec::new();
        };
        let filter = match self.options.annotated_day_match {
            AnnotatedDayMatch::Textual => window.filter_for(Self::SOURCE),
            AnnotatedDayMatch::Interval => window.instants(),
        };

        collect_records(Self::SOURCE, &feed.entries, |entry| {
            let time = required(Self::SOURCE, entry.time.as_ref(), "time")?;

            let entry_day = AnnotatedEntry::day_text(time);
            if !filter.admits_day_text(&entry_day) {
                debug!(entry_day = %entry_day, filter = ?filter, "Entry outside target day");
                return Ok(None);
            }

            let text = required(Self::SOURCE, entry.text.as_ref(), "text")?;
            let timestamp = parse_lenient(time)
                .ok_or_else(|| {
                    JournalError::malformed(Self::SOURCE, format!("unparseable time {time:?}"))
                })?
                .resolve(self.options.offset_policy, window.reference());

            if !filter.admits_instant(timestamp) {
                debug!(%timestamp, "Entry outside target day window");
                return Ok(None);
            }

            let message = AnnotatedEntry::render_message(text, entry.sentiment.as_deref());
            Ok(Some(JournalRecord::new(Self::SOURCE, timestamp, message)))
        })
    }
}
