//! Per-source day boundaries for the target date.
//!
//! Each source encodes "which day" differently, so the window renders the
//! same calendar day in three forms: instant bounds for sources queried by
//! range, a date key for the pre-filtered table scan, and the textual
//! "Month Day Year" form the annotated-entry feed is matched against.

use chrono::{FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike};

use crate::record::SourceKind;

/// Date key format the table-store query filters on.
pub const QUERY_KEY_FORMAT: &str = "%m/%d/%Y";

/// Format the annotated-entry feed renders its day portion in.
pub const DAY_TEXT_FORMAT: &str = "%B %d %Y";

/// How a source decides which raw items belong to the day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DayFilter {
    /// Inclusive wall-clock bounds, passed to the external query.
    Instants {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
    /// The external query is filtered on this key; nothing is re-checked locally.
    QueryKey(String),
    /// Raw items are kept only when their rendered day equals this text.
    DayText(String),
}

impl DayFilter {
    /// Whether an item whose day renders as `rendered_day` passes.
    ///
    /// Only [`DayFilter::DayText`] inspects the text; the other variants admit it.
    pub fn admits_day_text(&self, rendered_day: &str) -> bool {
        match self {
            DayFilter::DayText(target) => strip_day_padding(rendered_day) == *target,
            DayFilter::Instants { .. } | DayFilter::QueryKey(_) => true,
        }
    }

    /// Whether a resolved timestamp passes.
    ///
    /// Only [`DayFilter::Instants`] inspects it. Sub-second values after the
    /// last second still belong to the day.
    pub fn admits_instant(&self, ts: NaiveDateTime) -> bool {
        match self {
            DayFilter::Instants { start, end } => {
                let whole = ts.with_nanosecond(0).unwrap_or(ts);
                (*start..=*end).contains(&whole)
            }
            DayFilter::QueryKey(_) | DayFilter::DayText(_) => true,
        }
    }
}

/// The target calendar day, anchored in the reference zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    date: NaiveDate,
    reference: FixedOffset,
}

impl DayWindow {
    pub fn new(date: NaiveDate, reference: FixedOffset) -> Self {
        Self { date, reference }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn reference(&self) -> FixedOffset {
        self.reference
    }

    /// First second of the day.
    pub fn start(&self) -> NaiveDateTime {
        self.date.and_time(NaiveTime::MIN)
    }

    /// Last whole second of the day (23:59:59), inclusive.
    pub fn end(&self) -> NaiveDateTime {
        self.date.and_time(last_second())
    }

    /// `start()` as epoch seconds, read in the reference zone.
    pub fn start_epoch(&self) -> i64 {
        self.epoch_of(self.start())
    }

    /// `end()` as epoch seconds, read in the reference zone.
    pub fn end_epoch(&self) -> i64 {
        self.epoch_of(self.end())
    }

    /// The table-store filter key, e.g. `03/01/2024`.
    pub fn query_key(&self) -> String {
        self.date.format(QUERY_KEY_FORMAT).to_string()
    }

    /// The annotated-entry day text, e.g. `March 1 2024`.
    pub fn day_text(&self) -> String {
        strip_day_padding(&self.date.format(DAY_TEXT_FORMAT).to_string())
    }

    /// Whether a wall-clock timestamp falls within `[start, end]`.
    ///
    /// Sub-second values after 23:59:59 still belong to the day.
    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        self.instants().admits_instant(ts)
    }

    /// `[start, end]` as a filter.
    pub fn instants(&self) -> DayFilter {
        DayFilter::Instants {
            start: self.start(),
            end: self.end(),
        }
    }

    /// The filter each source applies for this day.
    pub fn filter_for(&self, source: SourceKind) -> DayFilter {
        match source {
            SourceKind::TableStore => DayFilter::QueryKey(self.query_key()),
            SourceKind::Channel | SourceKind::CommitLog => self.instants(),
            SourceKind::AnnotatedEntry => DayFilter::DayText(self.day_text()),
        }
    }

    fn epoch_of(&self, naive: NaiveDateTime) -> i64 {
        // A fixed offset maps every local time to exactly one instant.
        self.reference
            .from_local_datetime(&naive)
            .single()
            .map(|dt| dt.timestamp())
            .unwrap_or_else(|| naive.and_utc().timestamp())
    }
}

fn last_second() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN)
}

/// Normalize a rendered day so `"March 01 2024"` and `"March 1 2024"` compare equal.
///
/// Strips leading zeros from the whole string, turns every `" 0"` into `" "`,
/// then trims surrounding whitespace.
pub fn strip_day_padding(text: &str) -> String {
    text.trim_start_matches('0')
        .replace(" 0", " ")
        .trim()
        .to_string()
}
