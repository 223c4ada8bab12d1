//! Lenient parsing for the timestamp shapes the sources emit.
//!
//! Sources disagree on format: ISO-8601 with an offset, month-first US dates,
//! and "March 01 2024 at 10:00am" style strings. [`parse_lenient`] tries each
//! known shape in turn and keeps the offset when one was present, so the
//! caller's [`OffsetPolicy`] decides how it maps to the reference zone.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};

use crate::config::OffsetPolicy;

const OFFSET_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%B %d %Y at %I:%M%p",
    "%B %d %Y at %I:%M %p",
    "%B %d %Y at %I:%M:%S%p",
    "%B %d %Y at %H:%M:%S",
    "%B %d %Y at %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%B %d %Y"];

/// A parsed timestamp, with its offset when the source supplied one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedTime {
    Naive(NaiveDateTime),
    Offset(DateTime<FixedOffset>),
}

impl ParsedTime {
    /// Map to naive wall-clock time in `reference` according to `policy`.
    pub fn resolve(self, policy: OffsetPolicy, reference: FixedOffset) -> NaiveDateTime {
        match (self, policy) {
            (ParsedTime::Naive(naive), _) => naive,
            (ParsedTime::Offset(dt), OffsetPolicy::Strip) => dt.naive_local(),
            (ParsedTime::Offset(dt), OffsetPolicy::Convert) => {
                dt.with_timezone(&reference).naive_local()
            }
        }
    }
}

/// Parse any of the supported shapes. Returns `None` when nothing matches.
pub fn parse_lenient(raw: &str) -> Option<ParsedTime> {
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(ParsedTime::Offset(dt));
    }
    if let Some(dt) = OFFSET_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(text, fmt).ok())
    {
        return Some(ParsedTime::Offset(dt));
    }
    if let Some(naive) =
        parse_naive(text).or_else(|| expand_bare_hour(text).and_then(|t| parse_naive(&t)))
    {
        return Some(ParsedTime::Naive(naive));
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(ParsedTime::Naive)
}

fn parse_naive(text: &str) -> Option<NaiveDateTime> {
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
}

/// Rewrite an hour-only clock (`"at 10am"`, `"at 9 PM"`) to `h:00am`.
///
/// chrono's `%I%p` needs minutes.
fn expand_bare_hour(text: &str) -> Option<String> {
    let split = text.len().checked_sub(2)?;
    if !text.is_char_boundary(split) {
        return None;
    }
    let (clock, meridiem) = text.split_at(split);
    if !meridiem.eq_ignore_ascii_case("am") && !meridiem.eq_ignore_ascii_case("pm") {
        return None;
    }
    let clock = clock.trim_end();
    let prefix = clock.trim_end_matches(|c: char| c.is_ascii_digit());
    let hour = &clock[prefix.len()..];
    if !(1..=2).contains(&hour.len()) || !prefix.ends_with(' ') {
        return None;
    }
    Some(format!("{prefix}{hour}:00{meridiem}"))
}

/// Whole epoch seconds to naive wall-clock time in `reference`.
pub fn from_epoch_seconds(secs: i64, reference: FixedOffset) -> Option<NaiveDateTime> {
    DateTime::from_timestamp(secs, 0).map(|utc| utc.with_timezone(&reference).naive_local())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    #[test]
    fn iso_with_offset_keeps_offset() {
        let parsed = parse_lenient("2024-03-01T10:15:00+02:00").unwrap();
        assert!(matches!(parsed, ParsedTime::Offset(_)));
        assert_eq!(
            parsed.resolve(OffsetPolicy::Strip, utc()),
            at(2024, 3, 1, 10, 15, 0)
        );
        assert_eq!(
            parsed.resolve(OffsetPolicy::Convert, utc()),
            at(2024, 3, 1, 8, 15, 0)
        );
    }

    #[test]
    fn zulu_suffix_is_an_offset() {
        let parsed = parse_lenient("2024-03-01T23:30:00Z").unwrap();
        let plus_one = FixedOffset::east_opt(3600).unwrap();
        assert_eq!(
            parsed.resolve(OffsetPolicy::Convert, plus_one),
            at(2024, 3, 2, 0, 30, 0)
        );
    }

    #[test]
    fn month_first_table_dates() {
        assert_eq!(
            parse_lenient("03/01/2024 09:00:00"),
            Some(ParsedTime::Naive(at(2024, 3, 1, 9, 0, 0)))
        );
        assert_eq!(
            parse_lenient("03/01/2024"),
            Some(ParsedTime::Naive(at(2024, 3, 1, 0, 0, 0)))
        );
    }

    #[rstest]
    #[case::padded_minutes("March 01 2024 at 10:00am", at(2024, 3, 1, 10, 0, 0))]
    #[case::upper_meridiem("March 1 2024 at 3:05PM", at(2024, 3, 1, 15, 5, 0))]
    #[case::spaced_meridiem("March 1 2024 at 3:05 pm", at(2024, 3, 1, 15, 5, 0))]
    #[case::twenty_four_hour("March 1 2024 at 17:45", at(2024, 3, 1, 17, 45, 0))]
    #[case::hour_only("March 01 2024 at 10am", at(2024, 3, 1, 10, 0, 0))]
    #[case::hour_only_spaced("March 1 2024 at 9 PM", at(2024, 3, 1, 21, 0, 0))]
    #[case::midnight_hour_only("March 1 2024 at 12am", at(2024, 3, 1, 0, 0, 0))]
    fn annotated_entry_clock_forms(#[case] raw: &str, #[case] expected: NaiveDateTime) {
        assert_eq!(
            parse_lenient(raw),
            Some(ParsedTime::Naive(expected)),
            "parsing {raw:?}"
        );
    }

    #[test]
    fn bare_hour_rewrite_needs_a_lone_hour() {
        assert_eq!(
            expand_bare_hour("March 1 2024 at 7pm").as_deref(),
            Some("March 1 2024 at 7:00pm")
        );
        assert_eq!(expand_bare_hour("March 1 2024 at 7:30pm"), None);
        assert_eq!(expand_bare_hour("March 1 2024 at 123pm"), None);
        assert_eq!(expand_bare_hour("March 1 2024"), None);
    }

    #[test]
    fn garbage_is_rejected() {
        assert_eq!(parse_lenient(""), None);
        assert_eq!(parse_lenient("yesterday-ish"), None);
        assert_eq!(parse_lenient("13/45/2024 09:00:00"), None);
    }

    #[test]
    fn epoch_seconds_follow_reference_zone() {
        assert_eq!(
            from_epoch_seconds(1_700_000_000, utc()),
            Some(at(2023, 11, 14, 22, 13, 20))
        );
        let plus_two = FixedOffset::east_opt(7200).unwrap();
        assert_eq!(
            from_epoch_seconds(1_700_000_000, plus_two),
            Some(at(2023, 11, 15, 0, 13, 20))
        );
    }
}
