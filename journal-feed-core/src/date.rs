//! Parsing and sanity checks for the user-supplied target date.

use chrono::{Local, NaiveDate};
use tracing::{debug, warn};

use crate::error::JournalError;

/// The only accepted input format: day/month/year.
pub const TARGET_DATE_FORMAT: &str = "%d/%m/%Y";

/// A validated target day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetDate {
    pub date: NaiveDate,
    /// Set when the date lies after the day the validation ran on.
    pub is_future: bool,
}

/// Validate `text` against `DD/MM/YYYY`, comparing with `today`.
///
/// A date later than `today` only emits a warning; it is still returned.
pub fn validate_target_date(text: &str, today: NaiveDate) -> Result<TargetDate, JournalError> {
    let invalid = || JournalError::InvalidDateFormat {
        input: text.to_string(),
    };
    if !has_date_shape(text) {
        debug!(input = text, "Target date rejected: not DD/MM/YYYY shaped");
        return Err(invalid());
    }
    let date = NaiveDate::parse_from_str(text, TARGET_DATE_FORMAT).map_err(|e| {
        debug!(input = text, error = %e, "Target date rejected");
        invalid()
    })?;

    let is_future = date > today;
    if is_future {
        warn!(%date, %today, "Date given cannot be greater than current date");
    }
    Ok(TargetDate { date, is_future })
}

/// One or two digit day and month, four digit year, nothing else.
///
/// chrono's `%Y` takes any digit count and an optional sign, and `%d` skips
/// leading whitespace, so the shape is checked before parsing.
fn has_date_shape(text: &str) -> bool {
    let digits = |part: &str, min: usize, max: usize| {
        (min..=max).contains(&part.len()) && part.bytes().all(|b| b.is_ascii_digit())
    };
    let mut parts = text.split('/');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(day), Some(month), Some(year), None) => {
            digits(day, 1, 2) && digits(month, 1, 2) && digits(year, 4, 4)
        }
        _ => false,
    }
}

/// [`validate_target_date`] against the local current date.
pub fn validate_target_date_today(text: &str) -> Result<TargetDate, JournalError> {
    validate_target_date(text, Local::now().date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn accepts_day_month_year() {
        let target = validate_target_date("01/03/2024", day(2024, 6, 1)).unwrap();
        assert_eq!(target.date, day(2024, 3, 1));
        assert!(!target.is_future);
    }

    #[test]
    fn accepts_unpadded_fields() {
        let target = validate_target_date("1/3/2024", day(2024, 6, 1)).unwrap();
        assert_eq!(target.date, day(2024, 3, 1));
    }

    #[test]
    fn rejects_other_formats() {
        for bad in [
            "2024-03-01",
            "03/01/24x",
            "31/02/2024",
            "",
            "March 1 2024",
            "01/03/24",
            "1/3/24",
            " 01/03/2024",
            "01/03/+2024",
            "01/03/2024 ",
            "01/03/02024",
        ] {
            let err = validate_target_date(bad, day(2024, 6, 1)).unwrap_err();
            assert!(
                matches!(err, JournalError::InvalidDateFormat { ref input } if input == bad),
                "expected InvalidDateFormat for {bad:?}, got {err:?}"
            );
        }
    }

    #[test]
    fn future_date_is_flagged_not_rejected() {
        let target = validate_target_date("02/06/2024", day(2024, 6, 1)).unwrap();
        assert!(target.is_future);

        let same_day = validate_target_date("01/06/2024", day(2024, 6, 1)).unwrap();
        assert!(!same_day.is_future);
    }
}
