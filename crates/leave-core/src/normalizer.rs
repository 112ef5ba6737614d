//! Canonical leave types and inclusive date spans.

use chrono::{Duration, NaiveDate};
use leave_models::LeaveType;
use thiserror::Error;

/// Errors produced while normalizing parsed entities.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("invalid date: {0:?}")]
    InvalidDate(String),

    #[error("end date {end} is before start date {start}")]
    ReversedRange { start: NaiveDate, end: NaiveDate },
}

/// Maps a free-form leave type onto a canonical category.
///
/// Matching is case-insensitive and tolerates a trailing "leave";
/// anything unrecognized is [`LeaveType::Personal`].
pub fn normalize_leave_type(raw: &str) -> LeaveType {
    let lowered = raw.trim().to_lowercase();
    let key = lowered.strip_suffix("leave").unwrap_or(&lowered).trim();
    match key {
        "sick" | "illness" | "medical" => LeaveType::Sick,
        "vacation" | "holiday" | "annual" => LeaveType::Vacation,
        _ => LeaveType::Personal,
    }
}

/// Parses an ISO `YYYY-MM-DD` date.
///
/// A `T`-separated time part is ignored; any other trailing text is an error.
pub fn parse_date(raw: &str) -> Result<NaiveDate, NormalizeError> {
    let trimmed = raw.trim();
    let date_part = trimmed.split_once('T').map_or(trimmed, |(date, _)| date);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|_| NormalizeError::InvalidDate(raw.to_string()))
}

/// An inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateSpan {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateSpan {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, NormalizeError> {
        if end < start {
            return Err(NormalizeError::ReversedRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Builds a span from two ISO date strings.
    pub fn parse(start: &str, end: &str) -> Result<Self, NormalizeError> {
        Self::new(parse_date(start)?, parse_date(end)?)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Inclusive day count; at least 1.
    pub fn days(&self) -> u32 {
        let diff = (self.end - self.start).num_days();
        u32::try_from(diff + 1).unwrap_or(u32::MAX)
    }

    /// Every date from start to end, in order.
    pub fn dates(&self) -> Vec<NaiveDate> {
        let mut dates = Vec::with_capacity(self.days() as usize);
        let mut current = self.start;
        while current <= self.end {
            dates.push(current);
            current += Duration::days(1);
        }
        dates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn test_leave_type_mapping() {
        assert_eq!(normalize_leave_type("Sick"), LeaveType::Sick);
        assert_eq!(normalize_leave_type("sick leave"), LeaveType::Sick);
        assert_eq!(normalize_leave_type("VACATION"), LeaveType::Vacation);
        assert_eq!(normalize_leave_type("Personal"), LeaveType::Personal);
        assert_eq!(normalize_leave_type("Other"), LeaveType::Personal);
        assert_eq!(normalize_leave_type(""), LeaveType::Personal);
    }

    #[test]
    fn test_three_day_span() {
        let span = DateSpan::parse("2025-11-15", "2025-11-17").unwrap();
        assert_eq!(span.days(), 3);
        assert_eq!(
            span.dates(),
            vec![d("2025-11-15"), d("2025-11-16"), d("2025-11-17")]
        );
    }

    #[test]
    fn test_single_day_span() {
        let span = DateSpan::parse("2025-11-20", "2025-11-20").unwrap();
        assert_eq!(span.days(), 1);
        assert_eq!(span.dates(), vec![d("2025-11-20")]);
    }

    #[test]
    fn test_span_crosses_month_end() {
        let span = DateSpan::parse("2025-01-30", "2025-02-02").unwrap();
        assert_eq!(span.days(), 4);
        assert_eq!(span.dates().last(), Some(&d("2025-02-02")));
    }

    #[test]
    fn test_reversed_range_is_rejected() {
        let err = DateSpan::parse("2025-11-17", "2025-11-15").unwrap_err();
        assert!(matches!(err, NormalizeError::ReversedRange { .. }));
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(d("2025-11-15T00:00:00Z"), d("2025-11-15"));
        assert!(parse_date("20/11/2025").is_err());
        assert!(parse_date("tomorrow").is_err());
        assert!(parse_date("").is_err());
    }

    #[test]
    fn test_parse_date_rejects_trailing_text() {
        assert!(parse_date("2025-11-15abc").is_err());
        assert!(parse_date("2025-11-15 extra").is_err());
        assert!(parse_date("2025-11-15T").is_ok());
    }
}
