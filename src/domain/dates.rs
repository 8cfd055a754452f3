//! Calendar date parsing and month arithmetic.

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static ISO_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("static date pattern is valid"));

/// Error returned when a date string is not a valid `YYYY-MM-DD` date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDateError {
    field: &'static str,
    value: String,
}

impl fmt::Display for ParseDateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid {} format: '{}'. Use YYYY-MM-DD format.",
            self.field, self.value
        )
    }
}

impl std::error::Error for ParseDateError {}

/// Parses a strict ISO calendar date (4-digit year, 2-digit month and day).
///
/// `field` names the date in the error message, e.g. "start date".
pub fn parse_iso_date(s: &str, field: &'static str) -> Result<NaiveDate, ParseDateError> {
    let s = s.trim();
    let err = || ParseDateError {
        field,
        value: s.to_string(),
    };

    if !ISO_DATE.is_match(s) {
        return Err(err());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| err())
}

/// Signed number of days from `today` until `date`.
pub fn days_until(date: NaiveDate, today: NaiveDate) -> i64 {
    (date - today).num_days()
}

/// A calendar month, used for budget periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    /// Returns `None` when `month` is outside 1..=12.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|_| Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).expect("validated in constructor")
    }

    pub fn last_day(&self) -> NaiveDate {
        let (y, m) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        NaiveDate::from_ymd_opt(y, m, 1)
            .and_then(|d| d.pred_opt())
            .expect("month bounds are valid dates")
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.first_day() && date <= self.last_day()
    }

    /// English month name, e.g. "February".
    pub fn month_name(&self) -> &'static str {
        const NAMES: [&str; 12] = [
            "January",
            "February",
            "March",
            "April",
            "May",
            "June",
            "July",
            "August",
            "September",
            "October",
            "November",
            "December",
        ];
        NAMES[(self.month - 1) as usize]
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.month_name(), self.year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_iso_date() {
        let d = parse_iso_date("2024-02-29", "start date").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }

    #[test]
    fn rejects_unpadded_and_other_formats() {
        assert!(parse_iso_date("2024-1-5", "start date").is_err());
        assert!(parse_iso_date("01/05/2024", "start date").is_err());
        assert!(parse_iso_date("20240105", "start date").is_err());
    }

    #[test]
    fn rejects_impossible_dates() {
        assert!(parse_iso_date("2023-02-29", "start date").is_err());
        assert!(parse_iso_date("2024-13-01", "start date").is_err());
    }

    #[test]
    fn error_names_the_field() {
        let err = parse_iso_date("tomorrow", "renewal date").unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid renewal date format: 'tomorrow'. Use YYYY-MM-DD format."
        );
    }

    #[test]
    fn days_until_is_signed() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        assert_eq!(days_until(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(), today), 5);
        assert_eq!(days_until(NaiveDate::from_ymd_opt(2024, 3, 8).unwrap(), today), -2);
    }

    #[test]
    fn month_bounds() {
        let feb = YearMonth::new(2024, 2).unwrap();
        assert_eq!(feb.first_day(), NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(feb.last_day(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());

        let dec = YearMonth::new(2023, 12).unwrap();
        assert_eq!(dec.last_day(), NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
    }

    #[test]
    fn rejects_invalid_month() {
        assert!(YearMonth::new(2024, 0).is_none());
        assert!(YearMonth::new(2024, 13).is_none());
    }

    #[test]
    fn display_uses_month_name() {
        assert_eq!(YearMonth::new(2024, 2).unwrap().to_string(), "February 2024");
    }
}
