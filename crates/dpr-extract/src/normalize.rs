//! Numeric and date normalisation for raw cells.
//!
//! - Numbers tolerate a comma decimal separator. Empty cells, missing-data
//!   sentinels and non-numeric text all become `None`, never zero.
//! - Dates arrive as spreadsheet serial numbers, native date-times or date
//!   text, and are reduced to a calendar date in the configured zone.

use std::fmt;

use chrono::{DateTime, Duration, NaiveDate};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::cell::Cell;

/// Serial numbers below this are not plausible report dates (~1949-04-15).
pub const MIN_PLAUSIBLE_SERIAL: f64 = 18_000.0;

/// Serial for 9999-12-31; anything larger cannot be a calendar date.
const MAX_SERIAL: f64 = 2_958_465.0;

// ---------------------------------------------------------------------------
// Numbers
// ---------------------------------------------------------------------------

/// Parse a cell as a finite number, or `None` when the cell carries no value.
pub fn parse_numeric(cell: &Cell, sentinels: &[String]) -> Option<f64> {
    match cell {
        Cell::Number(v) if v.is_finite() => Some(*v),
        Cell::Text(s) => {
            if sentinels.iter().any(|m| m == s) {
                return None;
            }
            let t = s.trim();
            if t.is_empty() {
                return None;
            }
            let v = t.replace(',', ".").parse::<f64>().ok()?;
            v.is_finite().then_some(v)
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Dates
// ---------------------------------------------------------------------------

/// Why a date cell could not be read as a calendar date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DateFormatError {
    Empty,
    /// A serial number outside the plausible report-date range.
    ImplausibleSerial(f64),
    /// Text that no supported date format accepts.
    Unparseable(String),
}

impl fmt::Display for DateFormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateFormatError::Empty => write!(f, "date cell is empty"),
            DateFormatError::ImplausibleSerial(v) => {
                write!(f, "date serial {v} is outside the plausible range")
            }
            DateFormatError::Unparseable(raw) => write!(f, "'{raw}' is not a recognised date"),
        }
    }
}

impl std::error::Error for DateFormatError {}

const TEXT_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d.%m.%Y", "%m/%d/%Y", "%Y/%m/%d", "%d-%m-%Y"];

/// Reduce a date cell to a calendar date in `tz`.
pub fn normalize_date(cell: &Cell, tz: Tz) -> Result<NaiveDate, DateFormatError> {
    match cell {
        Cell::Empty => Err(DateFormatError::Empty),
        Cell::Number(v) => serial_to_date(*v),
        Cell::DateTime(dt) => Ok(dt.with_timezone(&tz).date_naive()),
        Cell::Bool(b) => Err(DateFormatError::Unparseable(b.to_string())),
        Cell::Text(s) => parse_date_text(s, tz),
    }
}

/// Spreadsheet serial (days since 1899-12-30) to a calendar date.
///
/// The fractional part is time of day and is dropped.
pub fn serial_to_date(v: f64) -> Result<NaiveDate, DateFormatError> {
    if !v.is_finite() || v < MIN_PLAUSIBLE_SERIAL || v > MAX_SERIAL {
        return Err(DateFormatError::ImplausibleSerial(v));
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30).ok_or(DateFormatError::ImplausibleSerial(v))?;
    epoch
        .checked_add_signed(Duration::days(v.floor() as i64))
        .ok_or(DateFormatError::ImplausibleSerial(v))
}

fn parse_date_text(raw: &str, tz: Tz) -> Result<NaiveDate, DateFormatError> {
    let t = raw.trim();
    if t.is_empty() {
        return Err(DateFormatError::Empty);
    }

    // A serial exported as text ("45355" or "45355,5").
    if let Ok(v) = t.replace(',', ".").parse::<f64>() {
        return serial_to_date(v);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(t) {
        return Ok(dt.with_timezone(&tz).date_naive());
    }

    for fmt in TEXT_DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(t, fmt) {
            return Ok(d);
        }
    }

    // "2024-03-05 00:00:00" and friends: keep the date part.
    if let Some((date_part, _)) = t.split_once(' ') {
        for fmt in TEXT_DATE_FORMATS {
            if let Ok(d) = NaiveDate::parse_from_str(date_part, fmt) {
                return Ok(d);
            }
        }
    }

    Err(DateFormatError::Unparseable(raw.to_string()))
}

/// Like [`normalize_date`] but an invalid cell just means "no date".
pub fn optional_date(cell: &Cell, tz: Tz) -> Option<NaiveDate> {
    normalize_date(cell, tz).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Asia::Baku;

    fn sentinels() -> Vec<String> {
        vec!["y".to_string(), "Y".to_string()]
    }

    #[test]
    fn comma_decimal_is_accepted() {
        assert_eq!(parse_numeric(&Cell::text("12,5"), &sentinels()), Some(12.5));
        assert_eq!(parse_numeric(&Cell::text(" 7 "), &sentinels()), Some(7.0));
        assert_eq!(parse_numeric(&Cell::Number(3.0), &sentinels()), Some(3.0));
    }

    #[test]
    fn absent_values_are_none_not_zero() {
        assert_eq!(parse_numeric(&Cell::Empty, &sentinels()), None);
        assert_eq!(parse_numeric(&Cell::text(""), &sentinels()), None);
        assert_eq!(parse_numeric(&Cell::text("y"), &sentinels()), None);
        assert_eq!(parse_numeric(&Cell::text("Y"), &sentinels()), None);
        assert_eq!(parse_numeric(&Cell::text("n/a"), &sentinels()), None);
        assert_eq!(parse_numeric(&Cell::text("1.2.3"), &sentinels()), None);
        assert_eq!(parse_numeric(&Cell::text("inf"), &sentinels()), None);
        assert_eq!(parse_numeric(&Cell::Bool(true), &sentinels()), None);
    }

    #[test]
    fn serial_dates() {
        // 45356 = 2024-03-05
        assert_eq!(
            normalize_date(&Cell::Number(45356.0), Baku).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
        );
        // time of day does not move the date
        assert_eq!(
            normalize_date(&Cell::Number(45356.99), Baku).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
        );
    }

    #[test]
    fn implausible_serials_rejected() {
        for v in [0.0, 42.0, 99.5, 17_999.0, -1.0] {
            assert!(
                matches!(
                    normalize_date(&Cell::Number(v), Baku),
                    Err(DateFormatError::ImplausibleSerial(_))
                ),
                "serial {v} must be rejected"
            );
        }
        assert!(normalize_date(&Cell::Number(18_000.0), Baku).is_ok());
    }

    #[test]
    fn native_datetime_is_shifted_into_zone() {
        // 21:30 UTC on the 4th is already the 5th in Baku (UTC+4).
        let dt = chrono::Utc.with_ymd_and_hms(2024, 3, 4, 21, 30, 0).unwrap();
        assert_eq!(
            normalize_date(&Cell::DateTime(dt), Baku).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
        );
    }

    #[test]
    fn text_dates() {
        let want = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(normalize_date(&Cell::text("2024-03-05"), Baku).unwrap(), want);
        assert_eq!(normalize_date(&Cell::text("05.03.2024"), Baku).unwrap(), want);
        assert_eq!(normalize_date(&Cell::text("03/05/2024"), Baku).unwrap(), want);
        assert_eq!(normalize_date(&Cell::text("2024-03-05 00:00:00"), Baku).unwrap(), want);
        assert_eq!(normalize_date(&Cell::text("45356"), Baku).unwrap(), want);
    }

    #[test]
    fn garbage_text_rejected() {
        assert!(matches!(
            normalize_date(&Cell::text("yesterday"), Baku),
            Err(DateFormatError::Unparseable(_))
        ));
        assert_eq!(normalize_date(&Cell::Empty, Baku), Err(DateFormatError::Empty));
        assert_eq!(optional_date(&Cell::text("nope"), Baku), None);
    }
}
