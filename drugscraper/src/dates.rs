//! Mixed-format date normalization.
//!
//! Raw inputs spell dates several ways (`2020-01-01`, `01/01/2019`,
//! `1 January 2020`, `25/05/2020`). Everything is reduced to a calendar
//! [`NaiveDate`]; time components are dropped.

use crate::error::{Result, ScrapeError};
use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Date-only layouts, tried in order.
///
/// Slash dates are read month-first and fall back to day-first when the
/// leading field cannot be a month.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%d %B %Y",
    "%B %d, %Y",
    "%B %d %Y",
];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Parse a raw date string into a calendar date
///
/// # Arguments
///
/// * `raw` - Date text as found in the input file
///
/// # Returns
///
/// The calendar date, or `ScrapeError::InvalidDate` when no layout matches
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use drugscraper::parse_date;
///
/// let date = parse_date("1 January 2020").unwrap();
/// assert_eq!(date, NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
/// ```
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    let text = raw.trim();

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Ok(date);
        }
    }

    for format in DATETIME_FORMATS {
        if let Ok(timestamp) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(timestamp.date());
        }
    }

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(text) {
        return Ok(timestamp.date_naive());
    }

    Err(ScrapeError::InvalidDate(raw.to_string()))
}
