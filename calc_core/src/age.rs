//! # Age Calculator
//!
//! Calendar-field age between a birth date and "today", plus the countdown
//! to the next birthday.
//!
//! Fields are subtracted with borrow: a negative day count borrows the
//! length of the month before today's month, a negative month count borrows
//! twelve months from the years.
//!
//! ```rust
//! use calc_core::age::compute_age_str;
//!
//! let age = compute_age_str("2000-01-01", "2024-06-15").unwrap();
//! assert_eq!(age.to_string(), "24 years, 5 months, 14 days");
//! assert_eq!(age.days_until_next_birthday, 200);
//! ```

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{CalcError, CalcResult};

/// Accepted date format (`YYYY-MM-DD`)
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Result of [`compute_age`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeBreakdown {
    pub years: i32,
    pub months: u32,
    pub days: u32,
    pub next_birthday: NaiveDate,
    /// Zero when today is the birthday
    pub days_until_next_birthday: i64,
}

impl fmt::Display for AgeBreakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} years, {} months, {} days", self.years, self.months, self.days)
    }
}

/// Compute the age on `today` of someone born on `birth`.
///
/// A birth date after `today` is `InvalidInput`.
pub fn compute_age(birth: NaiveDate, today: NaiveDate) -> CalcResult<AgeBreakdown> {
    if birth > today {
        return Err(CalcError::invalid_input(
            "birth_date",
            birth.to_string(),
            format!("birth date is after {}", today),
        ));
    }

    let mut years = today.year() - birth.year();
    let mut months = today.month() as i32 - birth.month() as i32;
    let mut days = today.day() as i32 - birth.day() as i32;

    // Borrow from the month preceding today's month, walking further back
    // while the count stays negative.
    let (mut year, mut month) = (today.year(), today.month());
    while days < 0 {
        (year, month) = previous_month(year, month);
        days += days_in_month(year, month) as i32;
        months -= 1;
    }
    while months < 0 {
        months += 12;
        years -= 1;
    }

    let mut next_birthday = birthday_in(today.year(), birth)?;
    if next_birthday < today {
        next_birthday = birthday_in(today.year() + 1, birth)?;
    }
    let days_until_next_birthday = (next_birthday - today).num_days();

    debug!(%birth, %today, years, months, days, days_until_next_birthday, "age computed");

    Ok(AgeBreakdown {
        years,
        months: months as u32,
        days: days as u32,
        next_birthday,
        days_until_next_birthday,
    })
}

/// [`compute_age`] on `YYYY-MM-DD` strings.
pub fn compute_age_str(birth: &str, today: &str) -> CalcResult<AgeBreakdown> {
    compute_age(parse_date("birth_date", birth)?, parse_date("today", today)?)
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(field: &str, text: &str) -> CalcResult<NaiveDate> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(CalcError::invalid_input(field, text, "please enter a valid date"));
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map_err(|e| CalcError::invalid_input(field, text, format!("expected YYYY-MM-DD: {}", e)))
}

/// The birthday falling in `year`; 29 February maps to 1 March in common years.
fn birthday_in(year: i32, birth: NaiveDate) -> CalcResult<NaiveDate> {
    NaiveDate::from_ymd_opt(year, birth.month(), birth.day())
        .or_else(|| NaiveDate::from_ymd_opt(year, 3, 1))
        .ok_or_else(|| CalcError::invalid_input("year", year.to_string(), "year out of calendar range"))
}

fn previous_month(year: i32, month: u32) -> (i32, u32) {
    if month == 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
        .unwrap_or(31)
}
