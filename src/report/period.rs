//! Selecting the records for one calendar month.

use std::fmt::Display;

use rusqlite::Connection;
use time::{Date, Month};

use crate::{Error, record::Ledger};

/// A calendar month used to filter records by date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordPeriod {
    month: Month,
    year: i32,
}

impl RecordPeriod {
    /// Create a period for `month` (1-12) of `year` (1-9999).
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidPeriod] if either value is out of range.
    pub fn new(month: u8, year: i32) -> Result<Self, Error> {
        let month = Month::try_from(month).map_err(|_| {
            Error::InvalidPeriod(format!("month must be between 1 and 12, got {month}"))
        })?;

        if !(1..=9999).contains(&year) {
            return Err(Error::InvalidPeriod(format!(
                "year must be between 1 and 9999, got {year}"
            )));
        }

        Ok(Self { month, year })
    }

    /// The period containing `date`.
    pub fn containing(date: Date) -> Self {
        Self {
            month: date.month(),
            year: date.year(),
        }
    }

    /// Parse the value of a month input, e.g. "2023-03".
    ///
    /// The year is the first four characters and the month everything after the
    /// separator. Both must be plain ASCII digits, with one or two for the month.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidPeriod] if `value` is not a valid month.
    pub fn parse_month_picker(value: &str) -> Result<Self, Error> {
        let invalid = || Error::InvalidPeriod(format!("\"{value}\" is not a month like 2023-03"));

        let year = value.get(..4).ok_or_else(invalid)?;
        let separator = value.get(4..5).ok_or_else(invalid)?;
        let month = value.get(5..).ok_or_else(invalid)?;

        let is_digits = |text: &str| text.bytes().all(|byte| byte.is_ascii_digit());

        if separator != "-" || !is_digits(year) || !is_digits(month) || month.len() > 2 {
            return Err(invalid());
        }

        let year = year.parse().map_err(|_| invalid())?;
        let month = month.parse().map_err(|_| invalid())?;

        Self::new(month, year)
    }

    pub fn month(&self) -> Month {
        self.month
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// The value for a month input, e.g. "2023-03".
    pub fn month_picker_value(&self) -> String {
        format!("{:04}-{:02}", self.year, u8::from(self.month))
    }
}

impl Display for RecordPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.month, self.year)
    }
}

/// Get every row of the ledger `L` dated within `period`, oldest first.
///
/// Dates are stored as text, so the month and year are compared as the
/// zero-padded strings that `strftime` produces.
///
/// # Errors
///
/// Returns [Error::SqlError] if the query fails.
pub fn get_rows_in_period<L: Ledger>(
    period: RecordPeriod,
    connection: &Connection,
) -> Result<Vec<(Date, L)>, Error> {
    let month = format!("{:02}", u8::from(period.month));
    let year = format!("{:04}", period.year);

    connection
        .prepare(&format!(
            "SELECT * FROM {}
            WHERE strftime('%m', date) = ?1 AND strftime('%Y', date) = ?2
            ORDER BY date ASC",
            L::TABLE
        ))?
        .query_map([month, year], |row| Ok((row.get("date")?, L::from_row(row)?)))?
        .map(|row| row.map_err(Error::from))
        .collect()
}
