//! Trading day naming
//!
//! BSE publishes one archive per trading day as `EQ<dd><mm><yy>_CSV.ZIP`
//! holding a single `EQ<dd><mm><yy>.CSV`.

use std::fmt;

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use crate::error::IngestError;
use crate::models::stock::TRADE_DATE_FORMAT;

/// Where the exchange serves equity bhavcopy archives.
pub const BHAVCOPY_BASE_URL: &str = "https://www.bseindia.com/download/BhavCopy/Equity/";

/// Format accepted on the command line (`dd/mm/yyyy`).
const INPUT_DATE_FORMAT: &str = "%d/%m/%Y";

/// A trading day whose bhavcopy can be fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BhavcopyDate(NaiveDate);

impl BhavcopyDate {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Parses a strict `dd/mm/yyyy` date, e.g. `09/01/2024`.
    pub fn parse(input: &str) -> Result<Self, IngestError> {
        let invalid = || IngestError::InvalidDate(input.to_string());

        let bytes = input.as_bytes();
        let well_formed = bytes.len() == 10
            && bytes[2] == b'/'
            && bytes[5] == b'/'
            && bytes
                .iter()
                .enumerate()
                .all(|(i, b)| i == 2 || i == 5 || b.is_ascii_digit());
        if !well_formed {
            return Err(invalid());
        }

        NaiveDate::parse_from_str(input, INPUT_DATE_FORMAT)
            .map(Self)
            .map_err(|_| invalid())
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// `EQ<dd><mm><yy>_CSV.ZIP`
    pub fn archive_name(&self) -> String {
        format!("EQ{}_CSV.ZIP", self.0.format("%d%m%y"))
    }

    /// `EQ<dd><mm><yy>.CSV`, the file inside the archive
    pub fn csv_name(&self) -> String {
        format!("EQ{}.CSV", self.0.format("%d%m%y"))
    }

    pub fn url(&self) -> String {
        format!("{}{}", BHAVCOPY_BASE_URL, self.archive_name())
    }

    /// Value stored in each record's `date` field (`dd/mm/yy`).
    pub fn record_date(&self) -> String {
        self.0.format(TRADE_DATE_FORMAT).to_string()
    }

    /// Exchanges do not publish on Saturdays or Sundays.
    pub fn is_weekend(&self) -> bool {
        matches!(self.0.weekday(), Weekday::Sat | Weekday::Sun)
    }
}

impl fmt::Display for BhavcopyDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(INPUT_DATE_FORMAT))
    }
}

/// Weekdays among the `days` calendar days ending at `today`, newest first.
pub fn recent_trading_days(today: NaiveDate, days: u32) -> Vec<BhavcopyDate> {
    (0..i64::from(days))
        .map(|offset| BhavcopyDate(today - Duration::days(offset)))
        .filter(|date| !date.is_weekend())
        .collect()
}
