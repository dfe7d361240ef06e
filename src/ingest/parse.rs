//! Bhavcopy CSV parsing

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crate::error::IngestError;
use crate::models::Stock;

/// One CSV row as published. Columns not listed here are ignored.
#[derive(Debug, Deserialize)]
struct BhavcopyRow {
    #[serde(rename = "SC_CODE")]
    sc_code: i64,
    #[serde(rename = "SC_NAME")]
    sc_name: String,
    #[serde(rename = "SC_GROUP")]
    sc_group: String,
    #[serde(rename = "SC_TYPE")]
    sc_type: String,
    #[serde(rename = "OPEN")]
    open: f64,
    #[serde(rename = "HIGH")]
    high: f64,
    #[serde(rename = "LOW")]
    low: f64,
    #[serde(rename = "CLOSE")]
    close: f64,
    #[serde(rename = "LAST")]
    last: f64,
    #[serde(rename = "PREVCLOSE")]
    prev_close: f64,
    #[serde(rename = "NO_TRADES")]
    no_trades: i64,
    #[serde(rename = "NO_OF_SHRS")]
    no_of_shares: i64,
    #[serde(rename = "NET_TURNOV")]
    net_turnover: f64,
}

impl BhavcopyRow {
    fn into_stock(self, record_date: &str) -> Stock {
        Stock {
            sc_code: self.sc_code,
            sc_name: self.sc_name,
            sc_group: self.sc_group,
            sc_type: self.sc_type,
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            last: self.last,
            prev_close: self.prev_close,
            no_trades: self.no_trades,
            no_of_shares: self.no_of_shares,
            net_turnover: self.net_turnover,
            date: record_date.to_string(),
        }
    }
}

/// Parses bhavcopy CSV content, tagging every record with `record_date`.
///
/// Fields are trimmed, so padded names such as `"RELIANCE    "` come out
/// as `"RELIANCE"`.
pub fn parse_bhavcopy<R: Read>(reader: R, record_date: &str) -> Result<Vec<Stock>, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for row in reader.deserialize::<BhavcopyRow>() {
        records.push(row?.into_stock(record_date));
    }
    Ok(records)
}

/// Reads and parses an extracted bhavcopy file.
pub fn read_bhavcopy_file(path: &Path, record_date: &str) -> Result<Vec<Stock>, IngestError> {
    let file = std::fs::File::open(path)?;
    parse_bhavcopy(std::io::BufReader::new(file), record_date)
}
