//! Stock record models
//!
//! Field names follow the BSE equity bhavcopy columns so records serialise
//! with the same keys the exchange publishes.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Format of the `date` field attached to every record (`dd/mm/yy`).
pub const TRADE_DATE_FORMAT: &str = "%d/%m/%y";

/// Number of records returned by the top-stocks query.
pub const TOP_STOCKS_LIMIT: usize = 10;

/// One bhavcopy row for one trading day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stock {
    #[serde(rename = "SC_CODE")]
    pub sc_code: i64,
    #[serde(rename = "SC_NAME")]
    pub sc_name: String,
    #[serde(rename = "SC_GROUP")]
    pub sc_group: String,
    #[serde(rename = "SC_TYPE")]
    pub sc_type: String,
    #[serde(rename = "OPEN")]
    pub open: f64,
    #[serde(rename = "HIGH")]
    pub high: f64,
    #[serde(rename = "LOW")]
    pub low: f64,
    #[serde(rename = "CLOSE")]
    pub close: f64,
    #[serde(rename = "LAST")]
    pub last: f64,
    #[serde(rename = "PREVCLOSE")]
    pub prev_close: f64,
    #[serde(rename = "NO_TRADES")]
    pub no_trades: i64,
    #[serde(rename = "NO_OF_SHRS")]
    pub no_of_shares: i64,
    #[serde(rename = "NET_TURNOV")]
    pub net_turnover: f64,
    /// Trading day, `dd/mm/yy`
    pub date: String,
}

impl Stock {
    /// Parsed trading day, if `date` is well formed.
    pub fn trade_date(&self) -> Option<NaiveDate> {
        parse_trade_date(&self.date)
    }
}

/// Price points used to draw a stock's chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockHistory {
    #[serde(rename = "OPEN")]
    pub open: f64,
    #[serde(rename = "HIGH")]
    pub high: f64,
    #[serde(rename = "LOW")]
    pub low: f64,
    #[serde(rename = "CLOSE")]
    pub close: f64,
    pub date: String,
}

impl From<&Stock> for StockHistory {
    fn from(stock: &Stock) -> Self {
        Self {
            open: stock.open,
            high: stock.high,
            low: stock.low,
            close: stock.close,
            date: stock.date.clone(),
        }
    }
}

/// Builds a chronological history from a stock's records.
///
/// Records with an unparseable date sort after every dated one, keeping
/// their relative order.
pub fn history_of(records: &[Stock]) -> Vec<StockHistory> {
    let mut dated: Vec<(Option<NaiveDate>, StockHistory)> = records
        .iter()
        .map(|stock| (stock.trade_date(), StockHistory::from(stock)))
        .collect();
    dated.sort_by(|(a, _), (b, _)| match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    dated.into_iter().map(|(_, point)| point).collect()
}

/// A stock name the user has marked as a favourite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Favourite {
    #[serde(rename = "SC_NAME")]
    pub sc_name: String,
    pub added_at: DateTime<Utc>,
}

impl Favourite {
    pub fn new(sc_name: impl Into<String>) -> Self {
        Self {
            sc_name: sc_name.into(),
            added_at: Utc::now(),
        }
    }
}

/// Parses a `dd/mm/yy` trading day.
pub fn parse_trade_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), TRADE_DATE_FORMAT).ok()
}

#[cfg(test)]
pub(crate) fn sample_stock(name: &str, close: f64, date: &str) -> Stock {
    Stock {
        sc_code: 500325,
        sc_name: name.to_string(),
        sc_group: "A ".to_string(),
        sc_type: "Q".to_string(),
        open: close - 5.0,
        high: close + 10.0,
        low: close - 10.0,
        close,
        last: close,
        prev_close: close - 1.0,
        no_trades: 1200,
        no_of_shares: 45000,
        net_turnover: close * 45000.0,
        date: date.to_string(),
    }
}
