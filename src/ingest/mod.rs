//! Bhavcopy ingestion
//!
//! Downloads the BSE equity bhavcopy for a trading day, extracts it into the
//! data directory and bulk loads the rows into the record store.
//!
//! # Flow
//! 1. [`BhavcopyDate`] derives the archive name and URL from the day
//! 2. [`download_archive`] fetches the ZIP, [`extract_archive`] unpacks it
//! 3. [`read_bhavcopy_file`] turns the CSV into [`Stock`](crate::models::Stock) records
//! 4. [`Ingestor`] ties it together and inserts through a [`StockStore`](crate::db::StockStore)

mod bhavcopy;
mod download;
mod parse;
mod pipeline;

pub use bhavcopy::{recent_trading_days, BhavcopyDate, BHAVCOPY_BASE_URL};
pub use download::{download_archive, extract_archive, http_client};
pub use parse::{parse_bhavcopy, read_bhavcopy_file};
pub use pipeline::{IngestSummary, Ingestor};
