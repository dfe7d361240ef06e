//! Download-extract-load pipeline

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{error, info, warn};

use super::bhavcopy::BhavcopyDate;
use super::download::{download_archive, extract_archive, http_client};
use super::parse::read_bhavcopy_file;
use crate::db::StockStore;
use crate::error::IngestError;

/// Outcome of a multi-day run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub loaded: Vec<BhavcopyDate>,
    pub failed: Vec<BhavcopyDate>,
    pub records: u64,
}

impl IngestSummary {
    pub fn attempted(&self) -> usize {
        self.loaded.len() + self.failed.len()
    }

    /// True when at least one day was attempted and none loaded.
    pub fn all_failed(&self) -> bool {
        self.attempted() > 0 && self.loaded.is_empty()
    }
}

/// Loads bhavcopies into a [`StockStore`].
pub struct Ingestor {
    client: reqwest::Client,
    store: Arc<dyn StockStore>,
    data_dir: PathBuf,
}

impl Ingestor {
    pub fn new(
        store: Arc<dyn StockStore>,
        data_dir: impl Into<PathBuf>,
    ) -> Result<Self, IngestError> {
        Ok(Self {
            client: http_client()?,
            store,
            data_dir: data_dir.into(),
        })
    }

    /// Downloads and loads one day. Returns the number of records inserted.
    pub async fn ingest(&self, date: BhavcopyDate) -> Result<u64, IngestError> {
        let archive = download_archive(&self.client, &date).await?;
        self.load_archive(date, archive).await
    }

    /// Extracts an already downloaded archive and inserts its rows.
    pub async fn load_archive(
        &self,
        date: BhavcopyDate,
        archive: Vec<u8>,
    ) -> Result<u64, IngestError> {
        let data_dir = self.data_dir.clone();

        let records = tokio::task::spawn_blocking(move || {
            let csv_path = extract_archive(&archive, &data_dir, &date)?;
            read_bhavcopy_file(&csv_path, &date.record_date())
        })
        .await??;

        if records.is_empty() {
            warn!("{} contained no records", date.csv_name());
            return Ok(0);
        }

        let inserted = self.store.insert_many(&records).await?;
        info!("Loaded {} records for {}", inserted, date);
        Ok(inserted)
    }

    /// Loads every date in order, continuing past failures.
    pub async fn run(&self, dates: &[BhavcopyDate]) -> IngestSummary {
        let mut summary = IngestSummary::default();

        for &date in dates {
            match self.ingest(date).await {
                Ok(count) => {
                    summary.records += count;
                    summary.loaded.push(date);
                }
                Err(err) => {
                    error!("Unable to process {}: {}", date, err);
                    summary.failed.push(date);
                }
            }
        }

        summary
    }
}
