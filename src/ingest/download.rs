//! Archive download and extraction

use std::io::Cursor;
use std::path::{Path, PathBuf};

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONNECTION};
use tracing::{debug, info};

use super::bhavcopy::BhavcopyDate;
use crate::error::IngestError;

// The exchange rejects requests that do not look like a browser
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/58.0.3029.110 Safari/537.3";

/// HTTP client preconfigured with browser-like headers.
pub fn http_client() -> Result<reqwest::Client, IngestError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
    headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));

    let client = reqwest::Client::builder()
        .user_agent(BROWSER_USER_AGENT)
        .default_headers(headers)
        .build()?;
    Ok(client)
}

/// Fetches the raw ZIP for `date`.
pub async fn download_archive(
    client: &reqwest::Client,
    date: &BhavcopyDate,
) -> Result<Vec<u8>, IngestError> {
    let url = date.url();
    debug!("GET {}", url);

    let response = client.get(&url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(IngestError::NotPublished {
            date: date.to_string(),
            status: status.as_u16(),
        });
    }

    let bytes = response.bytes().await?;
    info!("Downloaded {} ({} bytes)", date.archive_name(), bytes.len());
    Ok(bytes.to_vec())
}

/// Unpacks `archive` into `target_dir` and returns the path of the day's CSV.
pub fn extract_archive(
    archive: &[u8],
    target_dir: &Path,
    date: &BhavcopyDate,
) -> Result<PathBuf, IngestError> {
    std::fs::create_dir_all(target_dir)?;

    let mut zip = zip::ZipArchive::new(Cursor::new(archive))?;
    zip.extract(target_dir)?;

    let csv_path = target_dir.join(date.csv_name());
    if !csv_path.is_file() {
        return Err(IngestError::MissingCsv(date.csv_name()));
    }
    Ok(csv_path)
}
