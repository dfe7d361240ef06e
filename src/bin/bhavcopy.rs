//! bhavcopy loader
//!
//! Downloads Bombay Stock Exchange equity bhavcopies and loads them into the
//! database the API serves from.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use stock_price_api::db::PgStockStore;
use stock_price_api::ingest::{recent_trading_days, BhavcopyDate, Ingestor};

/// Download and load Bombay Stock Exchange data in the database
#[derive(Parser)]
#[command(name = "bhavcopy")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Load the bhavcopy of one day, e.g. 09/01/2024
    #[arg(
        long,
        value_name = "dd/mm/yyyy",
        conflicts_with = "last_days",
        required_unless_present = "last_days"
    )]
    date: Option<String>,

    /// Load every weekday among the last N calendar days
    #[arg(long, value_name = "N")]
    last_days: Option<u32>,

    /// Directory the archives are extracted into
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env must be loaded before clap reads DATABASE_URL
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stock_price_api=info,bhavcopy=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let dates = match (&cli.date, cli.last_days) {
        (Some(input), _) => vec![BhavcopyDate::parse(input)?],
        (None, Some(days)) => recent_trading_days(Local::now().date_naive(), days),
        (None, None) => bail!("either --date or --last-days is required"),
    };
    if dates.is_empty() {
        warn!("No trading days in the requested range");
        return Ok(());
    }

    let store = PgStockStore::connect(&cli.database_url)
        .await
        .context("Unable to connect to database")?;
    store.migrate().await.context("Database migration failed")?;
    info!("Successfully connected to database");

    let ingestor = Ingestor::new(Arc::new(store), cli.data_dir)?;
    let summary = ingestor.run(&dates).await;

    info!(
        "Loaded {}/{} days ({} records)",
        summary.loaded.len(),
        summary.attempted(),
        summary.records
    );
    for date in &summary.failed {
        warn!("Failed: {}", date);
    }

    if summary.all_failed() {
        bail!("no bhavcopy could be loaded");
    }
    Ok(())
}
