//! PostgreSQL stock store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{Postgres, QueryBuilder, Row};
use tracing::{debug, info};

use crate::db::StockStore;
use crate::error::StoreResult;
use crate::models::{Favourite, Stock};

/// Rows per INSERT statement; 14 binds each stays far below the
/// protocol's 65535 parameter limit.
const INSERT_CHUNK: usize = 1000;

const STOCK_COLUMNS: &str = "sc_code, sc_name, sc_group, sc_type, open, high, low, close, \
     last, prev_close, no_trades, no_of_shares, net_turnover, trade_date";

/// Stock records in PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgStockStore {
    pool: PgPool,
}

impl PgStockStore {
    /// Connect to the database
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        info!("Connecting to database...");
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        info!("Database connection established");
        Ok(Self { pool })
    }

    /// Creates the tables and indexes if they do not exist yet.
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS stock_price (
                id BIGSERIAL PRIMARY KEY,
                sc_code BIGINT NOT NULL,
                sc_name TEXT NOT NULL,
                sc_group TEXT NOT NULL,
                sc_type TEXT NOT NULL,
                open DOUBLE PRECISION NOT NULL,
                high DOUBLE PRECISION NOT NULL,
                low DOUBLE PRECISION NOT NULL,
                close DOUBLE PRECISION NOT NULL,
                last DOUBLE PRECISION NOT NULL,
                prev_close DOUBLE PRECISION NOT NULL,
                no_trades BIGINT NOT NULL,
                no_of_shares BIGINT NOT NULL,
                net_turnover DOUBLE PRECISION NOT NULL,
                trade_date TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS stock_price_sc_name_idx ON stock_price (sc_name)")
            .execute(&self.pool)
            .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS stock_price_close_idx ON stock_price (close DESC)")
            .execute(&self.pool)
            .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS favourite_stock (
                sc_name TEXT PRIMARY KEY,
                added_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )",
        )
        .execute(&self.pool)
        .await?;

        info!("Database schema is up to date");
        Ok(())
    }
}

fn stock_from_row(row: &PgRow) -> Result<Stock, sqlx::Error> {
    Ok(Stock {
        sc_code: row.try_get("sc_code")?,
        sc_name: row.try_get("sc_name")?,
        sc_group: row.try_get("sc_group")?,
        sc_type: row.try_get("sc_type")?,
        open: row.try_get("open")?,
        high: row.try_get("high")?,
        low: row.try_get("low")?,
        close: row.try_get("close")?,
        last: row.try_get("last")?,
        prev_close: row.try_get("prev_close")?,
        no_trades: row.try_get("no_trades")?,
        no_of_shares: row.try_get("no_of_shares")?,
        net_turnover: row.try_get("net_turnover")?,
        date: row.try_get("trade_date")?,
    })
}

fn favourite_from_row(row: &PgRow) -> Result<Favourite, sqlx::Error> {
    Ok(Favourite {
        sc_name: row.try_get("sc_name")?,
        added_at: row.try_get::<DateTime<Utc>, _>("added_at")?,
    })
}

#[async_trait]
impl StockStore for PgStockStore {
    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn top_by_close(&self, limit: usize) -> StoreResult<Vec<Stock>> {
        let sql = format!(
            "SELECT {} FROM stock_price ORDER BY close DESC LIMIT $1",
            STOCK_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;
        let stocks = rows.iter().map(stock_from_row).collect::<Result<Vec<_>, _>>()?;
        Ok(stocks)
    }

    async fn find_by_name(&self, name: &str) -> StoreResult<Vec<Stock>> {
        let sql = format!(
            "SELECT {} FROM stock_price WHERE sc_name = $1 ORDER BY id",
            STOCK_COLUMNS
        );
        let rows = sqlx::query(&sql).bind(name).fetch_all(&self.pool).await?;
        let stocks = rows.iter().map(stock_from_row).collect::<Result<Vec<_>, _>>()?;
        Ok(stocks)
    }

    async fn insert_many(&self, records: &[Stock]) -> StoreResult<u64> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        let mut inserted = 0u64;

        for chunk in records.chunks(INSERT_CHUNK) {
            let mut builder: QueryBuilder<Postgres> =
                QueryBuilder::new(format!("INSERT INTO stock_price ({}) ", STOCK_COLUMNS));
            builder.push_values(chunk, |mut row, stock| {
                row.push_bind(stock.sc_code)
                    .push_bind(&stock.sc_name)
                    .push_bind(&stock.sc_group)
                    .push_bind(&stock.sc_type)
                    .push_bind(stock.open)
                    .push_bind(stock.high)
                    .push_bind(stock.low)
                    .push_bind(stock.close)
                    .push_bind(stock.last)
                    .push_bind(stock.prev_close)
                    .push_bind(stock.no_trades)
                    .push_bind(stock.no_of_shares)
                    .push_bind(stock.net_turnover)
                    .push_bind(&stock.date);
            });
            let result = builder.build().execute(&mut *tx).await?;
            inserted += result.rows_affected();
            debug!(rows = chunk.len(), "Inserted stock chunk");
        }

        tx.commit().await?;
        Ok(inserted)
    }

    async fn favourites(&self) -> StoreResult<Vec<Favourite>> {
        let rows = sqlx::query("SELECT sc_name, added_at FROM favourite_stock ORDER BY added_at")
            .fetch_all(&self.pool)
            .await?;
        let favourites = rows
            .iter()
            .map(favourite_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(favourites)
    }

    async fn add_favourite(&self, name: &str) -> StoreResult<Favourite> {
        // DO UPDATE with a no-op so RETURNING yields the existing row too
        let row = sqlx::query(
            "INSERT INTO favourite_stock (sc_name) VALUES ($1)
             ON CONFLICT (sc_name) DO UPDATE SET sc_name = EXCLUDED.sc_name
             RETURNING sc_name, added_at",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(favourite_from_row(&row)?)
    }

    async fn remove_favourite(&self, name: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM favourite_stock WHERE sc_name = $1")
            .bind(name)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
