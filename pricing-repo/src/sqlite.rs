//! SQLite repository adapter.
#![allow(clippy::collapsible_if)]

use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::sqlite::SqliteConnectOptions;
use std::str::FromStr;
use uuid::Uuid;

use pricing_types::domain::currency::{validate_name, validate_rate};
use pricing_types::{
    CurrencyCode, CurrencyRecord, CurrencyRepository, CurrencyStatus, RateEntry, RateSource,
    RateSourceError, RepoError, UpsertCurrencyRequest,
};

use crate::types::{DbCurrencyText, DbRate};

const CURRENCY_COLUMNS: &str = "id, code, name, symbol, rate, status, created_at, updated_at";

// ─────────────────────────────────────────────────────────────────────────────
// SQLite Repository
// ─────────────────────────────────────────────────────────────────────────────

/// SQLite repository implementation.
pub struct SqliteRepo {
    pool: SqlitePool,
}

impl SqliteRepo {
    /// Creates a new SQLite repository with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        // Ensure on-disk SQLite target directory exists (no-op for in-memory).
        if let Some(path) = database_url.strip_prefix("sqlite://") {
            let path = path.split('?').next().unwrap_or(path);
            if path != ":memory:" {
                let p = std::path::Path::new(path);
                if let Some(parent) = p.parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        // A single connection keeps `sqlite::memory:` databases shared across calls.
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let repo = Self { pool };
        repo.create_schema().await?;
        Ok(repo)
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Creates the schema and seeds the base currency.
    pub async fn create_schema(&self) -> Result<(), RepoError> {
        let ddl = include_str!("../migrations/0001_create_currencies.sql");
        sqlx::query(ddl)
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        let seed = include_str!("../migrations/0002_seed_currencies.sql");
        sqlx::query(seed)
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Rate source
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl RateSource for SqliteRepo {
    async fn fetch_rates(&self) -> Result<Vec<RateEntry>, RateSourceError> {
        let rows: Vec<DbRate> =
            sqlx::query_as(r#"SELECT code, rate FROM currencies WHERE status = 'active'"#)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| RateSourceError::Unavailable(e.to_string()))?;

        Ok(rows.into_iter().map(RateEntry::from).collect())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Repository implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl CurrencyRepository for SqliteRepo {
    async fn list_currencies(&self) -> Result<Vec<CurrencyRecord>, RepoError> {
        let rows: Vec<DbCurrencyText> = sqlx::query_as(&format!(
            "SELECT {} FROM currencies ORDER BY code",
            CURRENCY_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        rows.into_iter().map(DbCurrencyText::into_domain).collect()
    }

    async fn get_currency(&self, code: &CurrencyCode) -> Result<Option<CurrencyRecord>, RepoError> {
        let row: Option<DbCurrencyText> = sqlx::query_as(&format!(
            "SELECT {} FROM currencies WHERE code = ?",
            CURRENCY_COLUMNS
        ))
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        row.map(DbCurrencyText::into_domain).transpose()
    }

    async fn upsert_currency(
        &self,
        code: &CurrencyCode,
        req: UpsertCurrencyRequest,
    ) -> Result<CurrencyRecord, RepoError> {
        validate_name(&req.name)?;
        validate_rate(req.rate)?;

        let now = chrono::Utc::now().to_rfc3339();
        let insert_status = req.status.unwrap_or_default().to_string();
        let update_status = req.status.map(|s| s.to_string());

        let row: DbCurrencyText = sqlx::query_as(&format!(
            r#"INSERT INTO currencies (id, code, name, symbol, rate, status, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?)
               ON CONFLICT (code) DO UPDATE SET
                   name = excluded.name,
                   symbol = excluded.symbol,
                   rate = excluded.rate,
                   status = COALESCE(?, currencies.status),
                   updated_at = excluded.updated_at
               RETURNING {}"#,
            CURRENCY_COLUMNS
        ))
        .bind(Uuid::new_v4().to_string())
        .bind(code.as_str())
        .bind(req.name.trim())
        .bind(&req.symbol)
        .bind(req.rate)
        .bind(&insert_status)
        .bind(&now)
        .bind(&now)
        .bind(&update_status)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        tracing::info!(currency = %code, rate = req.rate, "Currency upserted");
        row.into_domain()
    }

    async fn set_currency_status(
        &self,
        code: &CurrencyCode,
        status: CurrencyStatus,
    ) -> Result<CurrencyRecord, RepoError> {
        let row: Option<DbCurrencyText> = sqlx::query_as(&format!(
            "UPDATE currencies SET status = ?, updated_at = ? WHERE code = ? RETURNING {}",
            CURRENCY_COLUMNS
        ))
        .bind(status.as_str())
        .bind(chrono::Utc::now().to_rfc3339())
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        match row {
            Some(row) => {
                tracing::info!(currency = %code, %status, "Currency status changed");
                row.into_domain()
            }
            None => Err(RepoError::NotFound),
        }
    }
}
