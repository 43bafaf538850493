//! PostgreSQL repository adapter.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use pricing_types::domain::currency::{validate_name, validate_rate};
use pricing_types::{
    CurrencyCode, CurrencyRecord, CurrencyRepository, CurrencyStatus, RateEntry, RateSource,
    RateSourceError, RepoError, UpsertCurrencyRequest,
};

use crate::types::{DbCurrency, DbRate};

const CURRENCY_COLUMNS: &str = "id, code, name, symbol, rate, status, created_at, updated_at";

// ─────────────────────────────────────────────────────────────────────────────
// PostgreSQL Repository
// ─────────────────────────────────────────────────────────────────────────────

/// PostgreSQL repository backed by the `currencies` table.
pub struct PostgresRepo {
    pool: PgPool,
}

/// Executes SQL statements from a migration file, splitting by semicolons.
async fn execute_migration(pool: &PgPool, sql: &str, name: &str) -> Result<(), anyhow::Error> {
    for statement in sql.split(';') {
        let stmt = statement.trim();
        if !stmt.is_empty() {
            sqlx::query(stmt)
                .execute(pool)
                .await
                .map_err(|e| anyhow::anyhow!("Migration {} failed: {}", name, e))?;
        }
    }
    Ok(())
}

/// Runs all database migrations.
async fn run_migrations(pool: &PgPool) -> Result<(), anyhow::Error> {
    execute_migration(
        pool,
        include_str!("../migrations/0001_create_currencies_pg.sql"),
        "0001",
    )
    .await?;

    execute_migration(
        pool,
        include_str!("../migrations/0002_seed_currencies_pg.sql"),
        "0002",
    )
    .await?;

    Ok(())
}

impl PostgresRepo {
    /// Connects and runs migrations.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        run_migrations(&pool).await?;
        Ok(Self { pool })
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Rate source
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl RateSource for PostgresRepo {
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
impl CurrencyRepository for PostgresRepo {
    async fn list_currencies(&self) -> Result<Vec<CurrencyRecord>, RepoError> {
        let rows: Vec<DbCurrency> = sqlx::query_as(&format!(
            "SELECT {} FROM currencies ORDER BY code",
            CURRENCY_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        rows.into_iter().map(DbCurrency::into_domain).collect()
    }

    async fn get_currency(&self, code: &CurrencyCode) -> Result<Option<CurrencyRecord>, RepoError> {
        let row: Option<DbCurrency> = sqlx::query_as(&format!(
            "SELECT {} FROM currencies WHERE code = $1",
            CURRENCY_COLUMNS
        ))
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        row.map(DbCurrency::into_domain).transpose()
    }

    async fn upsert_currency(
        &self,
        code: &CurrencyCode,
        req: UpsertCurrencyRequest,
    ) -> Result<CurrencyRecord, RepoError> {
        validate_name(&req.name)?;
        validate_rate(req.rate)?;

        let insert_status = req.status.unwrap_or_default().to_string();
        let update_status = req.status.map(|s| s.to_string());

        let row: DbCurrency = sqlx::query_as(&format!(
            r#"INSERT INTO currencies (id, code, name, symbol, rate, status)
               VALUES ($1, $2, $3, $4, $5, $6)
               ON CONFLICT (code) DO UPDATE SET
                   name = EXCLUDED.name,
                   symbol = EXCLUDED.symbol,
                   rate = EXCLUDED.rate,
                   status = COALESCE($7, currencies.status),
                   updated_at = NOW()
               RETURNING {}"#,
            CURRENCY_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(code.as_str())
        .bind(req.name.trim())
        .bind(&req.symbol)
        .bind(req.rate)
        .bind(&insert_status)
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
        let row: Option<DbCurrency> = sqlx::query_as(&format!(
            "UPDATE currencies SET status = $1, updated_at = NOW() WHERE code = $2 RETURNING {}",
            CURRENCY_COLUMNS
        ))
        .bind(status.as_str())
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
