//! Database row types and their mapping into domain types.

use sqlx::FromRow;

use pricing_types::{CurrencyCode, CurrencyRecord, CurrencyStatus, DomainError, RateEntry, RepoError};

/// `SELECT code, rate` row, identical for both backends.
#[derive(FromRow)]
pub struct DbRate {
    pub code: String,
    pub rate: f64,
}

impl From<DbRate> for RateEntry {
    fn from(row: DbRate) -> Self {
        RateEntry::new(row.code, row.rate)
    }
}

/// Full currency row from SQLite, where ids and timestamps are TEXT.
#[cfg(feature = "sqlite")]
#[derive(FromRow)]
pub struct DbCurrencyText {
    pub id: String,
    pub code: String,
    pub name: String,
    pub symbol: Option<String>,
    pub rate: f64,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

#[cfg(feature = "sqlite")]
impl DbCurrencyText {
    pub fn into_domain(self) -> Result<CurrencyRecord, RepoError> {
        let id = self
            .id
            .parse()
            .map_err(|e| RepoError::Database(format!("Invalid currency id {}: {}", self.id, e)))?;
        Ok(CurrencyRecord {
            id,
            code: parse_code(&self.code)?,
            name: self.name,
            symbol: self.symbol,
            rate: self.rate,
            status: parse_status(&self.status)?,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
    }
}

/// Full currency row from PostgreSQL.
#[cfg(feature = "postgres")]
#[derive(FromRow)]
pub struct DbCurrency {
    pub id: uuid::Uuid,
    pub code: String,
    pub name: String,
    pub symbol: Option<String>,
    pub rate: f64,
    pub status: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(feature = "postgres")]
impl DbCurrency {
    pub fn into_domain(self) -> Result<CurrencyRecord, RepoError> {
        Ok(CurrencyRecord {
            id: pricing_types::CurrencyId::from_uuid(self.id),
            code: parse_code(&self.code)?,
            name: self.name,
            symbol: self.symbol,
            rate: self.rate,
            status: parse_status(&self.status)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

pub fn parse_code(code: &str) -> Result<CurrencyCode, RepoError> {
    CurrencyCode::new(code).map_err(|e| RepoError::Domain(DomainError::from(e)))
}

pub fn parse_status(status: &str) -> Result<CurrencyStatus, RepoError> {
    status.parse().map_err(RepoError::Domain)
}

#[cfg(feature = "sqlite")]
pub fn parse_timestamp(value: &str) -> Result<chrono::DateTime<chrono::Utc>, RepoError> {
    chrono::DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .map_err(|e| RepoError::Database(format!("Invalid timestamp {}: {}", value, e)))
}
