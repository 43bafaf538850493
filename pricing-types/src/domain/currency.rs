//! Currency record domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::CurrencyCode;
use crate::error::DomainError;

/// Unique identifier for a currency record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct CurrencyId(Uuid);

impl CurrencyId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn into_uuid(self) -> Uuid {
        self.0
    }
}

impl Default for CurrencyId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CurrencyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for CurrencyId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Whether a currency feeds the live rate table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CurrencyStatus {
    #[default]
    Active,
    Inactive,
}

impl CurrencyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CurrencyStatus::Active => "active",
            CurrencyStatus::Inactive => "inactive",
        }
    }
}

impl std::fmt::Display for CurrencyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CurrencyStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(CurrencyStatus::Active),
            "inactive" => Ok(CurrencyStatus::Inactive),
            other => Err(DomainError::ValidationError(format!(
                "Unknown currency status: {}",
                other
            ))),
        }
    }
}

/// A row of the `currencies` table as seen by administrators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CurrencyRecord {
    pub id: CurrencyId,
    pub code: CurrencyCode,
    #[schema(example = "US Dollar")]
    pub name: String,
    #[schema(example = "$")]
    pub symbol: Option<String>,
    /// Units of this currency per one unit of the base currency
    #[schema(example = 0.0016)]
    pub rate: f64,
    pub status: CurrencyStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CurrencyRecord {
    /// Creates a new active record.
    ///
    /// # Validation
    /// - Name cannot be empty
    /// - Rate must be positive and finite
    pub fn new(
        code: CurrencyCode,
        name: String,
        symbol: Option<String>,
        rate: f64,
    ) -> Result<Self, DomainError> {
        validate_name(&name)?;
        validate_rate(rate)?;
        let now = Utc::now();
        Ok(Self {
            id: CurrencyId::new(),
            code,
            name: name.trim().to_string(),
            symbol,
            rate,
            status: CurrencyStatus::Active,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn is_active(&self) -> bool {
        self.status == CurrencyStatus::Active
    }
}

pub fn validate_name(name: &str) -> Result<(), DomainError> {
    if name.trim().is_empty() {
        return Err(DomainError::ValidationError(
            "Currency name cannot be empty".into(),
        ));
    }
    Ok(())
}

pub fn validate_rate(rate: f64) -> Result<(), DomainError> {
    if !rate.is_finite() || rate <= 0.0 {
        return Err(DomainError::InvalidRate(rate));
    }
    Ok(())
}
