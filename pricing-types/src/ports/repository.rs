//! Currency repository port.
//!
//! Adapters (SQLite, PostgreSQL, hosted REST) implement this trait together
//! with [`RateSource`], so the same backend serves both the admin screens and
//! the live rate table.

use currency_converter::RateSource;

use crate::domain::{CurrencyRecord, CurrencyStatus};
use crate::dto::UpsertCurrencyRequest;
use crate::error::RepoError;
use crate::CurrencyCode;

/// Storage for the `currencies` table.
///
/// Only `active` rows are returned by [`RateSource::fetch_rates`].
#[async_trait::async_trait]
pub trait CurrencyRepository: RateSource + 'static {
    /// Lists every currency, active or not, ordered by code.
    async fn list_currencies(&self) -> Result<Vec<CurrencyRecord>, RepoError>;

    /// Gets a currency by code.
    async fn get_currency(&self, code: &CurrencyCode) -> Result<Option<CurrencyRecord>, RepoError>;

    /// Inserts a currency or updates the existing row with the same code.
    async fn upsert_currency(
        &self,
        code: &CurrencyCode,
        req: UpsertCurrencyRequest,
    ) -> Result<CurrencyRecord, RepoError>;

    /// Activates or deactivates a currency. `NotFound` if the code is unknown.
    async fn set_currency_status(
        &self,
        code: &CurrencyCode,
        status: CurrencyStatus,
    ) -> Result<CurrencyRecord, RepoError>;
}
