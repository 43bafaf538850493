//! Pricing Application Service
//!
//! Orchestrates conversion, cart pricing and currency administration.
//! Rates come from the shared [`CurrencyService`] cache; writes go through
//! the repository port and then refresh that cache.

use std::sync::Arc;

use currency_converter::{ConvertError, CurrencyService};
use pricing_types::{
    AppError, CartTotalRequest, CartTotalResponse, ConvertQuery, ConvertResponse,
    CurrenciesResponse, CurrencyCode, CurrencyRecord, CurrencyRepository, CurrencyStatus,
    RefreshResponse, UpsertCurrencyRequest,
};

/// Application service for pricing operations.
///
/// Generic over `R: CurrencyRepository`. The same repository instance is the
/// rate source of the embedded [`CurrencyService`], so admin edits show up in
/// conversions after the post-write refresh.
pub struct PricingService<R: CurrencyRepository> {
    repo: Arc<R>,
    rates: Arc<CurrencyService>,
    display_currency: CurrencyCode,
}

impl<R: CurrencyRepository> PricingService<R> {
    /// Creates a service with a default-configured rate cache over `repo`.
    pub fn new(repo: R) -> Self {
        let repo = Arc::new(repo);
        let rates = Arc::new(CurrencyService::new(repo.clone()));
        Self::with_rates(repo, rates)
    }

    /// Creates a service around an already configured rate cache. `rates`
    /// should read from `repo`.
    pub fn with_rates(repo: Arc<R>, rates: Arc<CurrencyService>) -> Self {
        Self {
            repo,
            rates,
            display_currency: CurrencyCode::default(),
        }
    }

    /// Sets the currency used when a request names no target.
    pub fn display_currency(mut self, code: CurrencyCode) -> Self {
        self.display_currency = code;
        self
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn rates(&self) -> &Arc<CurrencyService> {
        &self.rates
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Conversion
    // ─────────────────────────────────────────────────────────────────────────────

    /// Converts a single amount.
    ///
    /// Unknown currencies are not an error: the original amount is echoed
    /// back with `converted: false`. Non-finite amounts are rejected.
    pub async fn convert(&self, query: ConvertQuery) -> Result<ConvertResponse, AppError> {
        let to = query.to.unwrap_or_else(|| self.display_currency.clone());

        let (converted_amount, converted, rate) =
            match self.rates.try_convert(query.amount, &query.from, &to).await {
                Ok(conversion) => (conversion.amount, true, Some(conversion.rate)),
                Err(e @ ConvertError::InvalidAmount(_)) => return Err(e.into()),
                Err(e) => {
                    tracing::warn!(from = %query.from, %to, error = %e, "Conversion skipped");
                    (query.amount, false, None)
                }
            };

        // An unconverted amount is still in the source currency.
        let shown_in = if converted { &to } else { &query.from };
        Ok(ConvertResponse {
            amount: query.amount,
            formatted: self.rates.format_currency(converted_amount, shown_in),
            from: query.from,
            to,
            converted_amount,
            converted,
            rate,
        })
    }

    /// Lists the currencies conversions currently support.
    pub async fn currencies(&self) -> CurrenciesResponse {
        CurrenciesResponse {
            base: CurrencyCode::base(),
            currencies: self.rates.list_supported_currencies().await,
            rates_updated_at: self.rates.last_refreshed_at().await,
        }
    }

    /// Totals a cart in the requested (or display) currency.
    pub async fn cart_total(&self, req: CartTotalRequest) -> Result<CartTotalResponse, AppError> {
        if let Some(item) = req.items.iter().find(|i| !i.price.is_finite() || i.price < 0.0) {
            return Err(AppError::BadRequest(format!(
                "Item price must be a non-negative number, got {}",
                item.price
            )));
        }

        let currency = req.currency.unwrap_or_else(|| self.display_currency.clone());
        let cart = self.rates.cart_total(&req.items, &currency).await;

        Ok(CartTotalResponse {
            formatted_total: self.rates.format_currency(cart.total, &cart.currency),
            currency: cart.currency,
            lines: cart.lines,
            total: cart.total,
        })
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Administration
    // ─────────────────────────────────────────────────────────────────────────────

    /// Lists every stored currency, active or not.
    pub async fn list_currencies(&self) -> Result<Vec<CurrencyRecord>, AppError> {
        self.repo.list_currencies().await.map_err(Into::into)
    }

    /// Gets a stored currency by code.
    pub async fn get_currency(&self, code: &CurrencyCode) -> Result<CurrencyRecord, AppError> {
        self.repo
            .get_currency(code)
            .await
            .map_err(Into::into)
            .and_then(|opt| opt.ok_or_else(|| AppError::NotFound(format!("Currency {}", code))))
    }

    /// Creates or updates a currency, then refreshes the rate cache.
    pub async fn upsert_currency(
        &self,
        code: &CurrencyCode,
        req: UpsertCurrencyRequest,
    ) -> Result<CurrencyRecord, AppError> {
        if code.is_base() {
            if req.rate != 1.0 {
                return Err(AppError::BadRequest(format!(
                    "Base currency {} must keep a rate of 1",
                    code
                )));
            }
            if req.status == Some(CurrencyStatus::Inactive) {
                return Err(base_inactive(code));
            }
        }

        let record = self.repo.upsert_currency(code, req).await?;
        self.refresh_after_write().await;
        Ok(record)
    }

    /// Activates or deactivates a currency, then refreshes the rate cache.
    pub async fn set_currency_status(
        &self,
        code: &CurrencyCode,
        status: CurrencyStatus,
    ) -> Result<CurrencyRecord, AppError> {
        if code.is_base() && status == CurrencyStatus::Inactive {
            return Err(base_inactive(code));
        }

        let record = self
            .repo
            .set_currency_status(code, status)
            .await
            .map_err(|e| match e {
                pricing_types::RepoError::NotFound => {
                    AppError::NotFound(format!("Currency {}", code))
                }
                other => other.into(),
            })?;
        self.refresh_after_write().await;
        Ok(record)
    }

    /// Forces a rate refresh. Fails when the source cannot be reached.
    pub async fn refresh_rates(&self) -> Result<RefreshResponse, AppError> {
        self.rates.refresh_rates().await?;

        Ok(RefreshResponse {
            currencies: self.rates.cached_rates().await.map_or(0, |t| t.len()),
            refreshed_at: self.rates.last_refreshed_at().await,
        })
    }

    /// The write already succeeded; a failed refresh only delays visibility
    /// until the next fetch.
    async fn refresh_after_write(&self) {
        if let Err(e) = self.rates.refresh_rates().await {
            tracing::warn!(error = %e, "Rate refresh after currency update failed");
        }
    }
}

fn base_inactive(code: &CurrencyCode) -> AppError {
    AppError::BadRequest(format!("Base currency {} cannot be deactivated", code))
}
