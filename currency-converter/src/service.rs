//! Currency Service
//!
//! Owns the rate cache and performs conversions through it.
//!
//! Cache lifecycle:
//! - cold: nothing cached. A failed fetch serves the fallback table for that
//!   call only and stays cold.
//! - warm: a table is cached. Once older than the TTL the next read fetches
//!   again. A failed fetch keeps the old table and leaves its timestamp
//!   untouched, so the call after that retries immediately.
//!
//! Every fetch takes a ticket when it starts. A result is only cached if no
//! later-started fetch has been cached already, so a slow fetch cannot
//! overwrite the table from a newer `refresh_rates`.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::{
    ConvertError, CurrencyCode, RateSource, RateSourceError, RateTable, RoundingPolicy,
    format_currency,
};

/// Maximum age of a cached rate table.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Upper bound on a single fetch from the rate source.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(8);

/// Result of a strict conversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Conversion {
    /// Converted and rounded amount.
    pub amount: f64,
    /// Units of the target currency per unit of the source currency.
    pub rate: f64,
}

#[derive(Default)]
struct RateCache {
    table: Option<Arc<RateTable>>,
    refreshed_at: Option<Instant>,
    refreshed_wall: Option<DateTime<Utc>>,
    /// Ticket handed to the most recently started fetch.
    issued: u64,
    /// Ticket of the fetch whose table is cached.
    stored: u64,
}

impl RateCache {
    fn next_ticket(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }
}

/// Exchange rate cache plus conversion.
///
/// Construct once per process and share it as `Arc<CurrencyService>`.
pub struct CurrencyService {
    source: Arc<dyn RateSource>,
    cache: RwLock<RateCache>,
    ttl: Duration,
    fetch_timeout: Duration,
    fallback: Arc<RateTable>,
    rounding: RoundingPolicy,
}

impl CurrencyService {
    /// Creates a service with the default TTL, timeout, fallback table and
    /// rounding policy.
    pub fn new(source: impl RateSource + 'static) -> Self {
        Self::builder(source).build()
    }

    pub fn builder(source: impl RateSource + 'static) -> CurrencyServiceBuilder {
        CurrencyServiceBuilder {
            source: Arc::new(source),
            ttl: DEFAULT_TTL,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            fallback: RateTable::fallback(),
            rounding: RoundingPolicy::default(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn rounding(&self) -> RoundingPolicy {
        self.rounding
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Conversion
    // ─────────────────────────────────────────────────────────────────────────

    /// Converts `amount` from one currency to another. Never fails.
    ///
    /// - same currency: `amount` is returned untouched and no rates are read;
    /// - unknown currency on either side: `amount` is returned unconverted;
    /// - non-finite amount: `0.0`.
    pub async fn convert(&self, amount: f64, from: &CurrencyCode, to: &CurrencyCode) -> f64 {
        match self.try_convert(amount, from, to).await {
            Ok(conversion) => conversion.amount,
            Err(ConvertError::InvalidAmount(value)) => {
                warn!(%from, %to, amount = value, "Refusing to convert non-finite amount");
                0.0
            }
            Err(e) => {
                warn!(%from, %to, amount, error = %e, "Conversion skipped, returning original amount");
                amount
            }
        }
    }

    /// Strict conversion: reports unknown currencies and invalid amounts
    /// instead of degrading.
    pub async fn try_convert(
        &self,
        amount: f64,
        from: &CurrencyCode,
        to: &CurrencyCode,
    ) -> Result<Conversion, ConvertError> {
        if !amount.is_finite() {
            return Err(ConvertError::InvalidAmount(amount));
        }
        if from == to {
            return Ok(Conversion { amount, rate: 1.0 });
        }

        let rates = self.rates().await;
        let from_rate = rates
            .get(from)
            .ok_or_else(|| ConvertError::UnknownCurrency(from.clone()))?;
        let to_rate = rates
            .get(to)
            .ok_or_else(|| ConvertError::UnknownCurrency(to.clone()))?;

        Ok(Conversion {
            amount: self.rounding.apply(amount * to_rate / from_rate),
            rate: to_rate / from_rate,
        })
    }

    /// Codes of the current table (fallback table when nothing is cached),
    /// sorted.
    pub async fn list_supported_currencies(&self) -> Vec<CurrencyCode> {
        self.rates().await.codes()
    }

    pub fn format_currency(&self, amount: f64, currency: &CurrencyCode) -> String {
        format_currency(amount, currency)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Cache
    // ─────────────────────────────────────────────────────────────────────────

    /// Forces a fetch regardless of TTL.
    ///
    /// The cache is marked expired first, so even on failure the next
    /// conversion retries the source. The previous table keeps being served
    /// until a fetch succeeds.
    pub async fn refresh_rates(&self) -> Result<(), RateSourceError> {
        let ticket = {
            let mut cache = self.cache.write().await;
            cache.refreshed_at = None;
            cache.next_ticket()
        };

        let table = self.fetch().await.inspect_err(|e| {
            error!(error = %e, "Forced rate refresh failed");
        })?;
        self.store(ticket, table).await;
        Ok(())
    }

    /// Primes the cache. Failures are logged and otherwise ignored.
    pub async fn warm_up(&self) {
        let rates = self.rates().await;
        info!(currencies = rates.len(), "Currency rates ready");
    }

    /// The cached table, if any, without touching the source.
    pub async fn cached_rates(&self) -> Option<Arc<RateTable>> {
        self.cache.read().await.table.clone()
    }

    /// Wall-clock time of the last successful fetch.
    pub async fn last_refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.cache.read().await.refreshed_wall
    }

    /// Returns the table to convert with, fetching if the cache is cold or
    /// stale.
    async fn rates(&self) -> Arc<RateTable> {
        {
            let cache = self.cache.read().await;
            if let (Some(table), Some(at)) = (&cache.table, cache.refreshed_at) {
                if at.elapsed() < self.ttl {
                    return Arc::clone(table);
                }
            }
        }

        let ticket = self.cache.write().await.next_ticket();
        match self.fetch().await {
            Ok(table) => self.store(ticket, table).await,
            Err(e) => {
                error!(error = %e, "Error fetching currency rates");
                match self.cache.read().await.table.clone() {
                    Some(stale) => stale,
                    None => {
                        warn!("No cached rates, using fallback table");
                        Arc::clone(&self.fallback)
                    }
                }
            }
        }
    }

    async fn fetch(&self) -> Result<RateTable, RateSourceError> {
        let entries = tokio::time::timeout(self.fetch_timeout, self.source.fetch_rates())
            .await
            .map_err(|_| RateSourceError::Timeout(self.fetch_timeout))??;

        let table = RateTable::from_entries(entries);
        if table.is_empty() {
            return Err(RateSourceError::Malformed(
                "no active currency with a usable rate".into(),
            ));
        }
        Ok(table)
    }

    /// Caches `table` unless a fetch started after this one has already been
    /// stored, in which case the newer table is kept and returned.
    async fn store(&self, ticket: u64, table: RateTable) -> Arc<RateTable> {
        let mut cache = self.cache.write().await;
        if ticket < cache.stored {
            if let Some(current) = &cache.table {
                debug!(
                    ticket,
                    stored = cache.stored,
                    "Discarding rates from a superseded fetch"
                );
                return Arc::clone(current);
            }
        }

        let table = Arc::new(table);
        cache.table = Some(Arc::clone(&table));
        cache.stored = ticket;
        cache.refreshed_at = Some(Instant::now());
        cache.refreshed_wall = Some(Utc::now());
        debug!(currencies = table.len(), "Currency rates refreshed");
        table
    }
}

/// Builder for [`CurrencyService`].
pub struct CurrencyServiceBuilder {
    source: Arc<dyn RateSource>,
    ttl: Duration,
    fetch_timeout: Duration,
    fallback: RateTable,
    rounding: RoundingPolicy,
}

impl CurrencyServiceBuilder {
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn fallback(mut self, table: RateTable) -> Self {
        self.fallback = table;
        self
    }

    pub fn rounding(mut self, rounding: RoundingPolicy) -> Self {
        self.rounding = rounding;
        self
    }

    pub fn build(self) -> CurrencyService {
        CurrencyService {
            source: self.source,
            cache: RwLock::new(RateCache::default()),
            ttl: self.ttl,
            fetch_timeout: self.fetch_timeout,
            fallback: Arc::new(self.fallback),
            rounding: self.rounding,
        }
    }
}
