//! Rate source port.
//!
//! Implementations can be database queries, HTTP clients, fixed tables, etc.

use std::sync::Arc;

use crate::{RateEntry, RateSourceError, RateTable};

/// Port trait for anything that can list the active exchange rates.
#[async_trait::async_trait]
pub trait RateSource: Send + Sync {
    /// Returns `{code, rate}` pairs for every active currency.
    async fn fetch_rates(&self) -> Result<Vec<RateEntry>, RateSourceError>;
}

#[async_trait::async_trait]
impl<T: RateSource + ?Sized> RateSource for Arc<T> {
    async fn fetch_rates(&self) -> Result<Vec<RateEntry>, RateSourceError> {
        (**self).fetch_rates().await
    }
}

/// A source serving a fixed table. For development and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticRateSource {
    table: RateTable,
}

impl StaticRateSource {
    pub fn new(table: RateTable) -> Self {
        Self { table }
    }
}

#[async_trait::async_trait]
impl RateSource for StaticRateSource {
    async fn fetch_rates(&self) -> Result<Vec<RateEntry>, RateSourceError> {
        Ok(self
            .table
            .iter()
            .map(|(code, rate)| RateEntry::new(code.as_str(), rate))
            .collect())
    }
}
