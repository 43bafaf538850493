//! Error types for rate fetching and conversion.

use std::time::Duration;

use crate::CurrencyCode;

/// Failure to obtain a fresh rate table from a [`RateSource`](crate::RateSource).
///
/// Never surfaced by [`convert`](crate::CurrencyService::convert); the service
/// recovers with the cached or fallback table instead.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RateSourceError {
    #[error("Rate source unavailable: {0}")]
    Unavailable(String),

    #[error("Rate source timed out after {0:?}")]
    Timeout(Duration),

    #[error("Malformed rate data: {0}")]
    Malformed(String),
}

/// Errors from strict conversion.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConvertError {
    #[error("Currency code cannot be empty")]
    EmptyCode,

    #[error("Unknown currency: {0}")]
    UnknownCurrency(CurrencyCode),

    #[error("Amount must be a finite number, got {0}")]
    InvalidAmount(f64),
}
