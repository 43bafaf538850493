//! Data Transfer Objects (DTOs) for requests and responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::CurrencyStatus;
use crate::{CartLine, CurrencyCode, PricedItem};

// ─────────────────────────────────────────────────────────────────────────────
// Conversion DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Query parameters for a single conversion.
#[derive(Debug, Clone, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ConvertQuery {
    /// Amount in the `from` currency
    #[param(example = 1000.0)]
    pub amount: f64,
    /// Source currency code
    #[param(value_type = String, example = "SSP")]
    pub from: CurrencyCode,
    /// Target currency code; the server's display currency when omitted
    #[param(value_type = Option<String>, example = "USD")]
    #[serde(default)]
    pub to: Option<CurrencyCode>,
}

/// Result of a conversion. Conversion never fails: when a rate is missing the
/// original amount comes back with `converted: false`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConvertResponse {
    #[schema(example = 1000.0)]
    pub amount: f64,
    pub from: CurrencyCode,
    pub to: CurrencyCode,
    #[schema(example = 2.0)]
    pub converted_amount: f64,
    /// Whether a rate was applied
    pub converted: bool,
    /// Units of `to` per unit of `from`, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate: Option<f64>,
    #[schema(example = "USD 2")]
    pub formatted: String,
}

/// Supported currencies.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CurrenciesResponse {
    pub base: CurrencyCode,
    pub currencies: Vec<CurrencyCode>,
    /// When rates were last fetched successfully; absent while on fallback
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rates_updated_at: Option<DateTime<Utc>>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Cart DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to total a cart in one currency.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CartTotalRequest {
    /// Target currency; the server's display currency when omitted
    #[serde(default)]
    pub currency: Option<CurrencyCode>,
    pub items: Vec<PricedItem>,
}

/// Cart converted line by line.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CartTotalResponse {
    pub currency: CurrencyCode,
    pub lines: Vec<CartLine>,
    #[schema(example = 4.0)]
    pub total: f64,
    #[schema(example = "USD 4")]
    pub formatted_total: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Admin DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to create or update a currency. The code comes from the path.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpsertCurrencyRequest {
    #[schema(example = "US Dollar")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "$")]
    pub symbol: Option<String>,
    /// Units of this currency per one unit of the base currency
    #[schema(example = 0.0016)]
    pub rate: f64,
    /// Defaults to `active` for new currencies; unchanged for existing ones
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<CurrencyStatus>,
}

/// Request to activate or deactivate a currency.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SetCurrencyStatusRequest {
    pub status: CurrencyStatus,
}

/// Outcome of a forced refresh.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RefreshResponse {
    /// Number of currencies in the refreshed table
    #[schema(example = 4)]
    pub currencies: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refreshed_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert_request_optional_fields() {
        let req: UpsertCurrencyRequest =
            serde_json::from_str(r#"{"name": "Kenyan Shilling", "rate": 0.2}"#).unwrap();
        assert!(req.symbol.is_none());
        assert!(req.status.is_none());
    }

    #[test]
    fn test_cart_request_currency_is_optional() {
        let req: CartTotalRequest =
            serde_json::from_str(r#"{"items": [{"price": 10, "currency": "usd"}]}"#).unwrap();
        assert!(req.currency.is_none());
        assert_eq!(req.items[0].currency.as_ref().unwrap().as_str(), "USD");
    }
}
