//! OpenAPI document for the Pricing API.

#![allow(dead_code)] // Path functions only carry `#[utoipa::path]` metadata

use pricing_types::{
    CartLine, CartTotalRequest, CartTotalResponse, ConvertQuery, ConvertResponse,
    CurrenciesResponse, CurrencyCode, CurrencyId, CurrencyRecord, CurrencyStatus, PricedItem,
    RefreshResponse, SetCurrencyStatusRequest, UpsertCurrencyRequest,
};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = inline(serde_json::Value), example = json!({"status": "healthy"}))
    )
)]
async fn health() {}

/// Currencies available for conversion
#[utoipa::path(
    get,
    path = "/api/currencies",
    tag = "pricing",
    responses(
        (status = 200, description = "Supported currency codes", body = CurrenciesResponse)
    )
)]
async fn list_supported() {}

/// Convert an amount between currencies
///
/// Unknown currencies return the original amount with `converted: false`.
#[utoipa::path(
    get,
    path = "/api/convert",
    tag = "pricing",
    params(ConvertQuery),
    responses(
        (status = 200, description = "Conversion result", body = ConvertResponse),
        (status = 400, description = "Invalid amount or currency code")
    )
)]
async fn convert() {}

/// Total a cart in one currency
#[utoipa::path(
    post,
    path = "/api/cart/total",
    tag = "pricing",
    request_body = CartTotalRequest,
    responses(
        (status = 200, description = "Cart total", body = CartTotalResponse),
        (status = 400, description = "Invalid item price")
    )
)]
async fn cart_total() {}

/// List every stored currency
#[utoipa::path(
    get,
    path = "/api/admin/currencies",
    tag = "admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All currencies", body = Vec<CurrencyRecord>),
        (status = 401, description = "Unauthorized")
    )
)]
async fn list_currencies() {}

/// Get a stored currency
#[utoipa::path(
    get,
    path = "/api/admin/currencies/{code}",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(
        ("code" = String, Path, description = "Currency code", example = "USD")
    ),
    responses(
        (status = 200, description = "Currency details", body = CurrencyRecord),
        (status = 404, description = "Currency not found"),
        (status = 401, description = "Unauthorized")
    )
)]
async fn get_currency() {}

/// Create or update a currency
#[utoipa::path(
    put,
    path = "/api/admin/currencies/{code}",
    tag = "admin",
    request_body = UpsertCurrencyRequest,
    security(("bearer_auth" = [])),
    params(
        ("code" = String, Path, description = "Currency code", example = "USD")
    ),
    responses(
        (status = 200, description = "Stored currency", body = CurrencyRecord),
        (status = 400, description = "Invalid name or rate"),
        (status = 401, description = "Unauthorized")
    )
)]
async fn upsert_currency() {}

/// Activate or deactivate a currency
#[utoipa::path(
    post,
    path = "/api/admin/currencies/{code}/status",
    tag = "admin",
    request_body = SetCurrencyStatusRequest,
    security(("bearer_auth" = [])),
    params(
        ("code" = String, Path, description = "Currency code", example = "USD")
    ),
    responses(
        (status = 200, description = "Updated currency", body = CurrencyRecord),
        (status = 404, description = "Currency not found"),
        (status = 401, description = "Unauthorized")
    )
)]
async fn set_currency_status() {}

/// Refetch rates now
#[utoipa::path(
    post,
    path = "/api/admin/rates/refresh",
    tag = "admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Rates refreshed", body = RefreshResponse),
        (status = 503, description = "Rate source unavailable"),
        (status = 401, description = "Unauthorized")
    )
)]
async fn refresh_rates() {}

/// OpenAPI documentation for the Pricing API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Marketplace Pricing API",
        version = "1.0.0",
        description = "Currency conversion and cart pricing for the marketplace.\n\nAll rates are quoted against the base currency (SSP). Admin endpoints require the admin token:\n\n```\nAuthorization: Bearer <admin token>\n```",
        license(name = "MIT"),
    ),
    paths(
        health,
        list_supported,
        convert,
        cart_total,
        list_currencies,
        get_currency,
        upsert_currency,
        set_currency_status,
        refresh_rates,
    ),
    components(
        schemas(
            CurrencyCode,
            CurrencyId,
            CurrencyStatus,
            CurrencyRecord,
            ConvertResponse,
            CurrenciesResponse,
            PricedItem,
            CartLine,
            CartTotalRequest,
            CartTotalResponse,
            UpsertCurrencyRequest,
            SetCurrencyStatusRequest,
            RefreshResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "pricing", description = "Conversion and cart pricing"),
        (name = "admin", description = "Currency table administration"),
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for Bearer token authentication.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_admin_paths() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/convert"));
        assert!(doc.paths.paths.contains_key("/api/admin/currencies/{code}"));
        assert!(
            doc.components
                .unwrap()
                .security_schemes
                .contains_key("bearer_auth")
        );
    }
}
