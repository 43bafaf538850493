//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use pricing_types::{
    AppError, CartTotalRequest, ConvertQuery, CurrencyCode, CurrencyRepository,
    SetCurrencyStatusRequest, UpsertCurrencyRequest,
};

use super::extract::{ApiJson, ApiQuery};
use crate::PricingService;

/// Application state shared across handlers.
pub struct AppState<R: CurrencyRepository> {
    pub service: PricingService<R>,
    /// SHA-256 hex of the admin token; admin routes are closed when unset.
    pub admin_token_hash: Option<String>,
}

/// Wrapper to implement IntoResponse for AppError (orphan rule workaround).
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self.0 {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        error_response(status, &message)
    }
}

pub(crate) fn error_response(status: StatusCode, message: &str) -> Response {
    let body = serde_json::json!({
        "error": message,
        "code": status.as_u16()
    });
    (status, Json(body)).into_response()
}

fn parse_code(raw: &str) -> Result<CurrencyCode, ApiError> {
    CurrencyCode::new(raw).map_err(|e| ApiError(e.into()))
}

/// Health check endpoint.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

// ─────────────────────────────────────────────────────────────────────────────
// Public pricing endpoints
// ─────────────────────────────────────────────────────────────────────────────

/// List the currencies conversions support.
pub async fn list_supported<R: CurrencyRepository>(
    State(state): State<Arc<AppState<R>>>,
) -> impl IntoResponse {
    Json(state.service.currencies().await)
}

/// Convert a single amount.
#[tracing::instrument(skip(state), fields(from = %query.from, amount = query.amount))]
pub async fn convert<R: CurrencyRepository>(
    State(state): State<Arc<AppState<R>>>,
    ApiQuery(query): ApiQuery<ConvertQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let resp = state.service.convert(query).await?;
    Ok(Json(resp))
}

/// Total a cart in one currency.
#[tracing::instrument(skip(state, req), fields(items = req.items.len()))]
pub async fn cart_total<R: CurrencyRepository>(
    State(state): State<Arc<AppState<R>>>,
    ApiJson(req): ApiJson<CartTotalRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let resp = state.service.cart_total(req).await?;
    Ok(Json(resp))
}

// ─────────────────────────────────────────────────────────────────────────────
// Admin endpoints
// ─────────────────────────────────────────────────────────────────────────────

/// List every stored currency.
#[tracing::instrument(skip(state))]
pub async fn list_currencies<R: CurrencyRepository>(
    State(state): State<Arc<AppState<R>>>,
) -> Result<impl IntoResponse, ApiError> {
    let currencies = state.service.list_currencies().await?;
    Ok(Json(currencies))
}

/// Get a stored currency.
#[tracing::instrument(skip(state))]
pub async fn get_currency<R: CurrencyRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(code): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let code = parse_code(&code)?;
    let currency = state.service.get_currency(&code).await?;
    Ok(Json(currency))
}

/// Create or update a currency.
#[tracing::instrument(skip(state, req), fields(rate = req.rate))]
pub async fn upsert_currency<R: CurrencyRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(code): Path<String>,
    ApiJson(req): ApiJson<UpsertCurrencyRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let code = parse_code(&code)?;
    let currency = state.service.upsert_currency(&code, req).await?;
    Ok(Json(currency))
}

/// Activate or deactivate a currency.
#[tracing::instrument(skip(state), fields(status = %req.status))]
pub async fn set_currency_status<R: CurrencyRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(code): Path<String>,
    ApiJson(req): ApiJson<SetCurrencyStatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let code = parse_code(&code)?;
    let currency = state.service.set_currency_status(&code, req.status).await?;
    Ok(Json(currency))
}

/// Force a rate refresh.
#[tracing::instrument(skip(state))]
pub async fn refresh_rates<R: CurrencyRepository>(
    State(state): State<Arc<AppState<R>>>,
) -> Result<impl IntoResponse, ApiError> {
    let resp = state.service.refresh_rates().await?;
    Ok(Json(resp))
}
