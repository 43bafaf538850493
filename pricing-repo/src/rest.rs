//! Hosted REST adapter.
//!
//! Talks to the backend platform's auto-generated REST interface for the
//! `currencies` table (`/rest/v1/currencies`). Filters use the `column=op.value`
//! query syntax; writes ask for the affected rows back with
//! `Prefer: return=representation`.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use pricing_types::domain::currency::{validate_name, validate_rate};
use pricing_types::{
    CurrencyCode, CurrencyId, CurrencyRecord, CurrencyRepository, CurrencyStatus, RateEntry,
    RateSource, RateSourceError, RepoError, UpsertCurrencyRequest,
};

use crate::types::{parse_code, parse_status};

/// Currency row as returned by the REST interface.
#[derive(Debug, Deserialize)]
struct RestCurrencyRow {
    id: Uuid,
    code: String,
    name: String,
    symbol: Option<String>,
    rate: f64,
    status: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl RestCurrencyRow {
    fn into_domain(self) -> Result<CurrencyRecord, RepoError> {
        Ok(CurrencyRecord {
            id: CurrencyId::from_uuid(self.id),
            code: parse_code(&self.code)?,
            name: self.name,
            symbol: self.symbol,
            rate: self.rate,
            status: match self.status {
                Some(status) => parse_status(&status)?,
                None => CurrencyStatus::Inactive,
            },
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Serialize)]
struct UpsertBody<'a> {
    code: &'a str,
    name: &'a str,
    symbol: Option<&'a str>,
    rate: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<CurrencyStatus>,
    updated_at: DateTime<Utc>,
}

#[derive(Serialize)]
struct StatusBody {
    status: CurrencyStatus,
    updated_at: DateTime<Utc>,
}

/// Currency repository over the hosted platform's REST interface.
pub struct RestRepo {
    base_url: String,
    api_key: String,
    timeout: Duration,
    http: Client,
}

impl RestRepo {
    /// Creates a client for `base_url` (the project URL, without `/rest/v1`).
    ///
    /// `timeout` bounds every request.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            timeout,
            http,
        })
    }

    fn request(&self, method: Method, query: &[(&str, &str)]) -> RequestBuilder {
        self.http
            .request(method, format!("{}/rest/v1/currencies", self.base_url))
            .query(query)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn rows<T: DeserializeOwned>(request: RequestBuilder) -> Result<Vec<T>, RepoError> {
        let resp = request
            .send()
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;
        let resp = check_status(resp)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;
        resp.json()
            .await
            .map_err(|e| RepoError::Database(format!("Invalid response body: {}", e)))
    }
}

async fn check_status(resp: Response) -> Result<Response, RateSourceError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(RateSourceError::Unavailable(format!(
        "HTTP {}: {}",
        status.as_u16(),
        body
    )))
}

// ─────────────────────────────────────────────────────────────────────────────
// Rate source
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl RateSource for RestRepo {
    async fn fetch_rates(&self) -> Result<Vec<RateEntry>, RateSourceError> {
        let resp = self
            .request(
                Method::GET,
                &[("select", "code,rate"), ("status", "eq.active")],
            )
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RateSourceError::Timeout(self.timeout)
                } else {
                    RateSourceError::Unavailable(e.to_string())
                }
            })?;

        check_status(resp)
            .await?
            .json::<Vec<RateEntry>>()
            .await
            .map_err(|e| RateSourceError::Malformed(e.to_string()))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Repository implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl CurrencyRepository for RestRepo {
    async fn list_currencies(&self) -> Result<Vec<CurrencyRecord>, RepoError> {
        let rows: Vec<RestCurrencyRow> =
            Self::rows(self.request(Method::GET, &[("select", "*"), ("order", "code.asc")]))
                .await?;
        rows.into_iter().map(RestCurrencyRow::into_domain).collect()
    }

    async fn get_currency(&self, code: &CurrencyCode) -> Result<Option<CurrencyRecord>, RepoError> {
        let filter = format!("eq.{}", code);
        let rows: Vec<RestCurrencyRow> =
            Self::rows(self.request(Method::GET, &[("select", "*"), ("code", filter.as_str())])).await?;
        rows.into_iter()
            .next()
            .map(RestCurrencyRow::into_domain)
            .transpose()
    }

    async fn upsert_currency(
        &self,
        code: &CurrencyCode,
        req: UpsertCurrencyRequest,
    ) -> Result<CurrencyRecord, RepoError> {
        validate_name(&req.name)?;
        validate_rate(req.rate)?;

        let body = UpsertBody {
            code: code.as_str(),
            name: req.name.trim(),
            symbol: req.symbol.as_deref(),
            rate: req.rate,
            status: req.status,
            updated_at: Utc::now(),
        };
        let rows: Vec<RestCurrencyRow> = Self::rows(
            self.request(Method::POST, &[("on_conflict", "code")])
                .header("Prefer", "resolution=merge-duplicates,return=representation")
                .json(&body),
        )
        .await?;

        tracing::info!(currency = %code, rate = req.rate, "Currency upserted");
        rows.into_iter()
            .next()
            .ok_or_else(|| RepoError::Database("Upsert returned no row".into()))?
            .into_domain()
    }

    async fn set_currency_status(
        &self,
        code: &CurrencyCode,
        status: CurrencyStatus,
    ) -> Result<CurrencyRecord, RepoError> {
        let filter = format!("eq.{}", code);
        let body = StatusBody {
            status,
            updated_at: Utc::now(),
        };
        let rows: Vec<RestCurrencyRow> = Self::rows(
            self.request(Method::PATCH, &[("code", filter.as_str())])
                .header("Prefer", "return=representation")
                .json(&body),
        )
        .await?;

        let row = rows.into_iter().next().ok_or(RepoError::NotFound)?;
        tracing::info!(currency = %code, %status, "Currency status changed");
        row.into_domain()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use axum::{
        Json, Router,
        extract::{Query, State},
        http::{HeaderMap, StatusCode},
        response::IntoResponse,
        routing::get,
    };

    use super::*;

    #[derive(Default)]
    struct Recorded {
        queries: Vec<HashMap<String, String>>,
        api_keys: Vec<String>,
    }

    type Shared = Arc<Mutex<Recorded>>;

    async fn list_handler(
        State(recorded): State<Shared>,
        headers: HeaderMap,
        Query(query): Query<HashMap<String, String>>,
    ) -> impl IntoResponse {
        let mut recorded = recorded.lock().unwrap();
        recorded.queries.push(query.clone());
        if let Some(key) = headers.get("apikey").and_then(|v| v.to_str().ok()) {
            recorded.api_keys.push(key.to_string());
        }

        if query.get("select").map(String::as_str) == Some("code,rate") {
            return Json(serde_json::json!([
                {"code": "SSP", "rate": 1.0},
                {"code": "USD", "rate": 0.0016}
            ]))
            .into_response();
        }
        Json(serde_json::json!([{
            "id": "5f0d5a52-6a43-4c0e-9a53-3a1f1d6c0002",
            "code": "USD",
            "name": "US Dollar",
            "symbol": "$",
            "rate": 0.0016,
            "status": "active",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        }]))
        .into_response()
    }

    async fn spawn(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    async fn fake_platform() -> (String, Shared) {
        let recorded = Shared::default();
        let router = Router::new()
            .route("/rest/v1/currencies", get(list_handler))
            .with_state(recorded.clone());
        (spawn(router).await, recorded)
    }

    fn repo(base_url: &str) -> RestRepo {
        RestRepo::new(base_url, "anon-key", Duration::from_secs(2)).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_rates_queries_active_currencies() {
        let (url, recorded) = fake_platform().await;

        let rates = repo(&url).fetch_rates().await.unwrap();

        assert_eq!(rates.len(), 2);
        assert_eq!(rates[1], RateEntry::new("USD", 0.0016));

        let recorded = recorded.lock().unwrap();
        assert_eq!(recorded.queries[0].get("status").unwrap(), "eq.active");
        assert_eq!(recorded.api_keys, vec!["anon-key".to_string()]);
    }

    #[tokio::test]
    async fn test_get_currency_maps_row() {
        let (url, recorded) = fake_platform().await;
        let usd = CurrencyCode::new("USD").unwrap();

        let record = repo(&url).get_currency(&usd).await.unwrap().unwrap();

        assert_eq!(record.code, usd);
        assert_eq!(record.symbol.as_deref(), Some("$"));
        assert!(record.is_active());
        assert_eq!(
            recorded.lock().unwrap().queries[0].get("code").unwrap(),
            "eq.USD"
        );
    }

    #[tokio::test]
    async fn test_server_error_is_unavailable() {
        let router = Router::new().route(
            "/rest/v1/currencies",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let url = spawn(router).await;

        let result = repo(&url).fetch_rates().await;

        assert!(matches!(result, Err(RateSourceError::Unavailable(msg)) if msg.contains("500")));
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let router = Router::new().route(
            "/rest/v1/currencies",
            get(|| async { Json(serde_json::json!({"unexpected": true})) }),
        );
        let url = spawn(router).await;

        let result = repo(&url).fetch_rates().await;

        assert!(matches!(result, Err(RateSourceError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_unreachable_platform() {
        // Bind then drop to get a port nobody listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = repo(&format!("http://{}", addr)).fetch_rates().await;

        assert!(matches!(result, Err(RateSourceError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_upsert_validates_before_sending() {
        let result = repo("http://127.0.0.1:9")
            .upsert_currency(
                &CurrencyCode::new("USD").unwrap(),
                UpsertCurrencyRequest {
                    name: "US Dollar".into(),
                    symbol: None,
                    rate: 0.0,
                    status: None,
                },
            )
            .await;

        assert!(matches!(result, Err(RepoError::Domain(_))));
    }
}
