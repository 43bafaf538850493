//! # Pricing Client SDK
//!
//! A typed Rust client for the Pricing API.

use pricing_types::{
    CartTotalRequest, CartTotalResponse, ConvertResponse, CurrenciesResponse, CurrencyCode,
    CurrencyRecord, CurrencyStatus, PricedItem, RefreshResponse, SetCurrencyStatusRequest,
    UpsertCurrencyRequest,
};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;

/// Error type for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Pricing API client.
pub struct PricingClient {
    base_url: String,
    admin_token: Option<String>,
    http: Client,
}

impl PricingClient {
    /// Creates a new client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            admin_token: None,
            http: Client::new(),
        }
    }

    /// Sets the bearer token sent to admin endpoints.
    pub fn with_admin_token(mut self, token: impl Into<String>) -> Self {
        self.admin_token = Some(token.into());
        self
    }

    /// Checks if the API is healthy.
    pub async fn health(&self) -> Result<bool, ClientError> {
        let resp = self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;
        Ok(resp.status().is_success())
    }

    /// Lists the currencies conversions support.
    pub async fn currencies(&self) -> Result<CurrenciesResponse, ClientError> {
        self.send(self.request(Method::GET, "/api/currencies")).await
    }

    /// Converts an amount. `to` defaults to the server's display currency.
    pub async fn convert(
        &self,
        amount: f64,
        from: &CurrencyCode,
        to: Option<&CurrencyCode>,
    ) -> Result<ConvertResponse, ClientError> {
        let mut query = vec![("amount", amount.to_string()), ("from", from.to_string())];
        if let Some(to) = to {
            query.push(("to", to.to_string()));
        }
        self.send(self.request(Method::GET, "/api/convert").query(&query))
            .await
    }

    /// Totals a cart, line by line, in one currency.
    pub async fn cart_total(
        &self,
        items: Vec<PricedItem>,
        currency: Option<CurrencyCode>,
    ) -> Result<CartTotalResponse, ClientError> {
        let req = CartTotalRequest { currency, items };
        self.send(self.request(Method::POST, "/api/cart/total").json(&req))
            .await
    }

    // Admin

    /// Lists every stored currency, active or not.
    pub async fn list_currencies(&self) -> Result<Vec<CurrencyRecord>, ClientError> {
        self.send(self.admin(Method::GET, "/api/admin/currencies"))
            .await
    }

    /// Gets a stored currency.
    pub async fn get_currency(&self, code: &CurrencyCode) -> Result<CurrencyRecord, ClientError> {
        self.send(self.admin(Method::GET, &format!("/api/admin/currencies/{}", code)))
            .await
    }

    /// Creates or updates a currency.
    pub async fn upsert_currency(
        &self,
        code: &CurrencyCode,
        req: &UpsertCurrencyRequest,
    ) -> Result<CurrencyRecord, ClientError> {
        self.send(
            self.admin(Method::PUT, &format!("/api/admin/currencies/{}", code))
                .json(req),
        )
        .await
    }

    /// Activates or deactivates a currency.
    pub async fn set_currency_status(
        &self,
        code: &CurrencyCode,
        status: CurrencyStatus,
    ) -> Result<CurrencyRecord, ClientError> {
        self.send(
            self.admin(
                Method::POST,
                &format!("/api/admin/currencies/{}/status", code),
            )
            .json(&SetCurrencyStatusRequest { status }),
        )
        .await
    }

    /// Forces the server to refetch its rates.
    pub async fn refresh_rates(&self) -> Result<RefreshResponse, ClientError> {
        self.send(self.admin(Method::POST, "/api/admin/rates/refresh"))
            .await
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
    }

    fn admin(&self, method: Method, path: &str) -> RequestBuilder {
        let req = self.request(method, path);
        match &self.admin_token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ClientError> {
        let resp = req.send().await?;
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            Ok(serde_json::from_str(&body)?)
        } else {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
                .unwrap_or(body);
            Err(ClientError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use axum::{
        Json, Router,
        extract::Query,
        http::{HeaderMap, StatusCode},
        response::IntoResponse,
        routing::{get, post},
    };

    use super::*;

    async fn spawn(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn code(s: &str) -> CurrencyCode {
        CurrencyCode::new(s).unwrap()
    }

    #[test]
    fn test_client_creation() {
        let client = PricingClient::new("http://localhost:3000");
        assert_eq!(client.base_url, "http://localhost:3000");
    }

    #[test]
    fn test_client_with_trailing_slash() {
        let client = PricingClient::new("http://localhost:3000/");
        assert_eq!(client.base_url, "http://localhost:3000");
    }

    #[test]
    fn test_client_with_admin_token() {
        let client = PricingClient::new("http://localhost:3000").with_admin_token("secret");
        assert_eq!(client.admin_token, Some("secret".to_string()));
    }

    #[tokio::test]
    async fn test_convert_sends_query() {
        let router = Router::new().route(
            "/api/convert",
            get(|Query(q): Query<HashMap<String, String>>| async move {
                Json(serde_json::json!({
                    "amount": q["amount"].parse::<f64>().unwrap(),
                    "from": q["from"],
                    "to": q.get("to").cloned().unwrap_or_else(|| "KES".into()),
                    "converted_amount": 2.0,
                    "converted": true,
                    "rate": 0.0016,
                    "formatted": "USD 2"
                }))
            }),
        );
        let client = PricingClient::new(spawn(router).await);

        let resp = client
            .convert(1000.0, &code("SSP"), Some(&code("USD")))
            .await
            .unwrap();

        assert_eq!(resp.to, code("USD"));
        assert_eq!(resp.converted_amount, 2.0);
        assert!(resp.converted);
    }

    #[tokio::test]
    async fn test_admin_sends_bearer_token() {
        let router = Router::new().route(
            "/api/admin/rates/refresh",
            post(|headers: HeaderMap| async move {
                match headers.get("authorization").and_then(|v| v.to_str().ok()) {
                    Some("Bearer secret") => {
                        Json(serde_json::json!({"currencies": 2})).into_response()
                    }
                    _ => (
                        StatusCode::UNAUTHORIZED,
                        Json(serde_json::json!({"error": "Invalid admin token", "code": 401})),
                    )
                        .into_response(),
                }
            }),
        );
        let url = spawn(router).await;

        let ok = PricingClient::new(&url)
            .with_admin_token("secret")
            .refresh_rates()
            .await
            .unwrap();
        assert_eq!(ok.currencies, 2);

        let err = PricingClient::new(&url).refresh_rates().await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::Api { status: 401, ref message } if message == "Invalid admin token"
        ));
    }
}
