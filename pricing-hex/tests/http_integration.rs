//! HTTP-level tests for the pricing router.
//!
//! Runs the full middleware stack against an in-memory SQLite database
//! seeded with SSP and USD.
//!
//! This test requires the `sqlite` feature flag.

#![cfg(feature = "sqlite")]

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use http_body_util::BodyExt;
use pricing_hex::{PricingService, inbound::HttpServer};
use pricing_repo::SqliteRepo;
use serde_json::{Value, json};
use tower::ServiceExt;

const ADMIN_TOKEN: &str = "test-admin-token";

async fn create_app(admin_token: Option<&str>) -> Router {
    let repo = SqliteRepo::new("sqlite::memory:").await.unwrap();
    HttpServer::new(PricingService::new(repo), admin_token).router()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn admin(method: Method, uri: &str, token: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Authorization", format!("Bearer {}", token));
    match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_health() {
    let app = create_app(None).await;

    let (status, body) = send(&app, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_convert_with_seeded_rates() {
    let app = create_app(None).await;

    let (status, body) = send(&app, get("/api/convert?amount=1000&from=SSP&to=usd")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["to"], "USD");
    assert_eq!(body["converted_amount"], 2.0);
    assert_eq!(body["converted"], true);
    assert_eq!(body["formatted"], "USD 2");
}

#[tokio::test]
async fn test_convert_unknown_currency_is_not_an_error() {
    let app = create_app(None).await;

    let (status, body) = send(&app, get("/api/convert?amount=500&from=SSP&to=EUR")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["converted"], false);
    assert_eq!(body["converted_amount"], 500.0);
}

#[tokio::test]
async fn test_convert_missing_source_currency() {
    let app = create_app(None).await;

    let (status, body) = send(&app, get("/api/convert?amount=500")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 400);
    assert!(body["error"].as_str().unwrap().contains("from"));
}

#[tokio::test]
async fn test_cart_total_malformed_body_is_json_error() {
    let app = create_app(None).await;
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/cart/total")
        .header("Content-Type", "application/json")
        .body(Body::from("{\"currency\": \"USD\", \"items\": ["))
        .unwrap();

    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 400);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_admin_upsert_wrong_shape_is_json_error() {
    let app = create_app(Some(ADMIN_TOKEN)).await;

    let (status, body) = send(
        &app,
        admin(
            Method::PUT,
            "/api/admin/currencies/KES",
            ADMIN_TOKEN,
            Some(json!({"name": "Kenyan Shilling", "rate": "lots"})),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], 422);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_cart_total() {
    let app = create_app(None).await;
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/cart/total")
        .header("Content-Type", "application/json")
        .body(Body::from(
            json!({
                "currency": "USD",
                "items": [
                    {"price": 1000, "currency": "SSP", "quantity": 2},
                    {"price": 3, "currency": "USD"}
                ]
            })
            .to_string(),
        ))
        .unwrap();

    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["lines"][0]["unit_price"], 2.0);
    assert_eq!(body["total"], 7.0);
    assert_eq!(body["formatted_total"], "USD 7");
}

#[tokio::test]
async fn test_admin_disabled_without_token() {
    let app = create_app(None).await;

    let (status, body) = send(
        &app,
        admin(Method::GET, "/api/admin/currencies", "anything", None),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 401);
}

#[tokio::test]
async fn test_admin_rejects_wrong_token() {
    let app = create_app(Some(ADMIN_TOKEN)).await;

    let (status, _) = send(
        &app,
        admin(Method::GET, "/api/admin/currencies", "wrong", None),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_lists_currencies() {
    let app = create_app(Some(ADMIN_TOKEN)).await;

    let (status, body) = send(
        &app,
        admin(Method::GET, "/api/admin/currencies", ADMIN_TOKEN, None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let codes: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["code"].as_str().unwrap())
        .collect();
    assert_eq!(codes, vec!["SSP", "USD"]);
}

#[tokio::test]
async fn test_admin_upsert_feeds_conversions() {
    let app = create_app(Some(ADMIN_TOKEN)).await;

    let (status, body) = send(
        &app,
        admin(
            Method::PUT,
            "/api/admin/currencies/kes",
            ADMIN_TOKEN,
            Some(json!({"name": "Kenyan Shilling", "symbol": "KSh", "rate": 0.2})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], "KES");
    assert_eq!(body["status"], "active");

    let (_, body) = send(&app, get("/api/convert?amount=1234&from=SSP")).await;
    assert_eq!(body["to"], "KES");
    assert_eq!(body["converted_amount"], 247.0);
}

#[tokio::test]
async fn test_admin_deactivate_removes_currency() {
    let app = create_app(Some(ADMIN_TOKEN)).await;

    let (status, body) = send(
        &app,
        admin(
            Method::POST,
            "/api/admin/currencies/USD/status",
            ADMIN_TOKEN,
            Some(json!({"status": "inactive"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "inactive");

    let (_, body) = send(&app, get("/api/currencies")).await;
    assert_eq!(body["currencies"], json!(["SSP"]));
}

#[tokio::test]
async fn test_admin_unknown_currency_is_404() {
    let app = create_app(Some(ADMIN_TOKEN)).await;

    let (status, body) = send(
        &app,
        admin(Method::GET, "/api/admin/currencies/ZZZ", ADMIN_TOKEN, None),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 404);
}

#[tokio::test]
async fn test_admin_refresh() {
    let app = create_app(Some(ADMIN_TOKEN)).await;

    let (status, body) = send(
        &app,
        admin(Method::POST, "/api/admin/rates/refresh", ADMIN_TOKEN, None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["currencies"], 2);
    assert!(body["refreshed_at"].is_string());
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = create_app(None).await;

    let (status, body) = send(&app, get("/api-docs/openapi.json")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["info"]["title"], "Marketplace Pricing API");
}
