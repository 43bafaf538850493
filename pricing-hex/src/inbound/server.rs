//! HTTP Server configuration and startup.

use std::sync::Arc;

use axum::{
    Json, Router, middleware,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;

use pricing_types::CurrencyRepository;

use super::auth::admin_auth;
use super::handlers::{self, AppState};
use crate::PricingService;
use crate::openapi::ApiDoc;

/// HTTP Server for the Pricing API.
pub struct HttpServer<R: CurrencyRepository> {
    state: Arc<AppState<R>>,
}

impl<R: CurrencyRepository> HttpServer<R> {
    /// Creates a new HTTP server. Admin routes accept `admin_token` as a
    /// bearer token; without one they always answer 401.
    pub fn new(service: PricingService<R>, admin_token: Option<&str>) -> Self {
        let admin_token_hash = admin_token
            .filter(|t| !t.is_empty())
            .map(pricing_repo::security::hash_token);
        Self {
            state: Arc::new(AppState {
                service,
                admin_token_hash,
            }),
        }
    }

    /// Builds the Axum router with all routes.
    pub fn router(&self) -> Router {
        // Build HTTP metrics layer (uses globally set MeterProvider)
        let metrics = axum_otel_metrics::HttpMetricsLayerBuilder::new().build();

        let admin = Router::new()
            .route("/currencies", get(handlers::list_currencies::<R>))
            .route(
                "/currencies/{code}",
                get(handlers::get_currency::<R>).put(handlers::upsert_currency::<R>),
            )
            .route(
                "/currencies/{code}/status",
                post(handlers::set_currency_status::<R>),
            )
            .route("/rates/refresh", post(handlers::refresh_rates::<R>))
            .route_layer(middleware::from_fn_with_state(
                self.state.clone(),
                admin_auth::<R>,
            ));

        Router::new()
            .route("/health", get(handlers::health))
            .route("/api-docs/openapi.json", get(openapi_json))
            .route("/api/currencies", get(handlers::list_supported::<R>))
            .route("/api/convert", get(handlers::convert::<R>))
            .route("/api/cart/total", post(handlers::cart_total::<R>))
            .nest("/api/admin", admin)
            .layer(metrics)
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Runs the server on the given address with graceful shutdown.
    pub async fn run(self, addr: &str) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Server listening on {}", listener.local_addr()?);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections");
}
