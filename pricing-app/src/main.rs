//! # Pricing Application
//!
//! Binary that wires together all the components:
//! - Load configuration from environment
//! - Initialize the currency table adapter (database or hosted REST)
//! - Build the rate cache and warm it
//! - Optionally start the background refresher
//! - Start the HTTP server

mod config;

use std::sync::Arc;

use opentelemetry::global;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{propagation::TraceContextPropagator, trace as sdktrace};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use currency_converter::{CurrencyService, RateRefresher};
use pricing_hex::{PricingService, inbound::HttpServer};
use pricing_repo::{RestRepo, build_repo};
use pricing_types::CurrencyRepository;

use config::{Config, RateBackend};

fn init_tracer(
    endpoint: &str,
) -> anyhow::Result<(sdktrace::Tracer, sdktrace::SdkTracerProvider)> {
    global::set_text_map_propagator(TraceContextPropagator::new());

    // gRPC exporter with batch processing (non-blocking)
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()?;

    let provider = sdktrace::SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .build();

    global::set_tracer_provider(provider.clone());

    use opentelemetry::trace::TracerProvider as _;
    Ok((provider.tracer("pricing-service"), provider))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    // OpenTelemetry export only when a collector is configured
    let otel = config
        .otlp_endpoint
        .as_deref()
        .map(init_tracer)
        .transpose()?;
    let telemetry = otel
        .as_ref()
        .map(|(tracer, _)| tracing_opentelemetry::layer().with_tracer(tracer.clone()));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "info,pricing_app=debug,pricing_hex=debug,currency_converter=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(telemetry)
        .init();

    tracing::info!("Starting pricing server on port {}", config.port);

    match &config.backend {
        RateBackend::Database { url } => {
            tracing::info!("Using database: {}", url);
            // Handles connection and migration
            let repo = build_repo(url).await?;
            serve(repo, &config).await?;
        }
        RateBackend::Rest { url, api_key } => {
            tracing::info!("Using hosted REST rates: {}", url);
            let repo = RestRepo::new(url.as_str(), api_key.as_str(), config.fetch_timeout)?;
            serve(repo, &config).await?;
        }
    }

    // Ensure traces are flushed before exit
    if let Some((_, provider)) = otel {
        let _ = provider.shutdown();
    }
    Ok(())
}

async fn serve<R: CurrencyRepository>(repo: R, config: &Config) -> anyhow::Result<()> {
    let repo = Arc::new(repo);

    let rates = Arc::new(
        CurrencyService::builder(repo.clone())
            .ttl(config.ttl)
            .fetch_timeout(config.fetch_timeout)
            .rounding(config.rounding)
            .build(),
    );
    rates.warm_up().await;

    let refresher = config
        .refresh_interval
        .map(|interval| RateRefresher::new(rates.clone(), interval).spawn());

    if config.admin_token.is_none() {
        tracing::warn!("ADMIN_TOKEN not set, admin endpoints are disabled");
    }

    let service = PricingService::with_rates(repo, rates)
        .display_currency(config.display_currency.clone());
    let server = HttpServer::new(service, config.admin_token.as_deref());
    let addr = format!("0.0.0.0:{}", config.port);

    let result = server.run(&addr).await;

    if let Some(handle) = refresher {
        handle.abort();
    }
    result
}
