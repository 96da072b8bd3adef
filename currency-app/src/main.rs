//! # Currency Application
//!
//! Binary that wires together all the components:
//! - Load configuration from environment
//! - Initialize the repository adapter and warm the rate cache
//! - Create the currency service and schedule its jobs
//! - Start the HTTP server

mod config;

use std::sync::Arc;

use opentelemetry::global;
use opentelemetry_sdk::{propagation::TraceContextPropagator, trace as sdktrace};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use currency_hex::jobs::ScheduledJob;
use currency_hex::{
    CurrencyService, OpenExchangeRatesClient, RefreshConfig, Scheduler, inbound::HttpServer,
};
use currency_repo::build_repo;
use currency_types::RateCache;
use exchange_rates::{CachePolicy, InMemoryRateCache};

fn init_tracer() -> (sdktrace::Tracer, sdktrace::SdkTracerProvider) {
    global::set_text_map_propagator(TraceContextPropagator::new());

    // Use gRPC exporter with batch processing (non-blocking)
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .build()
        .expect("failed to create OTLP span exporter");

    let provider = sdktrace::SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .build();

    global::set_tracer_provider(provider.clone());

    use opentelemetry::trace::TracerProvider as _;
    (provider.tracer("currency-service"), provider)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize OpenTelemetry tracing
    let (otel_tracer, otel_provider) = init_tracer();
    let telemetry = tracing_opentelemetry::layer().with_tracer(otel_tracer);

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,currency_app=debug,currency_hex=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(telemetry)
        .init();

    let config = config::Config::from_env()?;

    tracing::info!("Starting currency server on port {}", config.port);
    tracing::info!("Using database: {}", config.database_url);
    tracing::info!(
        provider = %config.oxr_api_url,
        mode = ?config.refresh_mode,
        refresh_every = ?config.rate_refresh_interval,
        sync_every = ?config.catalog_sync_interval,
        "Rate provider configured"
    );

    // Build repository (handles connection and migration)
    let repo = Arc::new(build_repo(&config.database_url).await?);

    let policy = if config.cache_monotonic {
        CachePolicy::Monotonic
    } else {
        CachePolicy::LastWriteWins
    };
    let cache: Arc<dyn RateCache> = Arc::new(InMemoryRateCache::with_policy(policy));

    let provider = Arc::new(OpenExchangeRatesClient::new(
        &config.oxr_api_url,
        config.provider_timeout,
    )?);

    let refresh = RefreshConfig::new(config.oxr_app_id.clone())
        .with_mode(config.refresh_mode)
        .with_call_timeout(config.provider_timeout);
    let service = Arc::new(CurrencyService::new(repo, provider, cache, refresh));

    service.warm_cache().await?;

    let refresher: Arc<dyn ScheduledJob> = Arc::new(service.refresher().clone());
    let catalog_sync: Arc<dyn ScheduledJob> = Arc::new(service.catalog_sync().clone());
    let scheduler = Scheduler::new()
        .every(config.rate_refresh_interval, refresher)
        .every(config.catalog_sync_interval, catalog_sync)
        .start();

    // Create and run the HTTP server
    let server = HttpServer::with_rate_limit(service, config.rate_limit_per_minute);
    let addr = format!("0.0.0.0:{}", config.port);

    let served = server.run(&addr).await;

    scheduler.shutdown().await;

    // Ensure traces are flushed before exit
    let _ = otel_provider.shutdown();
    served
}
