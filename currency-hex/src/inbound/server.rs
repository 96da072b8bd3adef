//! HTTP Server configuration and startup.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use currency_types::{CurrencyRepository, RateProviderClient, RateStore};

use super::handlers::{self, AppState};
use super::rate_limit::{RateLimiterState, rate_limit_middleware};
use crate::CurrencyService;

/// HTTP Server for the Currency API.
pub struct HttpServer<R, P> {
    state: Arc<AppState<R, P>>,
    rate_limiter: Arc<RateLimiterState>,
}

impl<R, P> HttpServer<R, P>
where
    R: CurrencyRepository + RateStore,
    P: RateProviderClient,
{
    /// Creates a new HTTP server with the given service.
    pub fn new(service: Arc<CurrencyService<R, P>>) -> Self {
        Self {
            state: Arc::new(AppState { service }),
            rate_limiter: Arc::new(RateLimiterState::default()), // 100 req/min default
        }
    }

    /// Creates a new HTTP server with custom rate limiting.
    pub fn with_rate_limit(service: Arc<CurrencyService<R, P>>, requests_per_minute: u32) -> Self {
        Self {
            state: Arc::new(AppState { service }),
            rate_limiter: Arc::new(RateLimiterState::new(
                requests_per_minute,
                Duration::from_secs(60),
            )),
        }
    }

    /// Builds the Axum router with all routes.
    pub fn router(&self) -> Router {
        // Build HTTP metrics layer (uses globally set MeterProvider)
        let metrics = axum_otel_metrics::HttpMetricsLayerBuilder::new().build();

        Router::new()
            .route("/health", get(handlers::health))
            .route("/api-docs/openapi.json", get(handlers::openapi_json))
            .route(
                "/api/currencies",
                get(handlers::list_currencies::<R, P>).post(handlers::create_currency::<R, P>),
            )
            .route("/api/currencies/refresh", post(handlers::sync_catalog::<R, P>))
            .route(
                "/api/currencies/convert",
                get(handlers::convert::<R, P>),
            )
            .route(
                "/api/currencies/exchange-rates",
                get(handlers::list_rates::<R, P>).post(handlers::record_rate::<R, P>),
            )
            .route(
                "/api/currencies/exchange-rates/refresh",
                post(handlers::refresh_rates::<R, P>),
            )
            .route(
                "/api/currencies/exchange-rates/{code}/latest",
                get(handlers::latest_rate::<R, P>),
            )
            .route(
                "/api/currencies/exchange-rates/{code}/history",
                get(handlers::rate_history::<R, P>),
            )
            .route(
                "/api/currencies/{code}",
                get(handlers::get_currency::<R, P>).put(handlers::update_currency::<R, P>),
            )
            .layer(metrics)
            .layer(middleware::from_fn_with_state(
                self.rate_limiter.clone(),
                rate_limit_middleware,
            ))
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

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
