//! OpenAPI specification and documentation.

#![allow(dead_code)] // Path functions are only used by utoipa for documentation generation

use currency_types::domain::{Currency, CurrencyId, ExchangeRate, RateId};
use currency_types::dto::{
    CatalogSyncReport, ConversionQuery, ConversionResponse, CreateCurrencyRequest,
    RateHistoryQuery, RecordRateRequest, RefreshReport, UpdateCurrencyRequest,
};
use utoipa::OpenApi;

// Dummy functions to generate path documentation
// These are not the actual handlers, just for OpenAPI path generation

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

/// List all currencies
#[utoipa::path(
    get,
    path = "/api/currencies",
    tag = "currencies",
    responses(
        (status = 200, description = "Currency catalog", body = Vec<Currency>)
    )
)]
async fn list_currencies() {}

/// Add a currency to the catalog
#[utoipa::path(
    post,
    path = "/api/currencies",
    tag = "currencies",
    request_body = CreateCurrencyRequest,
    responses(
        (status = 201, description = "Currency created", body = Currency),
        (status = 400, description = "Invalid code or name, or code already exists")
    )
)]
async fn create_currency() {}

/// Get a currency by code
#[utoipa::path(
    get,
    path = "/api/currencies/{code}",
    tag = "currencies",
    params(("code" = String, Path, description = "Three letter currency code")),
    responses(
        (status = 200, description = "Currency found", body = Currency),
        (status = 404, description = "Currency not found")
    )
)]
async fn get_currency() {}

/// Update name and base of a currency
#[utoipa::path(
    put,
    path = "/api/currencies/{code}",
    tag = "currencies",
    params(("code" = String, Path, description = "Three letter currency code")),
    request_body = UpdateCurrencyRequest,
    responses(
        (status = 200, description = "Currency updated", body = Currency),
        (status = 400, description = "Invalid name or base"),
        (status = 404, description = "Currency not found")
    )
)]
async fn update_currency() {}

/// Sync the catalog with the provider's currency list
#[utoipa::path(
    post,
    path = "/api/currencies/refresh",
    tag = "currencies",
    responses(
        (status = 200, description = "Sync finished", body = CatalogSyncReport)
    )
)]
async fn sync_catalog() {}

/// List every stored rate
#[utoipa::path(
    get,
    path = "/api/currencies/exchange-rates",
    tag = "exchange-rates",
    responses(
        (status = 200, description = "Stored rates", body = Vec<ExchangeRate>)
    )
)]
async fn list_rates() {}

/// Record a rate by hand
#[utoipa::path(
    post,
    path = "/api/currencies/exchange-rates",
    tag = "exchange-rates",
    request_body = RecordRateRequest,
    responses(
        (status = 201, description = "Rate stored and cached", body = ExchangeRate),
        (status = 400, description = "Invalid code or rate")
    )
)]
async fn record_rate() {}

/// Refresh rates from the provider now
#[utoipa::path(
    post,
    path = "/api/currencies/exchange-rates/refresh",
    tag = "exchange-rates",
    responses(
        (status = 200, description = "Refresh finished", body = RefreshReport)
    )
)]
async fn refresh_rates() {}

/// Latest rate for a currency
#[utoipa::path(
    get,
    path = "/api/currencies/exchange-rates/{code}/latest",
    tag = "exchange-rates",
    params(("code" = String, Path, description = "Three letter currency code")),
    responses(
        (status = 200, description = "Latest rate", body = ExchangeRate),
        (status = 404, description = "No rate stored for this currency")
    )
)]
async fn latest_rate() {}

/// Rates for a currency within a time window, newest first
#[utoipa::path(
    get,
    path = "/api/currencies/exchange-rates/{code}/history",
    tag = "exchange-rates",
    params(
        ("code" = String, Path, description = "Three letter currency code"),
        RateHistoryQuery
    ),
    responses(
        (status = 200, description = "Rates in the window", body = Vec<ExchangeRate>),
        (status = 400, description = "Invalid code or window")
    )
)]
async fn rate_history() {}

/// Convert an amount between two currencies
#[utoipa::path(
    get,
    path = "/api/currencies/convert",
    tag = "conversion",
    params(ConversionQuery),
    responses(
        (status = 200, description = "Converted amount", body = ConversionResponse),
        (status = 400, description = "Invalid currency code"),
        (status = 422, description = "Rate unavailable for one or both currencies")
    )
)]
async fn convert() {}

/// OpenAPI documentation for the Currency API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Currency Rates Service API",
        version = "1.0.0",
        description = "Currency metadata, exchange rates refreshed from Open Exchange Rates, and currency conversion.\n\nRates are expressed against USD. Conversions divide by the source rate (6 digits, half-up) and multiply by the target rate (2 digits, half-up).",
        license(name = "MIT"),
    ),
    paths(
        health,
        list_currencies,
        create_currency,
        get_currency,
        update_currency,
        sync_catalog,
        list_rates,
        record_rate,
        refresh_rates,
        latest_rate,
        rate_history,
        convert,
    ),
    components(
        schemas(
            Currency,
            CurrencyId,
            ExchangeRate,
            RateId,
            CreateCurrencyRequest,
            UpdateCurrencyRequest,
            RecordRateRequest,
            ConversionResponse,
            RefreshReport,
            CatalogSyncReport,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "currencies", description = "Currency catalog"),
        (name = "exchange-rates", description = "Rate history, latest rates and refresh"),
        (name = "conversion", description = "Currency conversion"),
    )
)]
pub struct ApiDoc;
