//! Data Transfer Objects (DTOs) for requests and responses.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

// ─────────────────────────────────────────────────────────────────────────────
// Currency DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to add a currency to the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateCurrencyRequest {
    /// Three uppercase letters
    #[schema(example = "EUR")]
    pub code: String,
    #[schema(example = "Euro")]
    pub name: String,
    /// Base currency used when requesting rates, defaults to USD
    #[serde(default = "default_base")]
    #[schema(example = "USD")]
    pub base: String,
}

/// Request to update a currency. Code, id and creation time are immutable.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateCurrencyRequest {
    #[schema(example = "Euro")]
    pub name: String,
    #[serde(default = "default_base")]
    #[schema(example = "USD")]
    pub base: String,
}

fn default_base() -> String {
    "USD".to_string()
}

// ─────────────────────────────────────────────────────────────────────────────
// Rate DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to record a rate by hand.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecordRateRequest {
    #[schema(example = "EUR")]
    pub currency_code: String,
    #[schema(value_type = String, example = "0.85")]
    pub rate: Decimal,
    #[serde(default = "default_base")]
    #[schema(example = "USD")]
    pub base: String,
    /// Snapshot time, defaults to now
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, example = "2024-01-01T12:00:00")]
    pub timestamp: Option<NaiveDateTime>,
}

/// Time window for rate history queries (inclusive on both ends).
#[derive(Debug, Clone, Serialize, Deserialize, IntoParams)]
pub struct RateHistoryQuery {
    #[param(value_type = String, example = "2024-01-01T00:00:00")]
    pub start: NaiveDateTime,
    #[param(value_type = String, example = "2024-01-31T23:59:59")]
    pub end: NaiveDateTime,
}

// ─────────────────────────────────────────────────────────────────────────────
// Conversion DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Query parameters for a conversion.
#[derive(Debug, Clone, Serialize, Deserialize, IntoParams)]
pub struct ConversionQuery {
    #[param(example = "USD")]
    pub from: String,
    #[param(example = "EUR")]
    pub to: String,
    #[param(value_type = String, example = "100")]
    pub amount: Decimal,
}

/// Result of converting an amount between two currencies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ConversionResponse {
    #[schema(example = "USD")]
    pub from: String,
    #[schema(example = "EUR")]
    pub to: String,
    #[schema(value_type = String, example = "100")]
    pub amount: Decimal,
    #[schema(value_type = String, example = "85.00")]
    pub converted: Decimal,
}

// ─────────────────────────────────────────────────────────────────────────────
// Job reports
// ─────────────────────────────────────────────────────────────────────────────

/// Outcome of one rate refresh cycle, scheduled or manual.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RefreshReport {
    /// Currencies loaded from the catalog
    pub currencies: usize,
    /// Provider calls attempted (one per base group)
    pub groups: usize,
    /// Groups skipped because the provider call failed or returned nothing
    pub groups_skipped: usize,
    /// Rate rows written to the store and the cache
    pub rates_updated: usize,
    /// Message of the failure that aborted the cycle, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Outcome of one catalog sync run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CatalogSyncReport {
    /// Currencies listed by the provider
    pub fetched: usize,
    /// Currencies added to the catalog
    pub added: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
