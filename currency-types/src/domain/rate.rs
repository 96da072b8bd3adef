//! Exchange rate records.

use chrono::{DateTime, Local, NaiveDateTime, SubsecRound};
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::code::CurrencyCode;
use crate::error::DomainError;

/// Number of fractional digits kept for a stored rate.
pub const RATE_SCALE: u32 = 6;

/// Unique identifier for an ExchangeRate row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct RateId(Uuid);

impl RateId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn into_uuid(self) -> Uuid {
        self.0
    }
}

impl Default for RateId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A rate snapshot for one currency.
///
/// Rows are immutable once written. `timestamp` is the provider's snapshot
/// time in local wall-clock time, not the insertion time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ExchangeRate {
    pub id: RateId,
    #[schema(value_type = String, example = "EUR")]
    pub currency_code: CurrencyCode,
    /// Units of `currency_code` per one unit of `base`
    #[schema(value_type = String, example = "0.85")]
    pub rate: Decimal,
    #[schema(value_type = String, example = "USD")]
    pub base: CurrencyCode,
    #[schema(value_type = String, example = "2024-01-01T12:00:00")]
    pub timestamp: NaiveDateTime,
}

impl ExchangeRate {
    /// Creates a new rate record with a fresh identity.
    ///
    /// The timestamp is truncated to microseconds, the precision both stores keep.
    pub fn new(
        currency_code: CurrencyCode,
        rate: Decimal,
        base: CurrencyCode,
        timestamp: NaiveDateTime,
    ) -> Self {
        Self {
            id: RateId::new(),
            currency_code,
            rate,
            base,
            timestamp: timestamp.trunc_subsecs(6),
        }
    }

    /// Builds a record from a provider float, normalised to [`RATE_SCALE`] digits.
    pub fn from_provider(
        currency_code: CurrencyCode,
        rate: f64,
        base: CurrencyCode,
        timestamp: NaiveDateTime,
    ) -> Result<Self, DomainError> {
        Ok(Self::new(currency_code, decimal_from_f64(rate)?, base, timestamp))
    }

    /// Creates a record with all fields specified (for database reconstruction).
    pub fn from_parts(
        id: RateId,
        currency_code: CurrencyCode,
        rate: Decimal,
        base: CurrencyCode,
        timestamp: NaiveDateTime,
    ) -> Self {
        Self {
            id,
            currency_code,
            rate,
            base,
            timestamp,
        }
    }
}

/// Converts a provider float into a fixed-point rate.
///
/// Goes through the shortest round-trip decimal representation of the float,
/// so `0.85_f64` becomes exactly `0.85`, then rounds half-up to [`RATE_SCALE`].
pub fn decimal_from_f64(rate: f64) -> Result<Decimal, DomainError> {
    if !rate.is_finite() {
        return Err(DomainError::InvalidRate(rate.to_string()));
    }
    let parsed = Decimal::from_str(&rate.to_string())
        .or_else(|_| Decimal::from_f64(rate).ok_or(()))
        .map_err(|_| DomainError::InvalidRate(rate.to_string()))?;
    Ok(parsed.round_dp_with_strategy(RATE_SCALE, RoundingStrategy::MidpointAwayFromZero))
}

/// Interprets provider epoch seconds in the local time zone.
pub fn local_timestamp(epoch_seconds: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp(epoch_seconds, 0).map(|utc| utc.with_timezone(&Local).naive_local())
}
