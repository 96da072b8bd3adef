//! Shared database types with feature-gated fields for SQLite and PostgreSQL.

use sqlx::FromRow;

use currency_types::{Currency, CurrencyCode, CurrencyId, ExchangeRate, RateId, RepoError};

// ─────────────────────────────────────────────────────────────────────────────
// Feature-gated imports
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(feature = "postgres")]
use chrono::{DateTime, NaiveDateTime, Utc};
#[cfg(feature = "postgres")]
use rust_decimal::Decimal;
#[cfg(feature = "postgres")]
use uuid::Uuid;

/// Snapshot timestamps are stored as fixed-width text in SQLite so that
/// lexical order matches chronological order.
#[cfg(not(feature = "postgres"))]
pub const SQLITE_SNAPSHOT_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

// ─────────────────────────────────────────────────────────────────────────────
// Database row structs
// ─────────────────────────────────────────────────────────────────────────────

/// Currency row from database.
#[derive(FromRow)]
pub struct DbCurrency {
    #[cfg(feature = "postgres")]
    pub id: Uuid,
    #[cfg(not(feature = "postgres"))]
    pub id: String,

    pub code: String,
    pub name: String,
    pub base: String,

    #[cfg(feature = "postgres")]
    pub created_at: DateTime<Utc>,
    #[cfg(not(feature = "postgres"))]
    pub created_at: String,
}

/// Exchange rate row from database.
#[derive(FromRow)]
pub struct DbExchangeRate {
    #[cfg(feature = "postgres")]
    pub id: Uuid,
    #[cfg(not(feature = "postgres"))]
    pub id: String,

    pub currency_code: String,

    #[cfg(feature = "postgres")]
    pub rate: Decimal,
    #[cfg(not(feature = "postgres"))]
    pub rate: String,

    pub base: String,

    #[cfg(feature = "postgres")]
    pub snapshot_at: NaiveDateTime,
    #[cfg(not(feature = "postgres"))]
    pub snapshot_at: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Parsing helpers
// ─────────────────────────────────────────────────────────────────────────────

fn parse_code(s: &str) -> Result<CurrencyCode, RepoError> {
    CurrencyCode::parse(s).map_err(|e| RepoError::Database(e.to_string()))
}

#[cfg(not(feature = "postgres"))]
fn parse_uuid(s: &str) -> Result<uuid::Uuid, RepoError> {
    uuid::Uuid::parse_str(s).map_err(|e| RepoError::Database(e.to_string()))
}

#[cfg(not(feature = "postgres"))]
pub fn format_snapshot(ts: &chrono::NaiveDateTime) -> String {
    ts.format(SQLITE_SNAPSHOT_FORMAT).to_string()
}

/// Maps an insert failure, turning unique violations into `Conflict`.
pub fn map_insert_error(err: sqlx::Error, code: &CurrencyCode) -> RepoError {
    match err.as_database_error() {
        Some(db) if db.is_unique_violation() => {
            RepoError::Conflict(format!("Currency with code {} already exists", code))
        }
        _ => RepoError::Database(err.to_string()),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Domain conversion (feature-gated implementations)
// ─────────────────────────────────────────────────────────────────────────────

impl DbCurrency {
    /// Convert database row to domain Currency.
    pub fn into_domain(self) -> Result<Currency, RepoError> {
        let code = parse_code(&self.code)?;
        let base = parse_code(&self.base)?;

        #[cfg(feature = "postgres")]
        let (id, created_at) = (CurrencyId::from_uuid(self.id), self.created_at);

        #[cfg(not(feature = "postgres"))]
        let (id, created_at) = {
            let uuid = parse_uuid(&self.id)?;
            let dt = chrono::DateTime::parse_from_rfc3339(&self.created_at)
                .map_err(|e| RepoError::Database(e.to_string()))?
                .with_timezone(&chrono::Utc);
            (CurrencyId::from_uuid(uuid), dt)
        };

        Ok(Currency::from_parts(id, code, self.name, base, created_at))
    }
}

impl DbExchangeRate {
    /// Convert database row to domain ExchangeRate.
    pub fn into_domain(self) -> Result<ExchangeRate, RepoError> {
        let code = parse_code(&self.currency_code)?;
        let base = parse_code(&self.base)?;

        #[cfg(feature = "postgres")]
        let (id, rate, timestamp) = (RateId::from_uuid(self.id), self.rate, self.snapshot_at);

        #[cfg(not(feature = "postgres"))]
        let (id, rate, timestamp) = {
            use std::str::FromStr;

            let uuid = parse_uuid(&self.id)?;
            let rate = rust_decimal::Decimal::from_str(&self.rate)
                .map_err(|e| RepoError::Database(e.to_string()))?;
            let ts = chrono::NaiveDateTime::parse_from_str(&self.snapshot_at, SQLITE_SNAPSHOT_FORMAT)
                .map_err(|e| RepoError::Database(e.to_string()))?;
            (RateId::from_uuid(uuid), rate, ts)
        };

        Ok(ExchangeRate::from_parts(id, code, rate, base, timestamp))
    }
}
