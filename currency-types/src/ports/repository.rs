//! Repository port traits.
//!
//! Adapters (Postgres, SQLite) implement both traits on one type.

use chrono::NaiveDateTime;

use crate::domain::{Currency, CurrencyCode, ExchangeRate};
use crate::error::RepoError;

/// Catalog of known currencies.
#[async_trait::async_trait]
pub trait CurrencyRepository: Send + Sync + 'static {
    /// Lists every currency in the catalog.
    async fn list_currencies(&self) -> Result<Vec<Currency>, RepoError>;

    /// Gets a currency by code.
    async fn find_currency(&self, code: &CurrencyCode) -> Result<Option<Currency>, RepoError>;

    /// Checks whether a code is already in the catalog.
    async fn currency_exists(&self, code: &CurrencyCode) -> Result<bool, RepoError>;

    /// Inserts a new currency. Fails with `RepoError::Conflict` if the code exists.
    async fn insert_currency(&self, currency: Currency) -> Result<Currency, RepoError>;

    /// Updates name and base of an existing currency. Fails with `RepoError::NotFound`.
    async fn update_currency(&self, currency: Currency) -> Result<Currency, RepoError>;
}

/// Durable, append-only store of timestamped rate records.
#[async_trait::async_trait]
pub trait RateStore: Send + Sync + 'static {
    /// Every stored rate, in no particular order.
    async fn find_all_rates(&self) -> Result<Vec<ExchangeRate>, RepoError>;

    /// Appends one rate row and returns it as stored.
    async fn append_rate(&self, rate: ExchangeRate) -> Result<ExchangeRate, RepoError>;

    /// The row with the maximum timestamp for `code`.
    async fn find_latest_rate(&self, code: &CurrencyCode)
    -> Result<Option<ExchangeRate>, RepoError>;

    /// Rows for `code` with `start <= timestamp <= end`, newest first.
    async fn find_rates_between(
        &self,
        code: &CurrencyCode,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<ExchangeRate>, RepoError>;
}
