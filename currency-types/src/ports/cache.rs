//! Rate cache port.

use std::collections::HashMap;

use crate::domain::{CurrencyCode, ExchangeRate};

/// Process-local cache of the most recently seen rate per currency.
///
/// Implementations synchronise internally; callers never lock.
pub trait RateCache: Send + Sync {
    fn get(&self, code: &CurrencyCode) -> Option<ExchangeRate>;

    /// Stores `rate` under its currency code.
    fn put(&self, rate: ExchangeRate);

    /// Snapshot of every entry.
    fn get_all(&self) -> HashMap<CurrencyCode, ExchangeRate>;

    fn clear(&self);
}
