//! Process-local rate cache.

use std::collections::HashMap;

use currency_types::{CurrencyCode, ExchangeRate, RateCache};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;

/// How `put` treats an existing entry for the same code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CachePolicy {
    /// Every write replaces the entry, even an older snapshot over a newer one.
    #[default]
    LastWriteWins,
    /// A write older than the cached snapshot is dropped.
    Monotonic,
}

/// Thread-safe map from currency code to its most recently written rate.
#[derive(Debug, Default)]
pub struct InMemoryRateCache {
    rates: DashMap<CurrencyCode, ExchangeRate>,
    policy: CachePolicy,
}

impl InMemoryRateCache {
    /// Creates an empty last-write-wins cache.
    pub fn new() -> Self {
        Self::with_policy(CachePolicy::LastWriteWins)
    }

    pub fn with_policy(policy: CachePolicy) -> Self {
        Self {
            rates: DashMap::new(),
            policy,
        }
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

impl RateCache for InMemoryRateCache {
    fn get(&self, code: &CurrencyCode) -> Option<ExchangeRate> {
        self.rates.get(code).map(|entry| entry.value().clone())
    }

    fn put(&self, rate: ExchangeRate) {
        match self.policy {
            CachePolicy::LastWriteWins => {
                self.rates.insert(rate.currency_code.clone(), rate);
            }
            CachePolicy::Monotonic => match self.rates.entry(rate.currency_code.clone()) {
                Entry::Occupied(mut entry) => {
                    if rate.timestamp >= entry.get().timestamp {
                        entry.insert(rate);
                    } else {
                        debug!(
                            code = %rate.currency_code,
                            incoming = %rate.timestamp,
                            cached = %entry.get().timestamp,
                            "Dropping stale cache write"
                        );
                    }
                }
                Entry::Vacant(entry) => {
                    entry.insert(rate);
                }
            },
        }
    }

    fn get_all(&self) -> HashMap<CurrencyCode, ExchangeRate> {
        self.rates
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    fn clear(&self) {
        self.rates.clear();
    }
}
