//! Port traits (interfaces for adapters).
//!
//! These are the contracts that adapters must implement.
//! The application layer depends on these traits, not concrete implementations.

mod cache;
mod provider;
mod repository;

pub use cache::RateCache;
pub use provider::{CurrencyList, RateProviderClient, RatesQuery, RatesResponse};
pub use repository::{CurrencyRepository, RateStore};
