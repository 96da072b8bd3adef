//! # Currency Hex
//!
//! Application service layer, background jobs and adapters for the currency
//! rates service.
//!
//! ## Architecture
//!
//! - `service` - Application service (orchestrates catalog, store, cache and jobs)
//! - `lookup` - Read-through latest-rate lookup (cache, then store)
//! - `jobs/` - Rate refresher, catalog sync and the scheduler driving them
//! - `inbound/` - HTTP adapter (Axum server)
//! - `outbound/` - Open Exchange Rates client
//!
//! The service is generic over `R: CurrencyRepository + RateStore` and
//! `P: RateProviderClient`, so repositories and providers can be swapped or mocked.

pub mod inbound;
pub mod jobs;
pub mod lookup;
pub mod openapi;
pub mod outbound;
pub mod service;

#[cfg(test)]
mod service_tests;

pub use jobs::{CatalogSync, RateRefresher, RefreshConfig, RefreshMode, Scheduler, SchedulerHandle};
pub use outbound::OpenExchangeRatesClient;
pub use service::CurrencyService;
