//! Outbound adapters: clients for external services.

mod open_exchange_rates;

pub use open_exchange_rates::{DEFAULT_BASE_URL, OpenExchangeRatesClient};
