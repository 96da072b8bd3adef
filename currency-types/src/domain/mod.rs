//! Domain models for the currency rates service.

pub mod code;
pub mod currency;
pub mod rate;

pub use code::CurrencyCode;
pub use currency::{Currency, CurrencyId, MAX_CURRENCY_NAME_LEN};
pub use rate::{ExchangeRate, RATE_SCALE, RateId};
