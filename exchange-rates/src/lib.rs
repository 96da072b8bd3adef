//! Exchange rate cache and conversion arithmetic.
//!
//! Two pieces live here because both the refresh job and the request path use them:
//!
//! - [`InMemoryRateCache`]: the process-local [`RateCache`](currency_types::RateCache)
//!   keyed by currency code, backed by a sharded concurrent map.
//! - [`convert`]: converts an amount through USD-denominated rates with two
//!   rounding steps (6 digits for the USD intermediate, 2 digits for the result).
//!
//! # Example
//! ```
//! use exchange_rates::convert;
//! use rust_decimal::Decimal;
//!
//! // 100 USD -> EUR with USD=1 and EUR=0.85
//! let eur = convert(Decimal::from(100), Decimal::ONE, Decimal::new(85, 2)).unwrap();
//! assert_eq!(eur.to_string(), "85.00");
//! ```

mod cache;
mod conversion;

pub use cache::{CachePolicy, InMemoryRateCache};
pub use conversion::{ConversionError, INTERMEDIATE_SCALE, RESULT_SCALE, convert};
