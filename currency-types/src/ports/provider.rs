//! Exchange rate provider port.
//!
//! This trait defines the interface for the upstream rate source.
//! Implementations can be HTTP clients, mock providers, etc.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::CurrencyCode;
use crate::domain::rate::local_timestamp;
use crate::error::ProviderError;

/// Provider currency list: code -> display name.
pub type CurrencyList = BTreeMap<String, String>;

/// Parameters of a latest-rates request.
///
/// `None` for `base` or `symbols` means "provider default".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RatesQuery {
    pub base: Option<CurrencyCode>,
    /// Comma-joined codes without whitespace, e.g. `USD,EUR`
    pub symbols: Option<String>,
    pub pretty_print: bool,
    pub show_alternative: bool,
}

impl RatesQuery {
    /// Query for one base group: no pretty-printing, no alternative rates.
    pub fn for_group(base: CurrencyCode, symbols: String) -> Self {
        Self {
            base: Some(base),
            symbols: Some(symbols),
            pretty_print: false,
            show_alternative: false,
        }
    }
}

/// Latest-rates payload as returned by the provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RatesResponse {
    #[serde(default)]
    pub disclaimer: Option<String>,
    #[serde(default)]
    pub license: Option<String>,
    /// Seconds since the Unix epoch
    pub timestamp: i64,
    pub base: String,
    #[serde(default)]
    pub rates: Option<BTreeMap<String, f64>>,
}

impl RatesResponse {
    /// True when the response carries no rates at all.
    pub fn is_empty(&self) -> bool {
        self.rates.as_ref().is_none_or(|r| r.is_empty())
    }

    /// The snapshot time in local wall-clock time.
    pub fn local_timestamp(&self) -> Option<NaiveDateTime> {
        local_timestamp(self.timestamp)
    }
}

/// Port trait for the rate provider.
#[async_trait::async_trait]
pub trait RateProviderClient: Send + Sync + 'static {
    /// Full list of currencies the provider knows about.
    async fn fetch_currencies(&self) -> Result<CurrencyList, ProviderError>;

    /// Latest rates for `query`, authenticated with `credential`.
    async fn fetch_rates(
        &self,
        credential: &str,
        query: &RatesQuery,
    ) -> Result<RatesResponse, ProviderError>;
}
