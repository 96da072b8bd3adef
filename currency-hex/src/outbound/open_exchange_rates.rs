//! Open Exchange Rates HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

use currency_types::{CurrencyList, ProviderError, RateProviderClient, RatesQuery, RatesResponse};

pub const DEFAULT_BASE_URL: &str = "https://openexchangerates.org/api";

/// reqwest-backed [`RateProviderClient`].
#[derive(Clone)]
pub struct OpenExchangeRatesClient {
    http: Client,
    base_url: String,
    timeout: Option<Duration>,
}

impl OpenExchangeRatesClient {
    /// Creates a client for `base_url`; `timeout` bounds every request.
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, ProviderError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| ProviderError::Http(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ProviderError> {
        let response = request.send().await.map_err(|e| {
            match (e.is_timeout(), self.timeout) {
                (true, Some(limit)) => ProviderError::Timeout(limit),
                _ => ProviderError::Http(e.to_string()),
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))
    }
}

/// Query string for `latest.json`. Absent base or symbols are left to the provider.
fn rates_params(credential: &str, query: &RatesQuery) -> Vec<(&'static str, String)> {
    let mut params = vec![("app_id", credential.to_string())];
    if let Some(base) = &query.base {
        params.push(("base", base.to_string()));
    }
    if let Some(symbols) = &query.symbols {
        params.push(("symbols", symbols.clone()));
    }
    params.push(("prettyprint", query.pretty_print.to_string()));
    params.push(("show_alternative", query.show_alternative.to_string()));
    params
}

#[async_trait]
impl RateProviderClient for OpenExchangeRatesClient {
    async fn fetch_currencies(&self) -> Result<CurrencyList, ProviderError> {
        self.get_json(self.http.get(self.url("currencies.json"))).await
    }

    #[tracing::instrument(skip(self, credential), fields(base = ?query.base, symbols = ?query.symbols))]
    async fn fetch_rates(
        &self,
        credential: &str,
        query: &RatesQuery,
    ) -> Result<RatesResponse, ProviderError> {
        let request = self
            .http
            .get(self.url("latest.json"))
            .query(&rates_params(credential, query));
        self.get_json(request).await
    }
}
