//! # Currency Client SDK
//!
//! A typed Rust client for the Currency Rates API.

use chrono::NaiveDateTime;
use currency_types::{
    CatalogSyncReport, ConversionQuery, ConversionResponse, CreateCurrencyRequest, Currency,
    ExchangeRate, RateHistoryQuery, RecordRateRequest, RefreshReport, UpdateCurrencyRequest,
};
use reqwest::{Client, RequestBuilder};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;

/// Error type for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Currency Rates API client.
pub struct CurrencyClient {
    base_url: String,
    http: Client,
}

impl CurrencyClient {
    /// Creates a new client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    /// Checks if the API is healthy.
    pub async fn health(&self) -> Result<bool, ClientError> {
        let resp = self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;
        Ok(resp.status().is_success())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Currencies
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn list_currencies(&self) -> Result<Vec<Currency>, ClientError> {
        self.get("/api/currencies").await
    }

    pub async fn get_currency(&self, code: &str) -> Result<Currency, ClientError> {
        self.get(&format!("/api/currencies/{}", code)).await
    }

    /// Adds a currency to the catalog.
    pub async fn create_currency(
        &self,
        code: &str,
        name: &str,
        base: &str,
    ) -> Result<Currency, ClientError> {
        let req = CreateCurrencyRequest {
            code: code.to_string(),
            name: name.to_string(),
            base: base.to_string(),
        };
        self.post("/api/currencies", &req).await
    }

    pub async fn update_currency(
        &self,
        code: &str,
        name: &str,
        base: &str,
    ) -> Result<Currency, ClientError> {
        let req = UpdateCurrencyRequest {
            name: name.to_string(),
            base: base.to_string(),
        };
        let builder = self
            .http
            .put(format!("{}/api/currencies/{}", self.base_url, code))
            .json(&req);
        self.send(builder).await
    }

    /// Triggers a catalog sync against the provider.
    pub async fn sync_catalog(&self) -> Result<CatalogSyncReport, ClientError> {
        self.post("/api/currencies/refresh", &serde_json::json!({}))
            .await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Exchange rates
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn list_rates(&self) -> Result<Vec<ExchangeRate>, ClientError> {
        self.get("/api/currencies/exchange-rates").await
    }

    pub async fn latest_rate(&self, code: &str) -> Result<ExchangeRate, ClientError> {
        self.get(&format!("/api/currencies/exchange-rates/{}/latest", code))
            .await
    }

    /// Rates recorded for `code` between `start` and `end`, newest first.
    pub async fn rate_history(
        &self,
        code: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<ExchangeRate>, ClientError> {
        let builder = self
            .http
            .get(format!(
                "{}/api/currencies/exchange-rates/{}/history",
                self.base_url, code
            ))
            .query(&RateHistoryQuery { start, end });
        self.send(builder).await
    }

    /// Records a rate by hand. `timestamp` defaults to the server's clock.
    pub async fn record_rate(
        &self,
        code: &str,
        rate: Decimal,
        base: &str,
        timestamp: Option<NaiveDateTime>,
    ) -> Result<ExchangeRate, ClientError> {
        let req = RecordRateRequest {
            currency_code: code.to_string(),
            rate,
            base: base.to_string(),
            timestamp,
        };
        self.post("/api/currencies/exchange-rates", &req).await
    }

    /// Triggers a rate refresh against the provider.
    pub async fn refresh_rates(&self) -> Result<RefreshReport, ClientError> {
        self.post("/api/currencies/exchange-rates/refresh", &serde_json::json!({}))
            .await
    }

    /// Converts `amount` from one currency to another.
    pub async fn convert(
        &self,
        from: &str,
        to: &str,
        amount: Decimal,
    ) -> Result<ConversionResponse, ClientError> {
        let query = ConversionQuery {
            from: from.to_string(),
            to: to.to_string(),
            amount,
        };
        let builder = self
            .http
            .get(format!("{}/api/currencies/convert", self.base_url))
            .query(&query);
        self.send(builder).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let builder = self.http.get(format!("{}{}", self.base_url, path));
        self.send(builder).await
    }

    async fn post<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let builder = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .json(body);
        self.send(builder).await
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ClientError> {
        let resp = builder.send().await?;
        self.handle_response(resp).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            Ok(serde_json::from_str(&body)?)
        } else {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
                .unwrap_or(body);
            Err(ClientError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}
