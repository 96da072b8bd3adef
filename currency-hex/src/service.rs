//! Currency Application Service
//!
//! Orchestrates the catalog, the rate store, the rate cache and the jobs
//! through their ports. Contains NO infrastructure logic.

use std::sync::Arc;

use chrono::Local;
use rust_decimal::{Decimal, RoundingStrategy};

use currency_types::{
    AppError, CatalogSyncReport, ConversionQuery, ConversionResponse, CreateCurrencyRequest,
    Currency, CurrencyCode, CurrencyRepository, DomainError, ExchangeRate, RATE_SCALE, RateCache,
    RateHistoryQuery, RateProviderClient, RateStore, RecordRateRequest, RefreshReport,
    UpdateCurrencyRequest,
};
use exchange_rates::ConversionError;

use crate::jobs::{CatalogSync, RateRefresher, RefreshConfig};
use crate::lookup;

/// Application service for currency and rate operations.
///
/// Generic over the repository and the provider; both are injected at compile time.
/// The cache is shared with the refresher as a trait object.
pub struct CurrencyService<R, P> {
    repo: Arc<R>,
    cache: Arc<dyn RateCache>,
    refresher: RateRefresher<R, P>,
    catalog_sync: CatalogSync<R, P>,
}

impl<R, P> CurrencyService<R, P>
where
    R: CurrencyRepository + RateStore,
    P: RateProviderClient,
{
    /// Creates a new service. The refresher and catalog sync share `repo`, `provider` and `cache`.
    pub fn new(
        repo: Arc<R>,
        provider: Arc<P>,
        cache: Arc<dyn RateCache>,
        config: RefreshConfig,
    ) -> Self {
        let refresher = RateRefresher::new(repo.clone(), provider.clone(), cache.clone(), config);
        let catalog_sync = CatalogSync::new(repo.clone(), provider);
        Self {
            repo,
            cache,
            refresher,
            catalog_sync,
        }
    }

    /// Returns a reference to the underlying repository.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn cache(&self) -> &Arc<dyn RateCache> {
        &self.cache
    }

    /// Rate refresh job, for the scheduler.
    pub fn refresher(&self) -> &RateRefresher<R, P> {
        &self.refresher
    }

    /// Catalog sync job, for the scheduler.
    pub fn catalog_sync(&self) -> &CatalogSync<R, P> {
        &self.catalog_sync
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Currency catalog
    // ─────────────────────────────────────────────────────────────────────────────

    /// Lists all currencies.
    pub async fn list_currencies(&self) -> Result<Vec<Currency>, AppError> {
        self.repo.list_currencies().await.map_err(Into::into)
    }

    /// Gets a currency by code.
    pub async fn get_currency(&self, code: &str) -> Result<Currency, AppError> {
        let code = CurrencyCode::parse(code)?;
        self.repo
            .find_currency(&code)
            .await?
            .ok_or_else(|| DomainError::CurrencyNotFound(code.to_string()).into())
    }

    /// Adds a currency to the catalog.
    pub async fn create_currency(&self, req: CreateCurrencyRequest) -> Result<Currency, AppError> {
        let code = CurrencyCode::parse(&req.code)?;
        let base = CurrencyCode::parse(&req.base)?;

        if self.repo.currency_exists(&code).await? {
            return Err(DomainError::DuplicateCurrency(code.to_string()).into());
        }

        let currency = Currency::new(code, req.name, base)?;
        tracing::info!(code = %currency.code, "Creating currency");
        self.repo.insert_currency(currency).await.map_err(Into::into)
    }

    /// Replaces name and base of an existing currency.
    pub async fn update_currency(
        &self,
        code: &str,
        req: UpdateCurrencyRequest,
    ) -> Result<Currency, AppError> {
        let mut currency = self.get_currency(code).await?;
        let base = CurrencyCode::parse(&req.base)?;
        currency.rename(req.name, base)?;
        self.repo.update_currency(currency).await.map_err(Into::into)
    }

    /// Runs the catalog sync now.
    pub async fn sync_catalog(&self) -> CatalogSyncReport {
        self.catalog_sync.sync().await
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Exchange rates
    // ─────────────────────────────────────────────────────────────────────────────

    /// Every stored rate row.
    pub async fn list_rates(&self) -> Result<Vec<ExchangeRate>, AppError> {
        self.repo.find_all_rates().await.map_err(Into::into)
    }

    /// Latest rate for a currency, cache first.
    pub async fn latest_rate(&self, code: &str) -> Result<ExchangeRate, AppError> {
        let code = CurrencyCode::parse(code)?;
        self.find_latest(&code)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No exchange rate for {}", code)))
    }

    /// Rates for a currency within `[start, end]`, newest first.
    pub async fn rate_history(
        &self,
        code: &str,
        query: RateHistoryQuery,
    ) -> Result<Vec<ExchangeRate>, AppError> {
        let code = CurrencyCode::parse(code)?;
        if query.start > query.end {
            return Err(AppError::BadRequest(
                "start must not be after end".to_string(),
            ));
        }

        self.repo
            .find_rates_between(&code, query.start, query.end)
            .await
            .map_err(Into::into)
    }

    /// Records a rate by hand. The stored row is also written to the cache.
    pub async fn record_rate(&self, req: RecordRateRequest) -> Result<ExchangeRate, AppError> {
        let code = CurrencyCode::parse(&req.currency_code)?;
        let base = CurrencyCode::parse(&req.base)?;

        if req.rate <= Decimal::ZERO {
            return Err(DomainError::InvalidRate(format!("{} must be positive", req.rate)).into());
        }

        let rate = req
            .rate
            .round_dp_with_strategy(RATE_SCALE, RoundingStrategy::MidpointAwayFromZero);
        let timestamp = req
            .timestamp
            .unwrap_or_else(|| Local::now().naive_local());

        let stored = self
            .repo
            .append_rate(ExchangeRate::new(code, rate, base, timestamp))
            .await?;
        self.cache.put(stored.clone());

        Ok(stored)
    }

    /// Runs a rate refresh now, with the same semantics as the scheduled run.
    pub async fn refresh_rates(&self) -> RefreshReport {
        self.refresher.refresh().await
    }

    /// Loads every stored rate into the cache. Returns the number of rows applied.
    ///
    /// Rows are applied in store order, which need not be timestamp order.
    pub async fn warm_cache(&self) -> Result<usize, AppError> {
        let rates = self.repo.find_all_rates().await?;
        let count = rates.len();
        for rate in rates {
            self.cache.put(rate);
        }
        tracing::info!(rows = count, cached = self.cache.get_all().len(), "Rate cache warmed");
        Ok(count)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Conversion
    // ─────────────────────────────────────────────────────────────────────────────

    /// Converts an amount through the USD-denominated latest rates.
    pub async fn convert(&self, query: ConversionQuery) -> Result<ConversionResponse, AppError> {
        let from = CurrencyCode::parse(&query.from)?;
        let to = CurrencyCode::parse(&query.to)?;

        let converted = if from == to {
            query.amount
        } else {
            let unavailable = || {
                DomainError::RateUnavailable(format!(
                    "Exchange rate not available for {} or {}",
                    from, to
                ))
            };

            let from_rate = self.find_latest(&from).await?.ok_or_else(unavailable)?;
            let to_rate = self.find_latest(&to).await?.ok_or_else(unavailable)?;

            exchange_rates::convert(query.amount, from_rate.rate, to_rate.rate).map_err(|e| {
                match e {
                    ConversionError::ZeroRate => AppError::from(DomainError::RateUnavailable(
                        format!("Exchange rate for {} is zero", from),
                    )),
                    ConversionError::Overflow => AppError::BadRequest(e.to_string()),
                }
            })?
        };

        Ok(ConversionResponse {
            from: from.to_string(),
            to: to.to_string(),
            amount: query.amount,
            converted,
        })
    }

    async fn find_latest(&self, code: &CurrencyCode) -> Result<Option<ExchangeRate>, AppError> {
        lookup::latest_rate(self.cache.as_ref(), self.repo.as_ref(), code)
            .await
            .map_err(Into::into)
    }
}
