//! Scheduled exchange rate refresh.

use std::collections::{BTreeMap, HashSet};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use tracing::{error, info, warn};

use currency_types::{
    Currency, CurrencyCode, CurrencyRepository, ExchangeRate, ProviderError, RateCache,
    RateProviderClient, RateStore, RatesQuery, RatesResponse, RefreshReport,
};

use super::JobError;

/// How the refresher talks to the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RefreshMode {
    /// One call per base currency, restricted to that group's symbols.
    #[default]
    Batched,
    /// One call with provider defaults; only catalog codes are kept.
    Single,
}

impl FromStr for RefreshMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "batched" => Ok(RefreshMode::Batched),
            "single" => Ok(RefreshMode::Single),
            other => Err(format!("unknown refresh mode {other:?}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RefreshConfig {
    /// Provider credential
    pub app_id: String,
    pub mode: RefreshMode,
    /// Upper bound on one provider call; `None` waits indefinitely
    pub call_timeout: Option<Duration>,
}

impl RefreshConfig {
    pub fn new(app_id: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            mode: RefreshMode::Batched,
            call_timeout: Some(Duration::from_secs(30)),
        }
    }

    pub fn with_mode(mut self, mode: RefreshMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_call_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.call_timeout = timeout;
        self
    }
}

/// Partitions currencies by declared base.
///
/// Catalog order is preserved inside each group.
pub fn group_by_base(currencies: &[Currency]) -> BTreeMap<CurrencyCode, Vec<CurrencyCode>> {
    let mut groups: BTreeMap<CurrencyCode, Vec<CurrencyCode>> = BTreeMap::new();
    for currency in currencies {
        groups
            .entry(currency.base.clone())
            .or_default()
            .push(currency.code.clone());
    }
    groups
}

/// Provider response after validation.
struct Snapshot {
    base: CurrencyCode,
    timestamp: NaiveDateTime,
    rates: BTreeMap<String, f64>,
}

impl TryFrom<RatesResponse> for Snapshot {
    type Error = String;

    fn try_from(response: RatesResponse) -> Result<Self, Self::Error> {
        let timestamp = response
            .local_timestamp()
            .ok_or_else(|| format!("timestamp {} out of range", response.timestamp))?;
        let base = CurrencyCode::parse(&response.base).map_err(|e| e.to_string())?;
        let rates = response
            .rates
            .filter(|rates| !rates.is_empty())
            .ok_or_else(|| "no rates returned".to_string())?;

        Ok(Self {
            base,
            timestamp,
            rates,
        })
    }
}

/// Pulls rates from the provider into the store and the cache.
pub struct RateRefresher<R, P> {
    repo: Arc<R>,
    provider: Arc<P>,
    cache: Arc<dyn RateCache>,
    config: RefreshConfig,
}

impl<R, P> Clone for RateRefresher<R, P> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            provider: self.provider.clone(),
            cache: self.cache.clone(),
            config: self.config.clone(),
        }
    }
}

impl<R, P> RateRefresher<R, P>
where
    R: CurrencyRepository + RateStore,
    P: RateProviderClient,
{
    pub fn new(
        repo: Arc<R>,
        provider: Arc<P>,
        cache: Arc<dyn RateCache>,
        config: RefreshConfig,
    ) -> Self {
        Self {
            repo,
            provider,
            cache,
            config,
        }
    }

    pub fn config(&self) -> &RefreshConfig {
        &self.config
    }

    /// Runs one refresh cycle.
    ///
    /// Never fails: a group-level problem skips that group, anything else
    /// aborts the cycle and is recorded in [`RefreshReport::error`].
    pub async fn refresh(&self) -> RefreshReport {
        let mut report = RefreshReport::default();
        info!(mode = ?self.config.mode, "Starting exchange rate refresh");

        match self.try_refresh(&mut report).await {
            Ok(()) => info!(
                currencies = report.currencies,
                groups = report.groups,
                groups_skipped = report.groups_skipped,
                rates_updated = report.rates_updated,
                "Exchange rate refresh completed"
            ),
            Err(e) => {
                error!(
                    error = %e,
                    rates_updated = report.rates_updated,
                    "Exchange rate refresh aborted"
                );
                report.error = Some(e.to_string());
            }
        }

        report
    }

    async fn try_refresh(&self, report: &mut RefreshReport) -> Result<(), JobError> {
        let currencies = self.repo.list_currencies().await?;
        report.currencies = currencies.len();

        if currencies.is_empty() {
            warn!("Currency catalog is empty, nothing to refresh");
            return Ok(());
        }

        match self.config.mode {
            RefreshMode::Batched => self.refresh_batched(&currencies, report).await,
            RefreshMode::Single => self.refresh_single(&currencies, report).await,
        }
    }

    async fn refresh_batched(
        &self,
        currencies: &[Currency],
        report: &mut RefreshReport,
    ) -> Result<(), JobError> {
        let groups = group_by_base(currencies);
        report.groups = groups.len();

        for (base, codes) in groups {
            let symbols = codes
                .iter()
                .map(CurrencyCode::as_str)
                .collect::<Vec<_>>()
                .join(",");
            let query = RatesQuery::for_group(base.clone(), symbols);

            match self.fetch_snapshot(&query).await {
                Ok(snapshot) => self.store_snapshot(snapshot, None, report).await?,
                Err(reason) => {
                    warn!(%base, symbols = ?query.symbols, %reason, "Skipping base group");
                    report.groups_skipped += 1;
                }
            }
        }

        Ok(())
    }

    async fn refresh_single(
        &self,
        currencies: &[Currency],
        report: &mut RefreshReport,
    ) -> Result<(), JobError> {
        let known: HashSet<CurrencyCode> = currencies.iter().map(|c| c.code.clone()).collect();
        report.groups = 1;

        match self.fetch_snapshot(&RatesQuery::default()).await {
            Ok(snapshot) => self.store_snapshot(snapshot, Some(&known), report).await?,
            Err(reason) => {
                warn!(%reason, "Skipping single-call refresh");
                report.groups_skipped += 1;
            }
        }

        Ok(())
    }

    /// Calls the provider and validates the response.
    async fn fetch_snapshot(&self, query: &RatesQuery) -> Result<Snapshot, String> {
        let response = self.fetch(query).await.map_err(|e| e.to_string())?;
        Snapshot::try_from(response)
    }

    async fn fetch(&self, query: &RatesQuery) -> Result<RatesResponse, ProviderError> {
        let call = self.provider.fetch_rates(&self.config.app_id, query);
        match self.config.call_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| ProviderError::Timeout(limit))?,
            None => call.await,
        }
    }

    /// Appends every valid entry and pushes the stored row into the cache.
    async fn store_snapshot(
        &self,
        snapshot: Snapshot,
        only: Option<&HashSet<CurrencyCode>>,
        report: &mut RefreshReport,
    ) -> Result<(), JobError> {
        for (raw_code, value) in snapshot.rates {
            let code = match CurrencyCode::parse(&raw_code) {
                Ok(code) => code,
                Err(e) => {
                    warn!(code = %raw_code, error = %e, "Skipping rate entry");
                    continue;
                }
            };

            if only.is_some_and(|known| !known.contains(&code)) {
                continue;
            }

            let rate = match ExchangeRate::from_provider(
                code,
                value,
                snapshot.base.clone(),
                snapshot.timestamp,
            ) {
                Ok(rate) => rate,
                Err(e) => {
                    warn!(code = %raw_code, error = %e, "Skipping rate entry");
                    continue;
                }
            };

            let stored = self.repo.append_rate(rate).await?;
            self.cache.put(stored);
            report.rates_updated += 1;
        }

        Ok(())
    }
}
