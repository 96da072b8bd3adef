//! Scheduled currency catalog sync.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use currency_types::{
    CatalogSyncReport, Currency, CurrencyCode, CurrencyRepository, RateProviderClient, RepoError,
};

use super::JobError;

/// Adds provider currencies missing from the catalog. Existing entries are never touched.
pub struct CatalogSync<R, P> {
    repo: Arc<R>,
    provider: Arc<P>,
}

impl<R, P> Clone for CatalogSync<R, P> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            provider: self.provider.clone(),
        }
    }
}

impl<R, P> CatalogSync<R, P>
where
    R: CurrencyRepository,
    P: RateProviderClient,
{
    pub fn new(repo: Arc<R>, provider: Arc<P>) -> Self {
        Self { repo, provider }
    }

    /// Runs one sync. Failures are logged and recorded in the report.
    pub async fn sync(&self) -> CatalogSyncReport {
        let mut report = CatalogSyncReport::default();
        info!("Starting currency catalog sync");

        match self.try_sync(&mut report).await {
            Ok(()) => info!(
                fetched = report.fetched,
                added = report.added,
                "Currency catalog sync completed"
            ),
            Err(e) => {
                error!(error = %e, added = report.added, "Currency catalog sync failed");
                report.error = Some(e.to_string());
            }
        }

        report
    }

    async fn try_sync(&self, report: &mut CatalogSyncReport) -> Result<(), JobError> {
        let listed = self.provider.fetch_currencies().await?;
        report.fetched = listed.len();

        for (raw_code, name) in listed {
            let code = match CurrencyCode::parse(&raw_code) {
                Ok(code) => code,
                Err(e) => {
                    warn!(code = %raw_code, error = %e, "Skipping provider currency");
                    continue;
                }
            };

            if self.repo.currency_exists(&code).await? {
                continue;
            }

            let currency = match Currency::new(code, name, CurrencyCode::usd()) {
                Ok(currency) => currency,
                Err(e) => {
                    warn!(code = %raw_code, error = %e, "Skipping provider currency");
                    continue;
                }
            };

            match self.repo.insert_currency(currency).await {
                Ok(_) => report.added += 1,
                Err(RepoError::Conflict(_)) => {
                    debug!(code = %raw_code, "Currency added concurrently");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok(())
    }
}
