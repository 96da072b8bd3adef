//! Read-through rate lookup: cache first, store on miss.

use currency_types::{CurrencyCode, ExchangeRate, RateCache, RateStore, RepoError};
use tracing::debug;

/// Latest rate for `code`.
///
/// A cache hit never touches the store. On a miss the store's latest row is
/// put into the cache before it is returned, so the next lookup is a hit.
pub async fn latest_rate<S>(
    cache: &dyn RateCache,
    store: &S,
    code: &CurrencyCode,
) -> Result<Option<ExchangeRate>, RepoError>
where
    S: RateStore + ?Sized,
{
    if let Some(rate) = cache.get(code) {
        debug!(%code, "Rate cache hit");
        return Ok(Some(rate));
    }

    debug!(%code, "Rate cache miss, reading store");
    let stored = store.find_latest_rate(code).await?;
    if let Some(rate) = &stored {
        cache.put(rate.clone());
    }
    Ok(stored)
}
