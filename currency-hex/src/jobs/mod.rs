//! Background jobs: rate refresh, catalog sync and the scheduler that drives them.

mod catalog_sync;
mod refresher;
mod scheduler;

pub use catalog_sync::CatalogSync;
pub use refresher::{RateRefresher, RefreshConfig, RefreshMode, group_by_base};
pub use scheduler::{ScheduledJob, Scheduler, SchedulerHandle};

use currency_types::{ProviderError, RepoError};

/// Failure that aborts a whole job run.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Repo(#[from] RepoError),
}
