//! Fixed-period job scheduler.
//!
//! Each job gets its own tokio task driven by an interval whose first tick is
//! one period after start. Every run is spawned separately so a panicking run
//! is logged and the schedule keeps going.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::task::{AbortHandle, JoinHandle};
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{error, info, warn};

use currency_types::{CurrencyRepository, RateProviderClient, RateStore};

use super::{CatalogSync, RateRefresher};

/// A unit of periodic work. Implementations handle their own errors.
#[async_trait]
pub trait ScheduledJob: Send + Sync + 'static {
    fn name(&self) -> &'static str;

    async fn run(&self);
}

#[async_trait]
impl<R, P> ScheduledJob for RateRefresher<R, P>
where
    R: CurrencyRepository + RateStore,
    P: RateProviderClient,
{
    fn name(&self) -> &'static str {
        "rate-refresh"
    }

    async fn run(&self) {
        self.refresh().await;
    }
}

#[async_trait]
impl<R, P> ScheduledJob for CatalogSync<R, P>
where
    R: CurrencyRepository,
    P: RateProviderClient,
{
    fn name(&self) -> &'static str {
        "catalog-sync"
    }

    async fn run(&self) {
        self.sync().await;
    }
}

/// How long [`SchedulerHandle::shutdown`] waits for in-flight runs.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[derive(Default)]
pub struct Scheduler {
    jobs: Vec<(Duration, Arc<dyn ScheduledJob>)>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `job` to run every `period`.
    pub fn every(mut self, period: Duration, job: Arc<dyn ScheduledJob>) -> Self {
        self.jobs.push((period, job));
        self
    }

    /// Spawns one task per job. Must be called inside a tokio runtime.
    pub fn start(self) -> SchedulerHandle {
        let (shutdown, rx) = watch::channel(false);

        let tasks = self
            .jobs
            .into_iter()
            .filter_map(|(period, job)| {
                if period.is_zero() {
                    warn!(job = job.name(), "Ignoring job with zero period");
                    return None;
                }
                Some(tokio::spawn(run_every(period, job, rx.clone())))
            })
            .collect();

        SchedulerHandle { shutdown, tasks }
    }
}

async fn run_every(
    period: Duration,
    job: Arc<dyn ScheduledJob>,
    mut shutdown: watch::Receiver<bool>,
) {
    let name = job.name();
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    info!(job = name, period_secs = period.as_secs(), "Job scheduled");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let job = job.clone();
                let run = tokio::spawn(async move { job.run().await });
                let _cancel = CancelRunOnDrop(run.abort_handle());
                if let Err(e) = run.await {
                    error!(job = name, error = %e, "Job run panicked");
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    info!(job = name, "Job stopped");
}

/// Aborts the in-flight run when the loop driving it is aborted.
struct CancelRunOnDrop(AbortHandle);

impl Drop for CancelRunOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Running scheduler. Dropping it also stops the jobs.
pub struct SchedulerHandle {
    shutdown: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl SchedulerHandle {
    /// Number of running job tasks.
    pub fn job_count(&self) -> usize {
        self.tasks.len()
    }

    /// Signals every job to stop and waits up to [`SHUTDOWN_GRACE`] for in-flight runs.
    pub async fn shutdown(self) {
        self.shutdown_within(SHUTDOWN_GRACE).await;
    }

    /// Signals every job to stop and waits up to `grace` for in-flight runs.
    /// Jobs still running after that are aborted.
    pub async fn shutdown_within(self, grace: Duration) {
        let _ = self.shutdown.send(true);

        let aborts: Vec<AbortHandle> = self.tasks.iter().map(JoinHandle::abort_handle).collect();
        let drain = async move {
            for task in self.tasks {
                let _ = task.await;
            }
        };

        if tokio::time::timeout(grace, drain).await.is_err() {
            warn!(grace_secs = grace.as_secs(), "Jobs still running after shutdown grace, aborting");
            for handle in aborts {
                handle.abort();
            }
        }
    }
}
