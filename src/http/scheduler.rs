use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::debug;

use super::engine::EngineSet;
use super::feeder::ResourceFeeder;
use super::types::{MeasurementResult, Parameters, RequestsProgress};
use crate::error::TesterError;

pub(crate) const PROGRESS_INTERVAL: Duration = Duration::from_secs(1);

/// When a run stops admitting new requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Termination {
    Count(u64),
    Deadline(Duration),
}

impl Termination {
    pub(crate) fn from_parameters(parameters: &Parameters) -> Self {
        parameters
            .time_limit()
            .map_or(Termination::Count(parameters.requests), Termination::Deadline)
    }

    pub(crate) const fn admits(self, issued: u64, elapsed: Duration) -> bool {
        match self {
            Termination::Count(total) => issued < total,
            Termination::Deadline(limit) => elapsed.as_nanos() < limit.as_nanos(),
        }
    }

    pub(crate) const fn expired(self, elapsed: Duration) -> bool {
        match self {
            Termination::Count(_) => false,
            Termination::Deadline(limit) => elapsed.as_nanos() >= limit.as_nanos(),
        }
    }
}

/// Rate-limits progress callbacks to one per interval.
#[derive(Debug)]
pub(crate) struct ProgressThrottle {
    last: Instant,
    interval: Duration,
}

impl ProgressThrottle {
    pub(crate) const fn new(started: Instant, interval: Duration) -> Self {
        Self {
            last: started,
            interval,
        }
    }

    pub(crate) fn ready(&mut self, now: Instant) -> bool {
        if now.saturating_duration_since(self.last) >= self.interval {
            self.last = now;
            true
        } else {
            false
        }
    }
}

struct Collected<F> {
    results: Vec<MeasurementResult>,
    progress: RequestsProgress,
    on_progress: F,
}

/// Single owner of the result list and counters.
async fn collect<F>(
    mut receiver: mpsc::Receiver<MeasurementResult>,
    mut progress: RequestsProgress,
    mut throttle: ProgressThrottle,
    mut on_progress: F,
) -> Collected<F>
where
    F: FnMut(RequestsProgress) + Send,
{
    let mut results = Vec::new();
    while let Some(result) = receiver.recv().await {
        progress.record(result.has_error());
        results.push(result);
        if throttle.ready(Instant::now()) {
            on_progress(progress);
        }
    }
    Collected {
        results,
        progress,
        on_progress,
    }
}

/// Runs the planned requests with at most `concurrency` in flight.
///
/// Returns every collected result and the wall-clock duration of the run.
/// Progress is reported at most once per second, plus once at the end.
pub(crate) async fn run<F>(
    parameters: &Parameters,
    feeder: Arc<ResourceFeeder>,
    engines: Arc<EngineSet>,
    on_progress: F,
) -> Result<(Vec<MeasurementResult>, Duration), TesterError>
where
    F: FnMut(RequestsProgress) + Send + 'static,
{
    let concurrency = parameters.concurrency.max(1);
    let termination = Termination::from_parameters(parameters);
    let started = Instant::now();

    let gate = Arc::new(Semaphore::new(concurrency));
    let (sender, receiver) = mpsc::channel::<MeasurementResult>(concurrency);
    let collector = tokio::spawn(collect(
        receiver,
        RequestsProgress::new(parameters.planned_total()),
        ProgressThrottle::new(started, PROGRESS_INTERVAL),
        on_progress,
    ));

    debug!(
        "Starting run: {:?}, concurrency {}, {} resources",
        termination,
        concurrency,
        feeder.len()
    );

    let mut units = JoinSet::new();
    let mut issued: u64 = 0;
    while termination.admits(issued, started.elapsed()) {
        let Ok(permit) = Arc::clone(&gate).acquire_owned().await else {
            break;
        };
        issued = issued.saturating_add(1);

        let resource = feeder.next()?;
        let engine = engines.engine_for(&resource)?;
        let sender = sender.clone();
        units.spawn(async move {
            let _permit = permit;
            if termination.expired(started.elapsed()) {
                return;
            }
            let result = engine.measure(resource).await;
            if sender.send(result).await.is_err() {
                debug!("Result collector closed before a result was delivered");
            }
        });

        while let Some(joined) = units.try_join_next() {
            joined?;
        }
    }
    drop(sender);

    while let Some(joined) = units.join_next().await {
        joined?;
    }
    let elapsed = started.elapsed();

    let Collected {
        results,
        progress,
        mut on_progress,
    } = collector.await?;
    on_progress(progress);

    debug!(
        "Run finished: {} issued, {} completed, {} failed in {:?}",
        issued, progress.completed, progress.failed, elapsed
    );
    Ok((results, elapsed))
}
