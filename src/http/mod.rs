//! Request feeding, instrumented execution and bounded-concurrency scheduling.
mod engine;
mod executor;
mod feeder;
mod scheduler;
mod tls;
mod trace;
mod transport;
mod types;


use std::sync::Arc;
use std::time::Duration;

use tracing::info;

pub use engine::{EngineFactory, EngineRegistry, EngineSet, TestEngine};
pub use executor::HttpEngine;
pub use feeder::ResourceFeeder;
pub use trace::{NetworkEventListener, TimingRecorder};
pub use types::{
    AddressFamily, Durations, MeasurementResult, Parameters, PhaseDuration, RequestResult,
    RequestsProgress, Resource, ResponseHeaders, TlsInfo, Timing,
};

use crate::error::TesterError;

/// Runs a load test with the default `http`/`https` engines.
///
/// # Errors
///
/// Returns a [`TesterError`] when the run cannot start (no resources,
/// unsupported scheme, unreadable certificate or post data) or a worker
/// task panics. Per-request failures are recorded on the results instead.
pub async fn test<F>(
    parameters: Parameters,
    on_progress: F,
) -> Result<(Vec<MeasurementResult>, Duration), TesterError>
where
    F: FnMut(RequestsProgress) + Send + 'static,
{
    test_with_registry(&EngineRegistry::default(), parameters, on_progress).await
}

/// Runs a load test, resolving an engine per URL scheme from `registry`.
///
/// # Errors
///
/// See [`test`].
pub async fn test_with_registry<F>(
    registry: &EngineRegistry,
    parameters: Parameters,
    on_progress: F,
) -> Result<(Vec<MeasurementResult>, Duration), TesterError>
where
    F: FnMut(RequestsProgress) + Send + 'static,
{
    let feeder = Arc::new(ResourceFeeder::new(parameters.resources.clone()));
    if feeder.is_empty() {
        return Err(TesterError::EmptyResourceSet);
    }

    let engines = Arc::new(registry.prepare(&parameters)?);
    let (results, elapsed) = scheduler::run(&parameters, feeder, engines, on_progress).await?;

    info!("Collected {} results in {:?}", results.len(), elapsed);
    Ok((results, elapsed))
}
