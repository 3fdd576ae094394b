use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;

use super::executor::HttpEngine;
use super::types::{MeasurementResult, Parameters, Resource};
use crate::error::TesterError;

/// Measures one request against a resource.
#[async_trait]
pub trait TestEngine: Send + Sync {
    async fn measure(&self, resource: Arc<Resource>) -> MeasurementResult;
}

/// Builds an engine once per run from the run parameters.
pub type EngineFactory =
    Arc<dyn Fn(&Parameters) -> Result<Arc<dyn TestEngine>, TesterError> + Send + Sync>;

/// Maps URL schemes to engine factories.
#[derive(Clone)]
pub struct EngineRegistry {
    factories: BTreeMap<String, EngineFactory>,
}

impl EngineRegistry {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    pub fn register(&mut self, scheme: &str, factory: EngineFactory) {
        self.factories.insert(scheme.to_ascii_lowercase(), factory);
    }

    /// Prepares one engine per scheme present in the resource list.
    ///
    /// # Errors
    ///
    /// Fails on the first unsupported scheme or engine preparation error.
    pub fn prepare(&self, parameters: &Parameters) -> Result<EngineSet, TesterError> {
        let mut engines: BTreeMap<String, Arc<dyn TestEngine>> = BTreeMap::new();
        for resource in &parameters.resources {
            let scheme = resource.scheme();
            if engines.contains_key(scheme) {
                continue;
            }
            let factory =
                self.factories
                    .get(scheme)
                    .ok_or_else(|| TesterError::UnsupportedScheme {
                        scheme: scheme.to_owned(),
                    })?;
            engines.insert(scheme.to_owned(), factory(parameters)?);
        }
        Ok(EngineSet { engines })
    }
}

impl Default for EngineRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register("http", HttpEngine::factory());
        registry.register("https", HttpEngine::factory());
        registry
    }
}

/// Engines prepared for one run, keyed by scheme.
pub struct EngineSet {
    engines: BTreeMap<String, Arc<dyn TestEngine>>,
}

impl EngineSet {
    pub(crate) fn engine_for(&self, resource: &Resource) -> Result<Arc<dyn TestEngine>, TesterError> {
        self.engines
            .get(resource.scheme())
            .cloned()
            .ok_or_else(|| TesterError::UnsupportedScheme {
                scheme: resource.scheme().to_owned(),
            })
    }
}
