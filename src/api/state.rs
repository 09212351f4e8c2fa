use std::sync::Arc;

use crate::config::Config;
use crate::observability::Metrics;
use crate::pipeline::Orchestrator;

/// Shared application object, built once at startup
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub orchestrator: Arc<Orchestrator>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(config: Config, orchestrator: Orchestrator) -> Self {
        let metrics = orchestrator.metrics().clone();
        Self {
            config: Arc::new(config),
            orchestrator: Arc::new(orchestrator),
            metrics,
        }
    }
}
