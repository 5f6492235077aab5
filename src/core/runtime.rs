//! Process wiring: builds every component from [`Config`] and runs the
//! tick loop, the optimization service and the HTTP server side by side.

use crate::analytics::{PerformanceTracker, DEFAULT_RETENTION_DAYS};
use crate::config::Config;
use crate::core::http::{start_server, AppState, HealthStatus};
use crate::core::scheduler::CycleSchedule;
use crate::engines::{default_strategies, Orchestrator};
use crate::error::{ConfigError, OrchestratorError, SinkError, StoreError};
use crate::metrics::Metrics;
use crate::optimization::{
    MultiAlgorithmOptimizer, OptimizationService, Scorer, SearchSpace, ValidationGate,
};
use crate::services::{
    HttpBackend, JsonFileParameterStore, LogNotifier, RecordingSink, SignalSink,
    SimulatedMarketData, StatusSink,
};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::sync::{watch, RwLock};
use tracing::{error, info, warn};

/// Start price of the simulated feed
const SIMULATED_START_PRICE: f64 = 0.000_125;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("parameter store unavailable: {0}")]
    Store(#[from] StoreError),

    #[error("backend client: {0}")]
    Sink(#[from] SinkError),

    #[error(transparent)]
    Orchestrator(#[from] OrchestratorError),

    #[error("metrics registry: {0}")]
    Metrics(#[from] prometheus::Error),
}

pub struct HydraRuntime {
    config: Config,
    metrics: Arc<Metrics>,
    orchestrator: Arc<Orchestrator>,
    service: Arc<OptimizationService>,
    schedule: CycleSchedule,
    start_time: Instant,
}

impl HydraRuntime {
    pub async fn build(config: Config) -> Result<Self, RuntimeError> {
        let metrics = Arc::new(Metrics::new()?);
        let retention = chrono::Duration::days(DEFAULT_RETENTION_DAYS).max(
            chrono::Duration::seconds(config.optimizer.optimization_interval_seconds as i64),
        );
        let tracker = Arc::new(PerformanceTracker::with_retention(retention));
        let schedule =
            CycleSchedule::from_interval(config.optimizer.optimization_interval_seconds)?;

        let space = Arc::new(SearchSpace::default());
        let optimizer = MultiAlgorithmOptimizer::new(
            Arc::clone(&space),
            Scorer::new(config.weights),
            config.optimizer.clone(),
        );
        let gate = ValidationGate::new(space.as_ref().clone(), config.gate);
        let store = Arc::new(JsonFileParameterStore::new(&config.endpoints.parameter_file));

        let service = OptimizationService::bootstrap(
            optimizer,
            gate,
            store,
            Arc::new(LogNotifier),
            Arc::clone(&tracker),
            Arc::clone(&metrics),
            config.optimizer.clone(),
        )
        .await?;

        let (signals, status): (Arc<dyn SignalSink>, Arc<dyn StatusSink>) =
            match &config.endpoints.backend_url {
                Some(url) => {
                    let backend = Arc::new(HttpBackend::new(url.clone())?);
                    info!(backend = %url, "Publishing to backend");
                    (backend.clone() as Arc<dyn SignalSink>, backend as Arc<dyn StatusSink>)
                }
                None => {
                    warn!("No BACKEND_URL configured, signals are only recorded locally");
                    let recorder = Arc::new(RecordingSink::new());
                    (recorder.clone() as Arc<dyn SignalSink>, recorder as Arc<dyn StatusSink>)
                }
            };

        let market = Arc::new(SimulatedMarketData::new(
            config.endpoints.market_symbol.clone(),
            SIMULATED_START_PRICE,
            config.optimizer.seed,
        ));

        let orchestrator = Arc::new(Orchestrator::new(
            config.orchestrator.clone(),
            market,
            signals,
            status,
            tracker,
            service.subscribe(),
            Arc::clone(&metrics),
        ));
        for strategy in default_strategies() {
            orchestrator.register(strategy).await?;
        }

        Ok(Self {
            config,
            metrics,
            orchestrator,
            service: Arc::new(service),
            schedule,
            start_time: Instant::now(),
        })
    }

    pub fn orchestrator(&self) -> &Arc<Orchestrator> {
        &self.orchestrator
    }

    pub fn service(&self) -> &Arc<OptimizationService> {
        &self.service
    }

    pub fn app_state(&self) -> AppState {
        AppState {
            health: Arc::new(RwLock::new(HealthStatus::default())),
            metrics: Arc::clone(&self.metrics),
            start_time: Arc::new(self.start_time),
            orchestrator: Arc::clone(&self.orchestrator),
            live: self.service.subscribe(),
            history: self.service.history(),
        }
    }

    /// Start every engine and run until `shutdown` flips to true.
    pub async fn run(self, shutdown: watch::Receiver<bool>) {
        self.orchestrator.start_all().await;

        let state = self.app_state();
        let port = self.config.endpoints.http_port;
        let server_shutdown = shutdown.clone();
        let server = tokio::spawn(async move {
            if let Err(e) = start_server(state, port, server_shutdown).await {
                error!(error = %e, "HTTP server error");
            }
        });

        let ticks = tokio::spawn(Arc::clone(&self.orchestrator).run(shutdown.clone()));
        let cycles = tokio::spawn(Arc::clone(&self.service).run(self.schedule.clone(), shutdown));

        for (name, handle) in [("orchestrator", ticks), ("optimizer", cycles), ("http", server)] {
            if let Err(e) = handle.await {
                error!(task = name, error = %e, "Task ended abnormally");
            }
        }
        info!("Hydra runtime stopped");
    }
}
