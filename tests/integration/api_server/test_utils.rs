//! Test utilities for API server integration tests

use crate::test_utils::{default_live, Faulty, ScriptedMarket, TestOrchestrator};
use axum_test::TestServer;
use chrono::Utc;
use hydra::core::http::{create_router, AppState, HealthStatus};
use hydra::engines::{default_strategies, Engine};
use hydra::metrics::Metrics;
use hydra::models::{LiveParameters, OptimizationHistoryEntry, SearchMethod};
use hydra::optimization::OptimizationHistory;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{watch, RwLock};

/// Test helper for API server integration tests
#[allow(dead_code)]
pub struct TestApiServer {
    pub server: TestServer,
    pub metrics: Arc<Metrics>,
    pub app: TestOrchestrator,
    pub history: Arc<OptimizationHistory>,
    pub live: watch::Sender<Arc<LiveParameters>>,
}

#[allow(dead_code)]
impl TestApiServer {
    /// Router over the six built-in engines plus one that always faults
    pub async fn new() -> Self {
        let app = TestOrchestrator::new(ScriptedMarket::evenly_spaced(Utc::now(), 1, 4));
        for strategy in default_strategies() {
            app.orchestrator.register(strategy).await.expect("register engine");
        }
        app.orchestrator
            .register_engine(Engine::with_identity("faulty", "Faulty", Box::new(Faulty)))
            .await
            .expect("register faulty engine");

        let metrics = Arc::new(Metrics::new().expect("metrics initialization"));
        let history = Arc::new(OptimizationHistory::new());
        let (live, live_rx) = watch::channel(Arc::new(default_live()));
        let state = AppState {
            health: Arc::new(RwLock::new(HealthStatus::default())),
            metrics: metrics.clone(),
            start_time: Arc::new(Instant::now()),
            orchestrator: app.orchestrator.clone(),
            live: live_rx,
            history: history.clone(),
        };

        let router = create_router(state);
        let server = TestServer::new(router).expect("start test server");

        Self {
            server,
            metrics,
            app,
            history,
            live,
        }
    }

    pub async fn record_rollout(&self, score: f64, previous_score: f64) {
        let base = default_live();
        self.history
            .append(OptimizationHistoryEntry {
                timestamp: Utc::now(),
                parameters: base.parameters.clone(),
                score,
                previous_score,
                method: SearchMethod::Bayesian,
            })
            .await;
        self.live.send_replace(Arc::new(LiveParameters {
            parameters: base.parameters,
            score,
            revision: 1,
        }));
    }
}
