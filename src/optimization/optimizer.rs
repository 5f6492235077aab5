//! Runs every search strategy concurrently and keeps the best candidate

use super::scoring::Scorer;
use super::search::{
    BayesianSearch, EvolutionarySearch, GradientSearch, SearchContext, SearchStrategy,
    StochasticSearch,
};
use super::space::SearchSpace;
use super::surrogate::{ModelError, RidgeSurrogate};
use crate::config::OptimizerConfig;
use crate::models::{
    OptimizationCandidate, ParameterSet, PerformanceMetrics, PerformanceSample,
};
use futures_util::future::join_all;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{info, warn};

const RIDGE_LAMBDA: f64 = 1.0;

#[derive(Debug, Error)]
pub enum OptimizerError {
    #[error("all {0} search strategies failed")]
    AllStrategiesFailed(usize),

    #[error("optimization was cancelled")]
    Cancelled,
}

pub struct MultiAlgorithmOptimizer {
    space: Arc<SearchSpace>,
    scorer: Scorer,
    config: OptimizerConfig,
    strategies: Vec<Arc<dyn SearchStrategy>>,
    surrogate: RwLock<Option<Arc<RidgeSurrogate>>>,
    cycles: AtomicU64,
}

impl MultiAlgorithmOptimizer {
    /// Optimizer with the four built-in strategies
    pub fn new(space: Arc<SearchSpace>, scorer: Scorer, config: OptimizerConfig) -> Self {
        Self::with_strategies(
            space,
            scorer,
            config,
            vec![
                Arc::new(BayesianSearch::default()),
                Arc::new(EvolutionarySearch::default()),
                Arc::new(GradientSearch::default()),
                Arc::new(StochasticSearch::default()),
            ],
        )
    }

    pub fn with_strategies(
        space: Arc<SearchSpace>,
        scorer: Scorer,
        config: OptimizerConfig,
        strategies: Vec<Arc<dyn SearchStrategy>>,
    ) -> Self {
        Self {
            space,
            scorer,
            config,
            strategies,
            surrogate: RwLock::new(None),
            cycles: AtomicU64::new(0),
        }
    }

    pub fn space(&self) -> &Arc<SearchSpace> {
        &self.space
    }

    pub fn scorer(&self) -> &Scorer {
        &self.scorer
    }

    pub async fn has_surrogate(&self) -> bool {
        self.surrogate.read().await.is_some()
    }

    /// Refit the surrogate on the sample log. On failure the previous model stays in place.
    pub async fn retrain_surrogate(&self, samples: &[PerformanceSample]) -> Result<(), ModelError> {
        let mut xs = Vec::with_capacity(samples.len());
        let mut ys = Vec::with_capacity(samples.len());
        for sample in samples.iter().filter(|s| s.realized_score.is_finite()) {
            let repaired = self.space.repair(&sample.parameters);
            if let Ok(unit) = self.space.to_unit_vector(&repaired) {
                xs.push(unit);
                ys.push(sample.realized_score);
            }
        }

        let model = RidgeSurrogate::fit(&xs, &ys, RIDGE_LAMBDA, self.config.min_surrogate_samples)?;
        info!(samples = xs.len(), "Surrogate model retrained");
        *self.surrogate.write().await = Some(Arc::new(model));
        Ok(())
    }

    /// One search phase: every strategy under its own budget and timeout.
    pub async fn optimize(
        &self,
        current: &ParameterSet,
        metrics: &PerformanceMetrics,
        cancel: Arc<AtomicBool>,
    ) -> Result<OptimizationCandidate, OptimizerError> {
        let cycle = self.cycles.fetch_add(1, Ordering::Relaxed);
        let seed = match self.config.seed {
            Some(seed) => seed.wrapping_add(cycle),
            None => rand::random(),
        };
        let surrogate = self.surrogate.read().await.clone();

        let runs = self.strategies.iter().map(|strategy| {
            let method = strategy.method();
            let budget = self.config.budget(method);
            let ctx = SearchContext {
                space: Arc::clone(&self.space),
                scorer: self.scorer,
                metrics: metrics.clone(),
                current: current.clone(),
                surrogate: surrogate.clone(),
                trials: budget.trials,
                deadline: Instant::now() + budget.timeout(),
                seed,
                cancel: Arc::clone(&cancel),
            };
            let strategy = Arc::clone(strategy);
            async move {
                let started = Instant::now();
                let task = tokio::task::spawn_blocking(move || strategy.search(&ctx));
                let outcome = match tokio::time::timeout(budget.timeout(), task).await {
                    Ok(Ok(Ok(candidate))) => Ok(candidate),
                    Ok(Ok(Err(err))) => Err(err.to_string()),
                    Ok(Err(join)) => Err(format!("strategy panicked: {join}")),
                    Err(_) => Err(format!("timed out after {}s", budget.timeout_seconds)),
                };
                (method, outcome, started.elapsed())
            }
        });

        let results = join_all(runs).await;
        if cancel.load(Ordering::Relaxed) {
            return Err(OptimizerError::Cancelled);
        }

        let mut candidates = Vec::with_capacity(results.len());
        for (method, outcome, elapsed) in results {
            match outcome {
                Ok(candidate) => {
                    info!(
                        method = %method,
                        score = candidate.score,
                        elapsed_ms = elapsed.as_millis() as u64,
                        "Search strategy finished"
                    );
                    candidates.push(candidate);
                }
                Err(reason) => {
                    warn!(method = %method, reason = %reason, "Search strategy failed");
                }
            }
        }

        select_best(candidates).ok_or(OptimizerError::AllStrategiesFailed(self.strategies.len()))
    }
}

/// Strictly highest finite score; equal scores go to the earlier
/// [`SearchMethod`](crate::models::SearchMethod) variant.
pub fn select_best(candidates: Vec<OptimizationCandidate>) -> Option<OptimizationCandidate> {
    candidates
        .into_iter()
        .filter(|c| c.score.is_finite())
        .fold(None, |best: Option<OptimizationCandidate>, c| match best {
            Some(b) if b.score > c.score || (b.score == c.score && b.method <= c.method) => Some(b),
            _ => Some(c),
        })
}
