//! The periodic optimization loop: measure, search, gate, roll out

use super::history::{OptimizationHistory, SampleLog};
use super::optimizer::{MultiAlgorithmOptimizer, OptimizerError};
use super::rollout::{Rollout, RolloutError};
use super::scoring::realized_score;
use super::validation::{Rejection, ValidationGate};
use crate::analytics::PerformanceTracker;
use crate::config::OptimizerConfig;
use crate::core::CycleSchedule;
use crate::error::StoreError;
use crate::metrics::Metrics;
use crate::models::{LiveParameters, OptimizationHistoryEntry, PerformanceSample};
use crate::services::{Notifier, ParameterStore, RetryPolicy};
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{watch, Mutex};
use tracing::{debug, error, info, warn};

const SAMPLE_LOG_CAPACITY: usize = 5_000;

#[derive(Debug, Error)]
pub enum CycleError {
    #[error(transparent)]
    Optimizer(#[from] OptimizerError),

    #[error(transparent)]
    Rollout(#[from] RolloutError),
}

/// Result of one completed cycle
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// Another cycle was still running
    Busy,
    InsufficientTrades { have: usize, need: usize },
    Rejected(Rejection),
    RolledOut(OptimizationHistoryEntry),
}

impl CycleOutcome {
    fn label(&self) -> &'static str {
        match self {
            CycleOutcome::Busy => "busy",
            CycleOutcome::InsufficientTrades { .. } => "skipped",
            CycleOutcome::Rejected(_) => "rejected",
            CycleOutcome::RolledOut(_) => "rolled_out",
        }
    }
}

pub struct OptimizationService {
    optimizer: MultiAlgorithmOptimizer,
    gate: ValidationGate,
    rollout: Rollout,
    tracker: Arc<PerformanceTracker>,
    samples: SampleLog,
    metrics: Arc<Metrics>,
    config: OptimizerConfig,
    cycle_lock: Mutex<()>,
    cancel: Arc<AtomicBool>,
}

impl OptimizationService {
    /// Load the durable parameter set and compute the starting baseline.
    ///
    /// A stored set that fails validation is repaired; if it still fails, the
    /// defaults are used. A store that cannot be read is fatal.
    pub async fn bootstrap(
        optimizer: MultiAlgorithmOptimizer,
        gate: ValidationGate,
        store: Arc<dyn ParameterStore>,
        notifier: Arc<dyn Notifier>,
        tracker: Arc<PerformanceTracker>,
        metrics: Arc<Metrics>,
        config: OptimizerConfig,
    ) -> Result<Self, StoreError> {
        let policy = RetryPolicy::new(config.store_retries, config.store_backoff());
        let loaded = {
            let store = &store;
            policy.run("load_parameters", move || store.load()).await?
        };

        let space = optimizer.space();
        let parameters = match loaded {
            Some(stored) => {
                let repaired = space.repair(&stored);
                match gate.check_parameters(&repaired) {
                    Ok(()) => {
                        info!(parameters = repaired.len(), "Loaded stored parameters");
                        repaired
                    }
                    Err(rejection) => {
                        warn!(
                            reason = %rejection,
                            "Stored parameters invalid, falling back to defaults"
                        );
                        space.defaults()
                    }
                }
            }
            None => {
                info!("No stored parameters, starting from defaults");
                space.defaults()
            }
        };

        let score = optimizer
            .scorer()
            .score(&parameters, &tracker.snapshot(Utc::now()).await);
        info!(score, "Initial parameter score");

        let rollout = Rollout::new(
            LiveParameters {
                parameters,
                score,
                revision: 0,
            },
            store,
            notifier,
            Arc::new(OptimizationHistory::new()),
            Arc::clone(&metrics),
            policy,
        );

        Ok(Self {
            optimizer,
            gate,
            rollout,
            tracker,
            samples: SampleLog::new(SAMPLE_LOG_CAPACITY),
            metrics,
            config,
            cycle_lock: Mutex::new(()),
            cancel: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<LiveParameters>> {
        self.rollout.subscribe()
    }

    pub fn current(&self) -> Arc<LiveParameters> {
        self.rollout.current()
    }

    pub fn history(&self) -> Arc<OptimizationHistory> {
        Arc::clone(self.rollout.history())
    }

    pub async fn sample_count(&self) -> usize {
        self.samples.len().await
    }

    /// Abort any search in progress and refuse to start new ones
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    /// One optimization cycle. Overlapping calls return [`CycleOutcome::Busy`].
    pub async fn run_cycle(&self) -> Result<CycleOutcome, CycleError> {
        let result = match self.cycle_lock.try_lock() {
            Ok(_guard) => self.cycle().await,
            Err(_) => Ok(CycleOutcome::Busy),
        };

        let label = match &result {
            Ok(outcome) => outcome.label(),
            Err(CycleError::Optimizer(OptimizerError::Cancelled)) => "cancelled",
            Err(_) => "failed",
        };
        self.metrics
            .optimization_cycles_total
            .with_label_values(&[label])
            .inc();
        result
    }

    async fn cycle(&self) -> Result<CycleOutcome, CycleError> {
        if self.cancel.load(Ordering::Relaxed) {
            return Err(OptimizerError::Cancelled.into());
        }
        let now = Utc::now();
        let current = self.current();

        let window = chrono::Duration::seconds(self.config.optimization_interval_seconds as i64);
        let recent = self.tracker.window(now, window).await;
        if recent.total_trades > 0 {
            self.samples
                .record(PerformanceSample {
                    parameters: current.parameters.clone(),
                    realized_score: realized_score(&recent),
                    observed_at: now,
                })
                .await;
        }

        let have = self.tracker.trade_count().await;
        let need = self.config.min_trades_for_optimization;
        if have < need {
            info!(have, need, "Not enough trades for optimization yet");
            return Ok(CycleOutcome::InsufficientTrades { have, need });
        }

        let samples = self.samples.samples().await;
        if samples.len() >= self.config.min_surrogate_samples {
            if let Err(err) = self.optimizer.retrain_surrogate(&samples).await {
                warn!(error = %err, "Surrogate retraining failed, keeping previous model");
            }
        } else {
            debug!(
                samples = samples.len(),
                needed = self.config.min_surrogate_samples,
                "Too few samples for a surrogate"
            );
        }

        let metrics = self.tracker.snapshot(now).await;
        // both sides of the gate are scored under this snapshot
        let baseline = self.optimizer.scorer().score(&current.parameters, &metrics);
        info!(
            trades = metrics.total_trades,
            baseline,
            rolled_out_score = current.score,
            "Starting optimization cycle"
        );
        let candidate = self
            .optimizer
            .optimize(&current.parameters, &metrics, Arc::clone(&self.cancel))
            .await?;

        if let Err(rejection) = self.gate.admit(&candidate, baseline) {
            self.metrics
                .optimization_rejections_total
                .with_label_values(&[rejection.reason()])
                .inc();
            return Ok(CycleOutcome::Rejected(rejection));
        }

        let entry = self.rollout.apply(&candidate, baseline).await?;
        Ok(CycleOutcome::RolledOut(entry))
    }

    /// Wait before the next cycle: the short retry backoff after a failure,
    /// else the next schedule slot.
    pub fn next_delay(
        &self,
        last: &Result<CycleOutcome, CycleError>,
        schedule: &CycleSchedule,
    ) -> Duration {
        match last {
            Err(_) => self.config.retry_backoff(),
            Ok(_) => schedule.delay_from(Utc::now()),
        }
    }

    /// Run cycles on `schedule` until `shutdown` flips to true.
    pub async fn run(
        self: Arc<Self>,
        schedule: CycleSchedule,
        mut shutdown: watch::Receiver<bool>,
    ) {
        info!(schedule = %schedule.expression(), "Optimization service started");
        let mut delay = schedule.delay_from(Utc::now());

        loop {
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = shutdown_requested(&mut shutdown) => break,
            }

            let cycle = self.run_cycle();
            tokio::pin!(cycle);
            let result = tokio::select! {
                result = &mut cycle => result,
                _ = shutdown_requested(&mut shutdown) => {
                    self.cancel();
                    cycle.await
                }
            };

            match &result {
                Ok(CycleOutcome::RolledOut(entry)) => {
                    info!(
                        score = entry.score,
                        method = %entry.method,
                        "Cycle rolled out new parameters"
                    )
                }
                Ok(CycleOutcome::Rejected(rejection)) => {
                    info!(reason = %rejection, "Cycle candidate rejected")
                }
                Ok(_) => {}
                Err(CycleError::Optimizer(OptimizerError::Cancelled)) => break,
                Err(err) => error!(error = %err, "Optimization cycle failed"),
            }

            if self.cancel.load(Ordering::Relaxed) {
                break;
            }
            delay = self.next_delay(&result, &schedule);
            debug!(delay_s = delay.as_secs(), "Next optimization cycle scheduled");
        }

        info!("Optimization service stopped");
    }
}

/// Resolves once the flag is true or its sender is gone
async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow() {
            return;
        }
        if shutdown.changed().await.is_err() {
            return;
        }
    }
}
