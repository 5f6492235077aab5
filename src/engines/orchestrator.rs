//! Engine registry and the fixed-cadence polling loop

use super::{Engine, SignalStrategy};
use crate::analytics::PerformanceTracker;
use crate::config::OrchestratorConfig;
use crate::error::{EngineError, OrchestratorError};
use crate::metrics::Metrics;
use crate::models::{
    EngineState, EngineStatus, EngineStatusReport, LiveParameters, TradeOutcome, TradingSignal,
};
use crate::services::{MarketDataProvider, RetryPolicy, SignalSink, StatusSink};
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{watch, Mutex};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

/// What happened during one tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickSummary {
    pub skipped: bool,
    pub polled: usize,
    pub emitted: usize,
    pub published: usize,
    pub dropped: usize,
    pub faults: usize,
    pub reported_status: bool,
}

struct Registry {
    engines: Vec<Engine>,
    applied_revision: Option<u64>,
    tick_count: u64,
}

impl Registry {
    fn find_mut(&mut self, id: &str) -> Result<&mut Engine, OrchestratorError> {
        self.engines
            .iter_mut()
            .find(|e| e.id() == id)
            .ok_or_else(|| OrchestratorError::UnknownEngine(id.to_string()))
    }
}

pub struct Orchestrator {
    registry: Mutex<Registry>,
    market: Arc<dyn MarketDataProvider>,
    signals: Arc<dyn SignalSink>,
    status: Arc<dyn StatusSink>,
    tracker: Arc<PerformanceTracker>,
    live: watch::Receiver<Arc<LiveParameters>>,
    metrics: Arc<Metrics>,
    config: OrchestratorConfig,
}

impl Orchestrator {
    pub fn new(
        config: OrchestratorConfig,
        market: Arc<dyn MarketDataProvider>,
        signals: Arc<dyn SignalSink>,
        status: Arc<dyn StatusSink>,
        tracker: Arc<PerformanceTracker>,
        live: watch::Receiver<Arc<LiveParameters>>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            registry: Mutex::new(Registry {
                engines: Vec::new(),
                applied_revision: None,
                tick_count: 0,
            }),
            market,
            signals,
            status,
            tracker,
            live,
            metrics,
            config,
        }
    }

    /// Register a strategy under its kind's default id. Returns the id.
    pub async fn register(
        &self,
        strategy: Box<dyn SignalStrategy>,
    ) -> Result<String, OrchestratorError> {
        self.register_engine(Engine::new(strategy)).await
    }

    pub async fn register_engine(&self, engine: Engine) -> Result<String, OrchestratorError> {
        let mut registry = self.registry.lock().await;
        if registry.engines.iter().any(|e| e.id() == engine.id()) {
            return Err(OrchestratorError::DuplicateEngine(engine.id().to_string()));
        }
        let id = engine.id().to_string();
        info!(engine = %id, "Engine registered");
        registry.engines.push(engine);
        Ok(id)
    }

    pub async fn start(&self, id: &str) -> Result<(), OrchestratorError> {
        let mut registry = self.registry.lock().await;
        registry.find_mut(id)?.start()?;
        info!(engine = %id, "Engine started");
        self.update_running_gauge(&registry);
        Ok(())
    }

    pub async fn stop(&self, id: &str) -> Result<(), OrchestratorError> {
        let mut registry = self.registry.lock().await;
        registry.find_mut(id)?.stop();
        info!(engine = %id, "Engine stopped");
        self.update_running_gauge(&registry);
        Ok(())
    }

    pub async fn restart(&self, id: &str) -> Result<(), OrchestratorError> {
        let mut registry = self.registry.lock().await;
        registry.find_mut(id)?.restart();
        info!(engine = %id, "Engine restarted");
        self.update_running_gauge(&registry);
        Ok(())
    }

    pub async fn enter_maintenance(&self, id: &str) -> Result<(), OrchestratorError> {
        let mut registry = self.registry.lock().await;
        registry.find_mut(id)?.enter_maintenance()?;
        info!(engine = %id, "Engine entered maintenance");
        self.update_running_gauge(&registry);
        Ok(())
    }

    /// Start every engine that is not faulted
    pub async fn start_all(&self) {
        let mut registry = self.registry.lock().await;
        for engine in registry.engines.iter_mut() {
            if let Err(err) = engine.start() {
                warn!(engine = %engine.id(), error = %err, "Engine not started");
            }
        }
        self.update_running_gauge(&registry);
    }

    pub async fn stop_all(&self) {
        let mut registry = self.registry.lock().await;
        for engine in registry.engines.iter_mut() {
            engine.stop();
        }
        self.update_running_gauge(&registry);
    }

    pub async fn statuses(&self) -> Vec<EngineState> {
        self.registry
            .lock()
            .await
            .engines
            .iter()
            .map(Engine::state)
            .collect()
    }

    /// Fold a settled trade into the performance tracker and its engine's
    /// metrics. Duplicate trade ids are ignored by both.
    pub async fn settle_trade(&self, outcome: TradeOutcome) -> Result<(), OrchestratorError> {
        let mut registry = self.registry.lock().await;
        let engine = registry.find_mut(&outcome.engine_id)?;
        if self.tracker.record(outcome.clone()).await {
            engine.record_trade(&outcome);
        } else {
            debug!(engine = %outcome.engine_id, "Settled trade was already tracked");
        }
        Ok(())
    }

    /// One polling pass over every running engine.
    pub async fn tick(&self) -> TickSummary {
        let started = Instant::now();
        let mut summary = TickSummary::default();
        self.metrics.ticks_total.inc();

        let snapshot = match self.market.snapshot().await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!(error = %err, "Market data unavailable, skipping tick");
                self.metrics.ticks_skipped_total.inc();
                summary.skipped = true;
                return summary;
            }
        };

        let live = self.live.borrow().clone();
        let (signals, report_due) = {
            let mut registry = self.registry.lock().await;
            registry.tick_count += 1;

            if registry.applied_revision != Some(live.revision) {
                for engine in registry.engines.iter_mut() {
                    engine.apply_parameters(&live.parameters);
                }
                if registry.applied_revision.is_some() {
                    info!(revision = live.revision, "Engines picked up new parameters");
                }
                registry.applied_revision = Some(live.revision);
            }

            let mut signals: Vec<TradingSignal> = Vec::new();
            for engine in registry.engines.iter_mut().filter(|e| e.is_running()) {
                summary.polled += 1;
                match engine.generate_signal(&snapshot, &live.parameters) {
                    Ok(Some(signal)) => signals.push(signal),
                    Ok(None) => {}
                    Err(err) => {
                        summary.faults += 1;
                        let kind = match err {
                            EngineError::Transient(_) => "transient",
                            EngineError::Fault(_) => "fault",
                        };
                        self.metrics
                            .engine_faults_total
                            .with_label_values(&[engine.id(), kind])
                            .inc();
                        if engine.status() == EngineStatus::Error {
                            error!(
                                engine = %engine.id(),
                                error = %err,
                                "Engine faulted and was moved to ERROR"
                            );
                        } else {
                            warn!(engine = %engine.id(), error = %err, "Engine assessment failed");
                        }
                    }
                }
            }
            self.update_running_gauge(&registry);

            let due = registry.tick_count % self.config.status_every_ticks.max(1) == 0;
            (signals, due)
        };

        summary.emitted = signals.len();
        for signal in &signals {
            if self.publish(signal).await {
                summary.published += 1;
            } else {
                summary.dropped += 1;
            }
        }

        if report_due {
            self.report_status().await;
            summary.reported_status = true;
        }

        self.metrics
            .tick_duration_seconds
            .observe(started.elapsed().as_secs_f64());
        summary
    }

    /// Push one status report per engine; failures are logged and dropped.
    pub async fn report_status(&self) {
        let now = Utc::now();
        let reports: Vec<EngineStatusReport> = self
            .statuses()
            .await
            .iter()
            .map(|state| EngineStatusReport::from_state(state, now))
            .collect();
        let policy = self.publish_policy();
        for report in &reports {
            let sink = &self.status;
            if let Err(err) = policy.run("report_status", move || sink.report(report)).await {
                warn!(engine = %report.engine, error = %err, "Dropping engine status report");
            }
        }
    }

    /// Tick on the configured cadence until `shutdown` flips to true.
    pub async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        let mut interval = tokio::time::interval(self.config.tick_interval());
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(
            tick_ms = self.config.tick_interval_ms,
            status_every = self.config.status_every_ticks,
            "Orchestrator loop started"
        );

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let summary = self.tick().await;
                    if summary.emitted > 0 || summary.faults > 0 {
                        debug!(?summary, "Tick complete");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        self.stop_all().await;
        info!("Orchestrator loop stopped");
    }

    async fn publish(&self, signal: &TradingSignal) -> bool {
        let sink = &self.signals;
        match self
            .publish_policy()
            .run("publish_signal", move || sink.publish(signal))
            .await
        {
            Ok(()) => {
                self.metrics
                    .signals_published_total
                    .with_label_values(&[signal.engine.as_str()])
                    .inc();
                info!(
                    engine = %signal.engine,
                    side = ?signal.side,
                    symbol = %signal.symbol,
                    confidence = signal.confidence,
                    "Signal published"
                );
                true
            }
            Err(err) => {
                self.metrics
                    .signals_dropped_total
                    .with_label_values(&[signal.engine.as_str()])
                    .inc();
                warn!(engine = %signal.engine, error = %err, "Dropping signal after retries");
                false
            }
        }
    }

    fn publish_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.config.publish_retries, self.config.publish_backoff())
    }

    fn update_running_gauge(&self, registry: &Registry) {
        let running = registry.engines.iter().filter(|e| e.is_running()).count();
        self.metrics.engines_running.set(running as i64);
    }
}
