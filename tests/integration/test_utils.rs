//! Shared fakes for the integration suites

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use hydra::analytics::PerformanceTracker;
use hydra::config::OrchestratorConfig;
use hydra::engines::{Orchestrator, SignalStrategy};
use hydra::error::{EngineError, SinkError, StoreError};
use hydra::metrics::Metrics;
use hydra::models::{
    EngineKind, LiveParameters, MarketSnapshot, ParameterSet, SignalIntent, SignalSide,
    TradeOutcome, TradingSignal,
};
use hydra::optimization::SearchSpace;
use hydra::services::{MarketDataProvider, ParameterStore, RecordingSink, SignalSink};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};

/// Replays queued snapshots; repeats the last one once the queue is drained.
pub struct ScriptedMarket {
    queue: Mutex<VecDeque<Result<MarketSnapshot, String>>>,
    last: Mutex<Option<MarketSnapshot>>,
}

#[allow(dead_code)]
impl ScriptedMarket {
    pub fn new(script: Vec<Result<MarketSnapshot, String>>) -> Self {
        Self {
            queue: Mutex::new(script.into()),
            last: Mutex::new(None),
        }
    }

    /// Snapshots `step_seconds` apart starting at `start`
    pub fn evenly_spaced(start: DateTime<Utc>, step_seconds: i64, count: usize) -> Self {
        Self::new(
            (0..count)
                .map(|i| Ok(snapshot_at(start + Duration::seconds(step_seconds * i as i64))))
                .collect(),
        )
    }
}

#[async_trait]
impl MarketDataProvider for ScriptedMarket {
    async fn snapshot(&self) -> Result<MarketSnapshot, SinkError> {
        let next = self.queue.lock().await.pop_front();
        match next {
            Some(Ok(snapshot)) => {
                *self.last.lock().await = Some(snapshot.clone());
                Ok(snapshot)
            }
            Some(Err(reason)) => Err(SinkError::Unavailable(reason)),
            None => self
                .last
                .lock()
                .await
                .clone()
                .ok_or_else(|| SinkError::Unavailable("script exhausted".to_string())),
        }
    }
}

pub fn snapshot_at(at: DateTime<Utc>) -> MarketSnapshot {
    MarketSnapshot::new("BOOMROACH", 1.0, 2_000_000.0, at)
}

/// Signal sink that rejects every publish and counts the attempts
#[derive(Default)]
pub struct RejectingSink {
    pub attempts: AtomicUsize,
}

#[async_trait]
impl SignalSink for RejectingSink {
    async fn publish(&self, _signal: &TradingSignal) -> Result<(), SinkError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(SinkError::Rejected {
            status: 503,
            body: "maintenance".to_string(),
        })
    }
}

/// Store that loads a fixed set and fails every save
pub struct FailingStore {
    pub stored: Option<ParameterSet>,
    pub saves: AtomicUsize,
}

#[allow(dead_code)]
impl FailingStore {
    pub fn new(stored: Option<ParameterSet>) -> Self {
        Self {
            stored,
            saves: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ParameterStore for FailingStore {
    async fn load(&self) -> Result<Option<ParameterSet>, StoreError> {
        Ok(self.stored.clone())
    }

    async fn save(&self, _parameters: &ParameterSet) -> Result<(), StoreError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::Unavailable("disk full".to_string()))
    }
}

/// Wants to buy on every snapshot
pub struct Eager {
    pub cooldown: Duration,
}

impl SignalStrategy for Eager {
    fn kind(&self) -> EngineKind {
        EngineKind::Custom
    }

    fn cooldown(&self) -> Duration {
        self.cooldown
    }

    fn assess(
        &mut self,
        _snapshot: &MarketSnapshot,
        _params: &ParameterSet,
    ) -> Result<Option<SignalIntent>, EngineError> {
        Ok(Some(SignalIntent::new(SignalSide::Buy, 0.8, "always buys")))
    }
}

/// Fails every assessment with an unrecoverable fault
pub struct Faulty;

impl SignalStrategy for Faulty {
    fn kind(&self) -> EngineKind {
        EngineKind::Custom
    }

    fn cooldown(&self) -> Duration {
        Duration::zero()
    }

    fn assess(
        &mut self,
        _snapshot: &MarketSnapshot,
        _params: &ParameterSet,
    ) -> Result<Option<SignalIntent>, EngineError> {
        Err(EngineError::Fault("division by zero in position sizing".to_string()))
    }
}

/// Orchestrator wired to in-memory collaborators
#[allow(dead_code)]
pub struct TestOrchestrator {
    pub orchestrator: Arc<Orchestrator>,
    pub sink: Arc<RecordingSink>,
    pub tracker: Arc<PerformanceTracker>,
    pub metrics: Arc<Metrics>,
    pub live: watch::Sender<Arc<LiveParameters>>,
}

#[allow(dead_code)]
impl TestOrchestrator {
    pub fn new(market: ScriptedMarket) -> Self {
        Self::with_signal_sink(market, None)
    }

    pub fn with_signal_sink(market: ScriptedMarket, signals: Option<Arc<dyn SignalSink>>) -> Self {
        let config = OrchestratorConfig {
            status_every_ticks: 2,
            publish_retries: 1,
            publish_backoff_ms: 0,
            ..OrchestratorConfig::default()
        };
        let sink = Arc::new(RecordingSink::new());
        let tracker = Arc::new(PerformanceTracker::new());
        let metrics = Arc::new(Metrics::new().expect("metrics initialization"));
        let (live, live_rx) = watch::channel(Arc::new(default_live()));
        let signals: Arc<dyn SignalSink> = match signals {
            Some(signals) => signals,
            None => sink.clone(),
        };

        let orchestrator = Arc::new(Orchestrator::new(
            config,
            Arc::new(market),
            signals,
            sink.clone(),
            tracker.clone(),
            live_rx,
            metrics.clone(),
        ));

        Self {
            orchestrator,
            sink,
            tracker,
            metrics,
            live,
        }
    }
}

pub fn default_live() -> LiveParameters {
    LiveParameters {
        parameters: SearchSpace::default().defaults(),
        score: 50.0,
        revision: 0,
    }
}

/// `count` settled trades alternating wins and losses, ending at `now`
#[allow(dead_code)]
pub fn trades(engine: &str, count: usize, now: DateTime<Utc>) -> Vec<TradeOutcome> {
    (0..count)
        .map(|i| {
            let pnl = if i % 3 == 0 { -4.0 } else { 10.0 };
            TradeOutcome::new(
                engine,
                Some(pnl),
                800.0,
                now - Duration::minutes((count - i) as i64),
            )
            .with_trade_id(format!("{engine}-{i}"))
        })
        .collect()
}
