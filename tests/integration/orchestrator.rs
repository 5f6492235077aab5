//! Integration tests for the engine orchestrator tick loop

use crate::test_utils::{
    default_live, snapshot_at, trades, Eager, Faulty, RejectingSink, ScriptedMarket,
    TestOrchestrator,
};
use chrono::{Duration, Utc};
use hydra::engines::{Engine, SignalStrategy};
use hydra::error::{EngineError, OrchestratorError};
use hydra::models::{
    EngineKind, EngineStatus, LiveParameters, MarketSnapshot, ParameterSet, SignalIntent,
};
use hydra::services::SignalSink;
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

#[tokio::test]
async fn faulty_engine_does_not_block_the_others() {
    let app = TestOrchestrator::new(ScriptedMarket::evenly_spaced(Utc::now(), 1, 4));
    app.orchestrator
        .register_engine(Engine::with_identity("faulty", "Faulty", Box::new(Faulty)))
        .await
        .unwrap();
    app.orchestrator
        .register(Box::new(Eager {
            cooldown: Duration::zero(),
        }))
        .await
        .unwrap();
    app.orchestrator.start_all().await;

    let first = app.orchestrator.tick().await;
    assert_eq!(first.polled, 2);
    assert_eq!(first.faults, 1);
    assert_eq!(first.published, 1);

    let statuses = app.orchestrator.statuses().await;
    let faulty = statuses.iter().find(|s| s.id == "faulty").unwrap();
    assert_eq!(faulty.status, EngineStatus::Error);

    let second = app.orchestrator.tick().await;
    assert_eq!(second.polled, 1);
    assert_eq!(second.faults, 0);
    assert_eq!(app.sink.signals().await.len(), 2);

    app.orchestrator.stop("faulty").await.unwrap();
    assert!(matches!(
        app.orchestrator.start("faulty").await,
        Err(OrchestratorError::InvalidTransition { .. })
    ));
    app.orchestrator.restart("faulty").await.unwrap();
    assert_eq!(app.orchestrator.tick().await.polled, 2);
}

#[tokio::test]
async fn cooldown_forwards_only_first_signal() {
    let app = TestOrchestrator::new(ScriptedMarket::evenly_spaced(Utc::now(), 10, 3));
    app.orchestrator
        .register(Box::new(Eager {
            cooldown: Duration::seconds(30),
        }))
        .await
        .unwrap();
    app.orchestrator.start_all().await;

    for _ in 0..3 {
        app.orchestrator.tick().await;
    }

    assert_eq!(app.sink.signals().await.len(), 1);
}

#[tokio::test]
async fn missing_market_data_skips_the_tick() {
    let app = TestOrchestrator::new(ScriptedMarket::new(vec![
        Err("feed down".to_string()),
        Ok(snapshot_at(Utc::now())),
    ]));
    app.orchestrator
        .register(Box::new(Eager {
            cooldown: Duration::zero(),
        }))
        .await
        .unwrap();
    app.orchestrator.start_all().await;

    let skipped = app.orchestrator.tick().await;
    assert!(skipped.skipped);
    assert_eq!(skipped.polled, 0);

    let next = app.orchestrator.tick().await;
    assert!(!next.skipped);
    assert_eq!(next.published, 1);
    assert_eq!(app.metrics.ticks_skipped_total.get(), 1);
}

#[tokio::test]
async fn signals_are_dropped_after_publish_retries() {
    let rejecting = Arc::new(RejectingSink::default());
    let app = TestOrchestrator::with_signal_sink(
        ScriptedMarket::evenly_spaced(Utc::now(), 1, 1),
        Some(rejecting.clone() as Arc<dyn SignalSink>),
    );
    app.orchestrator
        .register(Box::new(Eager {
            cooldown: Duration::zero(),
        }))
        .await
        .unwrap();
    app.orchestrator.start_all().await;

    let summary = app.orchestrator.tick().await;
    assert_eq!(summary.emitted, 1);
    assert_eq!(summary.dropped, 1);
    // one attempt plus one retry
    assert_eq!(rejecting.attempts.load(Ordering::SeqCst), 2);
    assert_eq!(
        app.metrics
            .signals_dropped_total
            .with_label_values(&["custom"])
            .get(),
        1
    );
}

#[tokio::test]
async fn status_is_reported_on_the_slow_cadence() {
    let app = TestOrchestrator::new(ScriptedMarket::evenly_spaced(Utc::now(), 1, 4));
    app.orchestrator
        .register(Box::new(Eager {
            cooldown: Duration::zero(),
        }))
        .await
        .unwrap();

    assert!(!app.orchestrator.tick().await.reported_status);
    assert!(app.orchestrator.tick().await.reported_status);

    let statuses = app.sink.statuses().await;
    assert_eq!(statuses.len(), 1);
    assert_eq!(statuses[0].engine, "custom");
    assert_eq!(statuses[0].status, EngineStatus::Stopped);
}

/// Remembers the momentum threshold it was handed on every update
struct ThresholdProbe {
    seen: Arc<Mutex<Vec<f64>>>,
}

impl SignalStrategy for ThresholdProbe {
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
        Ok(None)
    }

    fn on_parameters_updated(&mut self, params: &ParameterSet) {
        self.seen
            .lock()
            .unwrap()
            .push(params.get_or("momentum_threshold", f64::NAN));
    }
}

#[tokio::test]
async fn engines_pick_up_new_parameters_on_the_next_tick() {
    let app = TestOrchestrator::new(ScriptedMarket::evenly_spaced(Utc::now(), 1, 3));
    let seen = Arc::new(Mutex::new(Vec::new()));
    app.orchestrator
        .register(Box::new(ThresholdProbe { seen: seen.clone() }))
        .await
        .unwrap();
    app.orchestrator.start_all().await;

    app.orchestrator.tick().await;
    app.orchestrator.tick().await;

    let base = default_live();
    app.live.send_replace(Arc::new(LiveParameters {
        parameters: base.parameters.with("momentum_threshold", 0.2),
        score: 55.0,
        revision: 1,
    }));
    app.orchestrator.tick().await;

    assert_eq!(*seen.lock().unwrap(), vec![0.10, 0.2]);
}

#[tokio::test]
async fn settled_trades_reach_engine_metrics_and_tracker() {
    let app = TestOrchestrator::new(ScriptedMarket::evenly_spaced(Utc::now(), 1, 1));
    app.orchestrator
        .register(Box::new(Eager {
            cooldown: Duration::zero(),
        }))
        .await
        .unwrap();

    for outcome in trades("custom", 3, Utc::now()) {
        app.orchestrator.settle_trade(outcome).await.unwrap();
    }
    let duplicate = trades("custom", 1, Utc::now()).remove(0);
    app.orchestrator.settle_trade(duplicate).await.unwrap();

    let state = app.orchestrator.statuses().await.remove(0);
    assert_eq!(state.metrics.total_trades, 3);
    assert_eq!(app.tracker.trade_count().await, 3);

    let unknown = trades("ghost", 1, Utc::now()).remove(0);
    assert!(matches!(
        app.orchestrator.settle_trade(unknown).await,
        Err(OrchestratorError::UnknownEngine(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn run_loop_ticks_on_cadence_until_shutdown() {
    let app = TestOrchestrator::new(ScriptedMarket::evenly_spaced(Utc::now(), 1, 10));
    app.orchestrator
        .register(Box::new(Eager {
            cooldown: Duration::zero(),
        }))
        .await
        .unwrap();
    app.orchestrator.start_all().await;

    let (shutdown, shutdown_rx) = watch::channel(false);
    let running = tokio::spawn(app.orchestrator.clone().run(shutdown_rx));

    // first tick fires immediately, then once per second
    tokio::time::sleep(std::time::Duration::from_millis(2_500)).await;
    shutdown.send_replace(true);
    running.await.unwrap();

    assert_eq!(app.metrics.ticks_total.get(), 3);
    assert_eq!(app.sink.signals().await.len(), 3);
    let state = app.orchestrator.statuses().await.remove(0);
    assert_eq!(state.status, EngineStatus::Stopped);
}
