//! Signal-generating engines and the orchestrator that polls them.
//!
//! A [`SignalStrategy`] only decides *whether* it wants to trade on a
//! snapshot. The [`Engine`] wrapper owns everything the strategies share:
//! lifecycle, cooldown, confidence clamping, per-engine metrics and the
//! construction of the outgoing [`TradingSignal`].

pub mod orchestrator;
pub mod strategies;

pub use orchestrator::{Orchestrator, TickSummary};
pub use strategies::{
    default_strategies, AiSignalStrategy, ArbitrageStrategy, GuardianStrategy, ReentryStrategy,
    ScalperStrategy, SniperStrategy,
};

use crate::error::{EngineError, OrchestratorError};
use crate::models::{
    EngineKind, EngineMetrics, EngineState, EngineStatus, MarketSnapshot, ParameterSet,
    SignalIntent, SignalStrength, TradeOutcome, TradingSignal,
};
use chrono::{DateTime, Duration, Utc};

pub trait SignalStrategy: Send {
    fn kind(&self) -> EngineKind;

    /// Minimum spacing between two emitted signals, on snapshot time
    fn cooldown(&self) -> Duration;

    /// Inspect one sanitized snapshot under the live parameters.
    ///
    /// Called once per tick while the engine is running, including ticks
    /// where the cooldown will suppress the result, so strategies can keep
    /// their rolling history current.
    fn assess(
        &mut self,
        snapshot: &MarketSnapshot,
        params: &ParameterSet,
    ) -> Result<Option<SignalIntent>, EngineError>;

    /// Called once whenever a new live parameter set is published.
    fn on_parameters_updated(&mut self, _params: &ParameterSet) {}
}

pub struct Engine {
    id: String,
    name: String,
    kind: EngineKind,
    status: EngineStatus,
    last_signal_at: Option<DateTime<Utc>>,
    metrics: EngineMetrics,
    strategy: Box<dyn SignalStrategy>,
}

impl Engine {
    /// Engine registered under its kind's default id and display name
    pub fn new(strategy: Box<dyn SignalStrategy>) -> Self {
        let kind = strategy.kind();
        Self::with_identity(kind.default_id(), kind.display_name(), strategy)
    }

    pub fn with_identity(
        id: impl Into<String>,
        name: impl Into<String>,
        strategy: Box<dyn SignalStrategy>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: strategy.kind(),
            status: EngineStatus::Stopped,
            last_signal_at: None,
            metrics: EngineMetrics::default(),
            strategy,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn status(&self) -> EngineStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status == EngineStatus::Running
    }

    pub fn state(&self) -> EngineState {
        EngineState {
            id: self.id.clone(),
            name: self.name.clone(),
            kind: self.kind,
            status: self.status,
            last_signal_at: self.last_signal_at,
            metrics: self.metrics.clone(),
        }
    }

    /// `Stopped`/`Maintenance` -> `Running`. Idempotent; an engine in
    /// `Error` must be restarted explicitly.
    pub fn start(&mut self) -> Result<(), OrchestratorError> {
        match self.status {
            EngineStatus::Running => Ok(()),
            EngineStatus::Stopped | EngineStatus::Maintenance => {
                self.status = EngineStatus::Running;
                Ok(())
            }
            EngineStatus::Error => Err(self.invalid(EngineStatus::Running)),
        }
    }

    /// Stop polling. A faulted engine stays in `Error` until restarted.
    pub fn stop(&mut self) {
        if self.status != EngineStatus::Error {
            self.status = EngineStatus::Stopped;
        }
    }

    /// Clear a fault and resume polling
    pub fn restart(&mut self) {
        self.status = EngineStatus::Running;
    }

    pub fn enter_maintenance(&mut self) -> Result<(), OrchestratorError> {
        if self.status == EngineStatus::Error {
            return Err(self.invalid(EngineStatus::Maintenance));
        }
        self.status = EngineStatus::Maintenance;
        Ok(())
    }

    /// Assess `snapshot` and, if the strategy wants to trade and the
    /// cooldown has elapsed, build the signal.
    ///
    /// A [`EngineError::Fault`] moves the engine to `Error`.
    pub fn generate_signal(
        &mut self,
        snapshot: &MarketSnapshot,
        params: &ParameterSet,
    ) -> Result<Option<TradingSignal>, EngineError> {
        let snapshot = snapshot.sanitized();
        let intent = match self.strategy.assess(&snapshot, params) {
            Ok(intent) => intent,
            Err(err) => {
                if matches!(err, EngineError::Fault(_)) {
                    self.status = EngineStatus::Error;
                }
                return Err(err);
            }
        };

        let Some(intent) = intent else {
            return Ok(None);
        };
        if self.in_cooldown(snapshot.timestamp) {
            return Ok(None);
        }

        self.last_signal_at = Some(snapshot.timestamp);
        Ok(Some(self.build_signal(intent, &snapshot)))
    }

    pub fn apply_parameters(&mut self, params: &ParameterSet) {
        self.strategy.on_parameters_updated(params);
    }

    pub fn record_trade(&mut self, outcome: &TradeOutcome) {
        self.metrics.record(outcome.pnl, outcome.execution_ms);
    }

    fn in_cooldown(&self, at: DateTime<Utc>) -> bool {
        self.last_signal_at
            .is_some_and(|last| at - last < self.strategy.cooldown())
    }

    fn build_signal(&self, intent: SignalIntent, snapshot: &MarketSnapshot) -> TradingSignal {
        let confidence = if intent.confidence.is_finite() {
            intent.confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let expected_return = if intent.expected_return.is_finite() {
            intent.expected_return
        } else {
            0.0
        };
        TradingSignal {
            engine: self.id.clone(),
            side: intent.side,
            symbol: snapshot.symbol.clone(),
            confidence,
            price: snapshot.price,
            reasoning: intent.reasoning,
            timestamp: snapshot.timestamp,
            expected_return,
            strength: intent
                .strength
                .unwrap_or_else(|| SignalStrength::from_confidence(confidence)),
            timeframe: intent.timeframe.to_string(),
        }
    }

    fn invalid(&self, to: EngineStatus) -> OrchestratorError {
        OrchestratorError::InvalidTransition {
            id: self.id.clone(),
            from: self.status,
            to,
        }
    }
}
