//! Engine lifecycle state and per-engine rolling metrics

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EngineStatus {
    Stopped,
    Running,
    Error,
    Maintenance,
}

impl fmt::Display for EngineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EngineStatus::Stopped => "STOPPED",
            EngineStatus::Running => "RUNNING",
            EngineStatus::Error => "ERROR",
            EngineStatus::Maintenance => "MAINTENANCE",
        };
        f.write_str(label)
    }
}

/// Strategy variant backing an engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EngineKind {
    Sniper,
    Reentry,
    AiSignal,
    Guardian,
    Scalper,
    Arbitrage,
    /// Strategies supplied by the embedding application.
    Custom,
}

impl EngineKind {
    pub fn default_id(&self) -> &'static str {
        match self {
            EngineKind::Sniper => "sniper",
            EngineKind::Reentry => "reentry",
            EngineKind::AiSignal => "ai-signals",
            EngineKind::Guardian => "guardian",
            EngineKind::Scalper => "scalper",
            EngineKind::Arbitrage => "arbitrage",
            EngineKind::Custom => "custom",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            EngineKind::Sniper => "Sniper Engine",
            EngineKind::Reentry => "Re-entry Engine",
            EngineKind::AiSignal => "AI Signals Engine",
            EngineKind::Guardian => "Guardian Engine",
            EngineKind::Scalper => "Scalper Engine",
            EngineKind::Arbitrage => "Arbitrage Engine",
            EngineKind::Custom => "Custom Engine",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineMetrics {
    pub total_trades: u64,
    pub successful_trades: u64,
    pub total_pnl: f64,
    pub win_rate: f64,
    pub avg_execution_ms: f64,
}

impl EngineMetrics {
    /// Fold one settled trade into the running aggregates.
    ///
    /// A missing PnL counts as a trade but never as a success.
    pub fn record(&mut self, pnl: Option<f64>, execution_ms: f64) {
        let pnl = pnl.filter(|p| p.is_finite());
        self.total_trades += 1;
        if pnl.is_some_and(|p| p > 0.0) {
            self.successful_trades += 1;
        }
        self.total_pnl += pnl.unwrap_or(0.0);
        self.win_rate = self.successful_trades as f64 / self.total_trades as f64;
        if execution_ms.is_finite() && execution_ms >= 0.0 {
            let n = self.total_trades as f64;
            self.avg_execution_ms += (execution_ms - self.avg_execution_ms) / n;
        }
    }
}

/// Point-in-time view of one engine, as exposed to reporting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineState {
    pub id: String,
    pub name: String,
    pub kind: EngineKind,
    pub status: EngineStatus,
    pub last_signal_at: Option<DateTime<Utc>>,
    pub metrics: EngineMetrics,
}

/// Payload pushed to the status sink on the slow cadence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineStatusReport {
    pub engine: String,
    pub status: EngineStatus,
    pub performance: EngineMetrics,
    pub last_update: DateTime<Utc>,
}

impl EngineStatusReport {
    pub fn from_state(state: &EngineState, at: DateTime<Utc>) -> Self {
        Self {
            engine: state.id.clone(),
            status: state.status,
            performance: state.metrics.clone(),
            last_update: at,
        }
    }
}
