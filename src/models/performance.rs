//! Trade outcomes and the aggregated performance snapshot

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One settled trade as reported by the execution collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeOutcome {
    /// Deduplication key; outcomes without one are always accepted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trade_id: Option<String>,
    pub engine_id: String,
    pub pnl: Option<f64>,
    pub execution_ms: f64,
    pub timestamp: DateTime<Utc>,
}

impl TradeOutcome {
    pub fn new(
        engine_id: impl Into<String>,
        pnl: Option<f64>,
        execution_ms: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            trade_id: None,
            engine_id: engine_id.into(),
            pnl,
            execution_ms,
            timestamp,
        }
    }

    pub fn with_trade_id(mut self, id: impl Into<String>) -> Self {
        self.trade_id = Some(id.into());
        self
    }

    /// Realized PnL, or zero when unknown or not finite
    pub fn realized_pnl(&self) -> f64 {
        self.pnl.filter(|p| p.is_finite()).unwrap_or(0.0)
    }

    pub fn is_win(&self) -> bool {
        self.realized_pnl() > 0.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub total_trades: u64,
    pub successful_trades: u64,
    pub win_rate: f64,
    pub total_pnl: f64,
    pub daily_pnl: f64,
    pub weekly_pnl: f64,
    pub monthly_pnl: f64,
    pub avg_profit_per_trade: f64,
    pub avg_loss_per_trade: f64,
    pub best_trade: f64,
    pub worst_trade: f64,
    pub profit_factor: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
    pub avg_execution_ms: f64,
}
