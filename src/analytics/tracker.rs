//! Trade history and the metrics folded from it
//!
//! Trades older than the retention horizon (measured from the newest trade
//! seen) are evicted together with their deduplication keys, and late
//! arrivals beyond it are refused.

use crate::indicators::math::{mean, standard_deviation};
use crate::indicators::max_drawdown;
use crate::models::{PerformanceMetrics, TradeOutcome};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashSet;
use tokio::sync::RwLock;
use tracing::debug;

/// Covers the monthly PnL window
pub const DEFAULT_RETENTION_DAYS: i64 = 30;

#[derive(Debug, Default)]
struct TradeLog {
    trades: Vec<TradeOutcome>,
    seen_ids: HashSet<String>,
    newest: Option<DateTime<Utc>>,
}

impl TradeLog {
    /// Drop trades settled before `cutoff`; returns how many went.
    fn evict_before(&mut self, cutoff: DateTime<Utc>) -> usize {
        let before = self.trades.len();
        let seen_ids = &mut self.seen_ids;
        self.trades.retain(|t| {
            let keep = t.timestamp >= cutoff;
            if !keep {
                if let Some(id) = &t.trade_id {
                    seen_ids.remove(id);
                }
            }
            keep
        });
        before - self.trades.len()
    }
}

/// Shared trade history. Readers always receive computed copies.
#[derive(Debug)]
pub struct PerformanceTracker {
    log: RwLock<TradeLog>,
    retention: Duration,
}

impl Default for PerformanceTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl PerformanceTracker {
    pub fn new() -> Self {
        Self::with_retention(Duration::days(DEFAULT_RETENTION_DAYS))
    }

    pub fn with_retention(retention: Duration) -> Self {
        Self {
            log: RwLock::new(TradeLog::default()),
            retention,
        }
    }

    pub fn retention(&self) -> Duration {
        self.retention
    }

    /// Append a settled trade. Returns false when the trade id was already
    /// recorded or the trade is older than the retention horizon.
    pub async fn record(&self, outcome: TradeOutcome) -> bool {
        let mut log = self.log.write().await;
        let newest = log
            .newest
            .map_or(outcome.timestamp, |n| n.max(outcome.timestamp));
        let cutoff = newest - self.retention;
        if outcome.timestamp < cutoff {
            debug!(engine = %outcome.engine_id, "Trade outcome older than retention ignored");
            return false;
        }
        if let Some(id) = &outcome.trade_id {
            if !log.seen_ids.insert(id.clone()) {
                debug!(
                    trade_id = %id,
                    engine = %outcome.engine_id,
                    "Duplicate trade outcome ignored"
                );
                return false;
            }
        }
        log.trades.push(outcome);

        if log.newest != Some(newest) {
            log.newest = Some(newest);
            let evicted = log.evict_before(cutoff);
            if evicted > 0 {
                debug!(evicted, "Evicted trades past retention");
            }
        }
        true
    }

    pub async fn trade_count(&self) -> usize {
        self.log.read().await.trades.len()
    }

    pub async fn snapshot(&self, now: DateTime<Utc>) -> PerformanceMetrics {
        compute_metrics(&self.log.read().await.trades, now)
    }

    /// Metrics over trades settled within `duration` before `now`
    pub async fn window(&self, now: DateTime<Utc>, duration: Duration) -> PerformanceMetrics {
        let since = now - duration;
        let trades: Vec<TradeOutcome> = self
            .log
            .read()
            .await
            .trades
            .iter()
            .filter(|t| t.timestamp > since && t.timestamp <= now)
            .cloned()
            .collect();
        compute_metrics(&trades, now)
    }

    pub async fn engine_snapshot(&self, engine_id: &str, now: DateTime<Utc>) -> PerformanceMetrics {
        let trades: Vec<TradeOutcome> = self
            .log
            .read()
            .await
            .trades
            .iter()
            .filter(|t| t.engine_id == engine_id)
            .cloned()
            .collect();
        compute_metrics(&trades, now)
    }
}

/// Pure fold of a trade list into metrics. PnL windows are relative to `now`.
pub fn compute_metrics(trades: &[TradeOutcome], now: DateTime<Utc>) -> PerformanceMetrics {
    if trades.is_empty() {
        return PerformanceMetrics::default();
    }

    let pnls: Vec<f64> = trades.iter().map(TradeOutcome::realized_pnl).collect();
    let wins: Vec<f64> = trades
        .iter()
        .filter(|t| t.is_win())
        .map(TradeOutcome::realized_pnl)
        .collect();
    let losses: Vec<f64> = pnls.iter().copied().filter(|p| *p < 0.0).map(f64::abs).collect();

    let total_trades = trades.len() as u64;
    let successful_trades = wins.len() as u64;
    let total_pnl: f64 = pnls.iter().sum();

    let pnl_since = |days: i64| -> f64 {
        let since = now - Duration::days(days);
        trades
            .iter()
            .filter(|t| t.timestamp > since && t.timestamp <= now)
            .map(TradeOutcome::realized_pnl)
            .sum()
    };

    let avg_profit = mean(&wins).unwrap_or(0.0);
    let avg_loss = mean(&losses).unwrap_or(0.0);
    let profit_factor = if avg_loss > 0.0 { avg_profit / avg_loss } else { 0.0 };

    let sharpe_ratio = match (mean(&pnls), standard_deviation(&pnls, pnls.len())) {
        (Some(m), Some(sd)) if pnls.len() >= 2 && sd > 0.0 => m / sd * (pnls.len() as f64).sqrt(),
        _ => 0.0,
    };

    let mut ordered: Vec<&TradeOutcome> = trades.iter().collect();
    ordered.sort_by_key(|t| t.timestamp);
    let equity: Vec<f64> = ordered
        .iter()
        .scan(0.0, |acc, t| {
            *acc += t.realized_pnl();
            Some(*acc)
        })
        .collect();

    let latencies: Vec<f64> = trades
        .iter()
        .map(|t| t.execution_ms)
        .filter(|ms| ms.is_finite() && *ms >= 0.0)
        .collect();

    PerformanceMetrics {
        total_trades,
        successful_trades,
        win_rate: successful_trades as f64 / total_trades as f64,
        total_pnl,
        daily_pnl: pnl_since(1),
        weekly_pnl: pnl_since(7),
        monthly_pnl: pnl_since(30),
        avg_profit_per_trade: avg_profit,
        avg_loss_per_trade: avg_loss,
        best_trade: pnls.iter().copied().fold(f64::MIN, f64::max),
        worst_trade: pnls.iter().copied().fold(f64::MAX, f64::min),
        profit_factor,
        sharpe_ratio,
        max_drawdown: max_drawdown(&equity),
        avg_execution_ms: mean(&latencies).unwrap_or(0.0),
    }
}
