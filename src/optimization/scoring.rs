//! Composite objective over a parameter set and a performance snapshot
//!
//! Every component is bounded to [0, 100]; the weighted sum is therefore
//! bounded too as long as the weights sum to one. Scoring is pure: the same
//! inputs always produce the same score.

use crate::config::ObjectiveWeights;
use crate::models::{ParameterSet, PerformanceMetrics};

/// Per-component breakdown, mostly for logging and notifications
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBreakdown {
    pub profit: f64,
    pub risk: f64,
    pub execution: f64,
    pub value_accrual: f64,
    pub community: f64,
    pub total: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Scorer {
    weights: ObjectiveWeights,
}

impl Scorer {
    pub fn new(weights: ObjectiveWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &ObjectiveWeights {
        &self.weights
    }

    pub fn score(&self, params: &ParameterSet, metrics: &PerformanceMetrics) -> f64 {
        self.breakdown(params, metrics).total
    }

    pub fn breakdown(&self, params: &ParameterSet, metrics: &PerformanceMetrics) -> ScoreBreakdown {
        let profit = profit_score(params);
        let risk = risk_score(params);
        let execution = execution_score(params);
        let value_accrual = value_accrual_score(params, metrics);
        let community = community_score(params);
        let w = &self.weights;
        let total = bounded(
            profit * w.profit
                + risk * w.risk
                + execution * w.execution
                + value_accrual * w.value_accrual
                + community * w.community,
        );
        ScoreBreakdown {
            profit,
            risk,
            execution,
            value_accrual,
            community,
            total,
        }
    }
}

fn bounded(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

fn reaction_seconds(params: &ParameterSet) -> f64 {
    params.get_or("sniper_reaction_time", 2000.0) / 1000.0
}

/// Profit potential from confidence, position headroom and take-profit.
///
/// The base is 40, not 100: with a base of 100 every realistic set clamps at
/// the ceiling.
pub fn profit_score(params: &ParameterSet) -> f64 {
    let confidence_bonus = (params.get_or("ai_min_confidence", 0.7) - 0.5) * 50.0;
    let position_headroom = (params.get_or("max_position_size", 5.0) / 10.0).min(1.0) * 30.0;
    let take_profit = params.get_or("take_profit_percentage", 0.25) * 100.0;
    bounded(40.0 + confidence_bonus + position_headroom + take_profit)
}

pub fn risk_score(params: &ParameterSet) -> f64 {
    let mut score = 100.0;

    let max_daily_loss = params.get_or("max_daily_loss", 0.05);
    if max_daily_loss > 0.05 {
        score -= (max_daily_loss - 0.05) * 1000.0;
    }

    let stop_loss = params.get_or("stop_loss_percentage", 0.15);
    if (0.10..=0.20).contains(&stop_loss) {
        score += 10.0;
    }

    if params.get_or("max_position_size", 5.0) <= 5.0 {
        score += 10.0;
    }

    bounded(score)
}

pub fn execution_score(params: &ParameterSet) -> f64 {
    let speed = bounded(100.0 - (reaction_seconds(params) - 1.0) * 50.0);
    let fee = bounded(params.get_or("priority_fee", 0.01) / 0.05 * 50.0 + 50.0);
    let slippage = bounded(100.0 - params.get_or("slippage_tolerance", 0.01) * 1000.0);
    (speed + fee + slippage) / 3.0
}

pub fn value_accrual_score(params: &ParameterSet, metrics: &PerformanceMetrics) -> f64 {
    let commission = bounded(params.get_or("commission_rate", 0.015) / 0.025 * 100.0);
    let treasury = bounded(params.get_or("treasury_allocation", 0.70) / 0.80 * 100.0);
    let burn = bounded(params.get_or("burn_allocation", 0.20) / 0.30 * 100.0);
    let frequency = bounded(1.0 / reaction_seconds(params).max(0.1) * 20.0);
    let risk_adjusted = risk_adjusted_return_score(metrics);

    bounded(
        commission * 0.25
            + treasury * 0.20
            + burn * 0.25
            + frequency * 0.15
            + risk_adjusted * 0.15,
    )
}

pub fn community_score(params: &ParameterSet) -> f64 {
    let burn_frequency = bounded(100.0 - (params.get_or("burn_threshold", 1000.0) - 500.0) / 10.0);
    let buyback = bounded(params.get_or("buyback_allocation", 0.10) / 0.25 * 100.0);
    let commission = params.get_or("commission_rate", 0.015);
    let transparency = if (0.010..=0.020).contains(&commission) {
        100.0
    } else {
        50.0
    };
    (burn_frequency + buyback + transparency) / 3.0
}

/// Sharpe and drawdown of realized trading mapped onto [0, 100]; neutral without trades.
pub fn risk_adjusted_return_score(metrics: &PerformanceMetrics) -> f64 {
    if metrics.total_trades == 0 {
        return 50.0;
    }
    bounded(50.0 + metrics.sharpe_ratio * 10.0 - metrics.max_drawdown * 100.0)
}

/// Realized performance on [0, 100], the training target for the surrogate model.
pub fn realized_score(metrics: &PerformanceMetrics) -> f64 {
    if metrics.total_trades == 0 {
        return 0.0;
    }
    let win_rate = metrics.win_rate.clamp(0.0, 1.0) * 40.0;
    let sharpe = (metrics.sharpe_ratio.clamp(-3.0, 3.0) + 3.0) / 6.0 * 30.0;
    let pnl = if metrics.total_pnl > 0.0 {
        20.0
    } else if metrics.total_pnl == 0.0 {
        10.0
    } else {
        0.0
    };
    let drawdown = (1.0 - metrics.max_drawdown.clamp(0.0, 1.0)) * 10.0;
    bounded(win_rate + sharpe + pnl + drawdown)
}
