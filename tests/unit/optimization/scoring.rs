//! Unit tests for the composite objective

use hydra::config::ObjectiveWeights;
use hydra::models::{ParameterSet, PerformanceMetrics};
use hydra::optimization::{realized_score, Scorer, SearchSpace};

fn only(profit: f64, risk: f64, execution: f64, value_accrual: f64, community: f64) -> Scorer {
    Scorer::new(ObjectiveWeights {
        profit,
        risk,
        execution,
        value_accrual,
        community,
    })
}

#[test]
fn test_total_is_weighted_sum_of_components() {
    let scorer = Scorer::default();
    let params = SearchSpace::default().defaults();
    let metrics = PerformanceMetrics::default();

    let b = scorer.breakdown(&params, &metrics);
    let w = scorer.weights();
    let expected = b.profit * w.profit
        + b.risk * w.risk
        + b.execution * w.execution
        + b.value_accrual * w.value_accrual
        + b.community * w.community;
    assert!((b.total - expected).abs() < 1e-9);
    for component in [b.profit, b.risk, b.execution, b.value_accrual, b.community] {
        assert!((0.0..=100.0).contains(&component));
    }
}

#[test]
fn test_single_weight_isolates_component() {
    let params = SearchSpace::default().defaults();
    let metrics = PerformanceMetrics::default();
    let risk_only = only(0.0, 1.0, 0.0, 0.0, 0.0);
    let b = risk_only.breakdown(&params, &metrics);
    assert!((b.total - b.risk).abs() < 1e-9);
}

#[test]
fn test_higher_commission_raises_value_accrual() {
    let scorer = only(0.0, 0.0, 0.0, 1.0, 0.0);
    let metrics = PerformanceMetrics::default();
    let base = SearchSpace::default().defaults();
    let low = scorer.score(&base.clone().with("commission_rate", 0.010), &metrics);
    let high = scorer.score(&base.with("commission_rate", 0.020), &metrics);
    assert!(high > low);
}

#[test]
fn test_realized_trading_feeds_value_accrual() {
    let scorer = Scorer::default();
    let params = SearchSpace::default().defaults();
    let strong = PerformanceMetrics {
        total_trades: 20,
        sharpe_ratio: 3.0,
        max_drawdown: 0.0,
        ..Default::default()
    };
    let weak = PerformanceMetrics {
        total_trades: 20,
        sharpe_ratio: -2.0,
        max_drawdown: 0.4,
        ..Default::default()
    };
    assert!(scorer.score(&params, &strong) > scorer.score(&params, &weak));
}

#[test]
fn test_realized_score_without_trades_is_zero() {
    assert_eq!(realized_score(&PerformanceMetrics::default()), 0.0);
}

#[test]
fn test_empty_set_scores_like_defaults() {
    let scorer = Scorer::default();
    let metrics = PerformanceMetrics::default();
    let score = scorer.score(&ParameterSet::new(), &metrics);
    assert!(score.is_finite());
    assert!((0.0..=100.0).contains(&score));
}

#[test]
fn test_profit_component_leaves_headroom_at_defaults() {
    let defaults = SearchSpace::default().defaults();
    let breakdown = Scorer::default().breakdown(&defaults, &PerformanceMetrics::default());
    // 40 base + 10 confidence + 15 position headroom + 25 take-profit
    assert!((breakdown.profit - 90.0).abs() < 1e-9);

    let richer = defaults.with("take_profit_percentage", 0.30);
    let richer_profit = Scorer::default()
        .breakdown(&richer, &PerformanceMetrics::default())
        .profit;
    assert!(richer_profit > breakdown.profit);
}
