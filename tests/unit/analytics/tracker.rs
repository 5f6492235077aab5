//! Unit tests for the performance tracker

use chrono::{Duration, TimeZone, Utc};
use hydra::analytics::{compute_metrics, PerformanceTracker};
use hydra::models::TradeOutcome;

fn at(minutes: i64) -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap() + Duration::minutes(minutes)
}

#[test]
fn test_metrics_of_mixed_trades() {
    let now = at(0);
    let trades = vec![
        TradeOutcome::new("sniper", Some(10.0), 500.0, at(-30)),
        TradeOutcome::new("sniper", Some(-5.0), 700.0, at(-20)),
        TradeOutcome::new("reentry", Some(20.0), 600.0, at(-10)),
        TradeOutcome::new("reentry", None, f64::NAN, at(-5)),
    ];

    let m = compute_metrics(&trades, now);
    assert_eq!(m.total_trades, 4);
    assert_eq!(m.successful_trades, 2);
    assert!((m.win_rate - 0.5).abs() < 1e-12);
    assert!((m.total_pnl - 25.0).abs() < 1e-12);
    assert!((m.profit_factor - 3.0).abs() < 1e-12);
    assert_eq!(m.best_trade, 20.0);
    assert_eq!(m.worst_trade, -5.0);
    // the NaN latency is excluded
    assert!((m.avg_execution_ms - 600.0).abs() < 1e-12);
    assert!((m.max_drawdown - 0.5).abs() < 1e-12);
}

#[test]
fn test_pnl_windows_are_relative_to_now() {
    let now = at(0);
    let trades = vec![
        TradeOutcome::new("guardian", Some(1.0), 100.0, now - Duration::hours(2)),
        TradeOutcome::new("guardian", Some(2.0), 100.0, now - Duration::days(3)),
        TradeOutcome::new("guardian", Some(4.0), 100.0, now - Duration::days(10)),
        TradeOutcome::new("guardian", Some(8.0), 100.0, now - Duration::days(40)),
    ];

    let m = compute_metrics(&trades, now);
    assert_eq!(m.daily_pnl, 1.0);
    assert_eq!(m.weekly_pnl, 3.0);
    assert_eq!(m.monthly_pnl, 7.0);
    assert_eq!(m.total_pnl, 15.0);
}

#[test]
fn test_empty_history_is_all_zero() {
    let m = compute_metrics(&[], at(0));
    assert_eq!(m.total_trades, 0);
    assert_eq!(m.win_rate, 0.0);
    assert_eq!(m.sharpe_ratio, 0.0);
}

#[tokio::test]
async fn test_tracker_deduplicates_and_filters() {
    let tracker = PerformanceTracker::new();
    let now = at(0);

    let first = TradeOutcome::new("sniper", Some(3.0), 100.0, at(-90)).with_trade_id("a");
    assert!(tracker.record(first.clone()).await);
    assert!(!tracker.record(first).await);
    assert!(tracker.record(TradeOutcome::new("scalper", Some(-1.0), 100.0, at(-10))).await);
    assert!(tracker.record(TradeOutcome::new("scalper", Some(-1.0), 100.0, at(-10))).await);

    assert_eq!(tracker.trade_count().await, 3);
    let snapshot = tracker.snapshot(now).await;
    assert_eq!(snapshot.total_trades, 3);

    let recent = tracker.window(now, Duration::hours(1)).await;
    assert_eq!(recent.total_trades, 2);
    assert_eq!(recent.total_pnl, -2.0);

    let sniper = tracker.engine_snapshot("sniper", now).await;
    assert_eq!(sniper.total_trades, 1);
}
