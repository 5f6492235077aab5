//! Unit tests for volatility measures

use hydra::indicators::volatility::{bollinger_zscore, drawdown_from_peak, max_drawdown};

#[test]
fn test_bollinger_drop_below_mean_is_negative() {
    let mut prices = vec![50.0, 51.0, 49.0, 50.0, 51.0, 49.0, 50.0];
    prices.push(44.0);
    assert!(bollinger_zscore(&prices, 8).unwrap() < -1.5);
}

#[test]
fn test_bollinger_insufficient_data() {
    assert!(bollinger_zscore(&[1.0, 2.0], 20).is_none());
}

#[test]
fn test_drawdown_at_new_high_is_zero() {
    let prices = vec![1.0, 2.0, 3.0];
    assert_eq!(drawdown_from_peak(&prices), Some(0.0));
    assert!(drawdown_from_peak(&[]).is_none());
}

#[test]
fn test_max_drawdown_of_monotonic_curve() {
    let equity: Vec<f64> = (1..=10).map(|i| i as f64).collect();
    assert_eq!(max_drawdown(&equity), 0.0);
    assert_eq!(max_drawdown(&[]), 0.0);
}
