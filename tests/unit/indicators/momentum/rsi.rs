//! Unit tests for RSI indicator

use hydra::indicators::momentum::calculate_rsi;

#[test]
fn test_rsi_insufficient_data() {
    let prices: Vec<f64> = (0..10).map(|i| 100.0 + i as f64).collect();
    assert!(calculate_rsi(&prices, 14).is_none());
    assert!(calculate_rsi(&prices, 0).is_none());
}

#[test]
fn test_rsi_falling_series_is_oversold() {
    let prices: Vec<f64> = (0..20).map(|i| 100.0 - i as f64).collect();
    assert_eq!(calculate_rsi(&prices, 14), Some(0.0));
}

#[test]
fn test_rsi_balanced_moves() {
    // alternating +1 / -1 changes give equal average gain and loss
    let prices: Vec<f64> = (0..15).map(|i| if i % 2 == 0 { 10.0 } else { 11.0 }).collect();
    let rsi = calculate_rsi(&prices, 14).unwrap();
    assert!((rsi - 50.0).abs() < 1e-9);
}

#[test]
fn test_rsi_only_uses_tail_window() {
    let mut prices: Vec<f64> = (0..30).map(|i| 200.0 - i as f64 * 3.0).collect();
    let last = *prices.last().unwrap();
    prices.extend((1..=6).map(|i| last + i as f64));
    assert_eq!(calculate_rsi(&prices, 5), Some(100.0));
}
