//! Unit tests for moving-average trend measures

use hydra::indicators::math::sma;
use hydra::indicators::trend::sma_momentum;

#[test]
fn test_sma_momentum_insufficient_data() {
    let prices = vec![1.0, 2.0, 3.0];
    assert!(sma_momentum(&prices, 2, 5).is_none());
}

#[test]
fn test_sma_momentum_downtrend_is_negative() {
    let prices: Vec<f64> = (0..30).map(|i| 100.0 - i as f64).collect();
    let momentum = sma_momentum(&prices, 5, 20).unwrap();
    assert!(momentum < 0.0);
}

#[test]
fn test_sma_momentum_matches_ratio_of_averages() {
    let prices: Vec<f64> = (1..=10).map(|i| i as f64).collect();
    let expected = sma(&prices, 2).unwrap() / sma(&prices, 10).unwrap() - 1.0;
    assert!((sma_momentum(&prices, 2, 10).unwrap() - expected).abs() < 1e-12);
}

#[test]
fn test_sma_momentum_rejects_non_positive_baseline() {
    let prices = vec![0.0; 10];
    assert!(sma_momentum(&prices, 2, 5).is_none());
}
