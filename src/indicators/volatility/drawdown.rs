//! Peak-to-trough drawdown measures

/// Fractional decline of the latest price from the highest price in the series
pub fn drawdown_from_peak(prices: &[f64]) -> Option<f64> {
    let last = *prices.last()?;
    let peak = prices.iter().copied().fold(f64::MIN, f64::max);
    if peak <= 0.0 {
        return None;
    }
    Some(((peak - last) / peak).max(0.0))
}

/// Largest peak-to-trough decline of a cumulative equity curve, relative to the peak.
///
/// Zero while the curve has never been above zero.
pub fn max_drawdown(equity: &[f64]) -> f64 {
    let mut peak = f64::MIN;
    let mut worst = 0.0_f64;
    for &value in equity {
        peak = peak.max(value);
        if peak > 0.0 {
            worst = worst.max((peak - value) / peak);
        }
    }
    worst
}
