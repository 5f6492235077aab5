//! Bollinger Bands position

use crate::indicators::math;

/// Distance of the latest price from the rolling mean, in standard deviations.
///
/// Middle Band = SMA(period); a z-score of ±2 sits on the default bands.
/// Returns `None` for a flat window.
pub fn bollinger_zscore(prices: &[f64], period: usize) -> Option<f64> {
    let middle = math::sma(prices, period)?;
    let std = math::standard_deviation(prices, period)?;
    if std <= f64::EPSILON {
        return None;
    }
    let last = *prices.last()?;
    Some((last - middle) / std)
}
