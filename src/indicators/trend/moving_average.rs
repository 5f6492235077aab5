//! Moving-average trend measures

use crate::indicators::math;

/// Relative distance of the fast SMA above the slow SMA.
///
/// Positive when the short-term average trades above the long-term one.
pub fn sma_momentum(prices: &[f64], fast_period: usize, slow_period: usize) -> Option<f64> {
    let fast = math::sma(prices, fast_period)?;
    let slow = math::sma(prices, slow_period)?;
    if slow <= 0.0 {
        return None;
    }
    Some(fast / slow - 1.0)
}
