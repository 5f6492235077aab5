//! Volatility indicators: Bollinger z-score, drawdown

pub mod bollinger;
pub mod drawdown;

pub use bollinger::*;
pub use drawdown::*;
