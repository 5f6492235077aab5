//! Price-series indicators used by the signal engines

pub mod math;
pub mod momentum;
pub mod trend;
pub mod volatility;

pub use momentum::*;
pub use trend::*;
pub use volatility::*;
