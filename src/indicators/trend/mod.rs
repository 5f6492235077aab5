//! Trend indicators: moving averages and crossover momentum

pub mod moving_average;

pub use moving_average::*;
