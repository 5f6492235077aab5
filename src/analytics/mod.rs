//! Realized performance tracking

pub mod tracker;

pub use tracker::{compute_metrics, PerformanceTracker, DEFAULT_RETENTION_DAYS};
