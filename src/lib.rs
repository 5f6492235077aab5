//! Hydra: signal-engine orchestration and multi-algorithm parameter optimization.
//!
//! Engines are polled by the [`engines::Orchestrator`] against one market
//! snapshot per tick. Settled trades flow into the
//! [`analytics::PerformanceTracker`], which the optimization service reads to
//! re-tune the shared parameter space. Accepted parameter sets reach the
//! engines through the live-parameter channel on their next tick.

pub mod analytics;
pub mod config;
pub mod core;
pub mod engines;
pub mod error;
pub mod indicators;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod optimization;
pub mod services;
