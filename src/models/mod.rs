//! Shared data models spanning the engine and optimization layers.

pub mod engine;
pub mod market;
pub mod optimization;
pub mod parameters;
pub mod performance;
pub mod signal;

pub use engine::{EngineKind, EngineMetrics, EngineState, EngineStatus, EngineStatusReport};
pub use market::MarketSnapshot;
pub use optimization::{
    LiveParameters, OptimizationCandidate, OptimizationHistoryEntry, PerformanceSample,
    SearchMethod,
};
pub use parameters::{
    ParameterDescriptor, ParameterGroup, ParameterKind, ParameterSet, ALLOCATION_PARAMETERS,
};
pub use performance::{PerformanceMetrics, TradeOutcome};
pub use signal::{SignalIntent, SignalSide, SignalStrength, TradingSignal};
