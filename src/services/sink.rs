//! Downstream sinks for emitted signals and engine status

use crate::error::SinkError;
use crate::models::{EngineStatusReport, TradingSignal};
use async_trait::async_trait;

#[async_trait]
pub trait SignalSink: Send + Sync {
    async fn publish(&self, signal: &TradingSignal) -> Result<(), SinkError>;
}

#[async_trait]
pub trait StatusSink: Send + Sync {
    async fn report(&self, status: &EngineStatusReport) -> Result<(), SinkError>;
}
