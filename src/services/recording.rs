//! In-memory sink that keeps everything it receives

use super::notifier::Notifier;
use super::sink::{SignalSink, StatusSink};
use crate::error::SinkError;
use crate::models::{EngineStatusReport, TradingSignal};
use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

/// Collects signals, status reports and notifications.
///
/// Used for dry runs when no backend is configured, and by tests.
#[derive(Debug, Default)]
pub struct RecordingSink {
    signals: RwLock<Vec<TradingSignal>>,
    statuses: RwLock<Vec<EngineStatusReport>>,
    notifications: RwLock<Vec<String>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn signals(&self) -> Vec<TradingSignal> {
        self.signals.read().await.clone()
    }

    pub async fn statuses(&self) -> Vec<EngineStatusReport> {
        self.statuses.read().await.clone()
    }

    pub async fn notifications(&self) -> Vec<String> {
        self.notifications.read().await.clone()
    }
}

#[async_trait]
impl SignalSink for RecordingSink {
    async fn publish(&self, signal: &TradingSignal) -> Result<(), SinkError> {
        info!(
            engine = %signal.engine,
            side = ?signal.side,
            symbol = %signal.symbol,
            confidence = signal.confidence,
            "Signal recorded"
        );
        self.signals.write().await.push(signal.clone());
        Ok(())
    }
}

#[async_trait]
impl StatusSink for RecordingSink {
    async fn report(&self, status: &EngineStatusReport) -> Result<(), SinkError> {
        self.statuses.write().await.push(status.clone());
        Ok(())
    }
}

#[async_trait]
impl Notifier for RecordingSink {
    async fn notify(&self, message: &str) -> Result<(), SinkError> {
        self.notifications.write().await.push(message.to_string());
        Ok(())
    }
}
