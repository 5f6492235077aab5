//! Human-readable notifications about optimizer activity

use crate::error::SinkError;
use async_trait::async_trait;
use tracing::info;

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, message: &str) -> Result<(), SinkError>;
}

/// Writes notifications to the log; the default when no chat integration is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, message: &str) -> Result<(), SinkError> {
        info!(target: "hydra::notify", "{}", message);
        Ok(())
    }
}
