//! HTTP backend receiving signals and engine status

use super::sink::{SignalSink, StatusSink};
use crate::error::SinkError;
use crate::models::{EngineStatusReport, TradingSignal};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

const SIGNALS_PATH: &str = "/api/hydra-bot/signals";
const ENGINE_STATUS_PATH: &str = "/api/hydra-bot/engine-status";

#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Result<Self, SinkError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<(), SinkError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.post(&url).json(body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SinkError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        debug!(url = %url, status = status.as_u16(), "Backend accepted payload");
        Ok(())
    }
}

#[async_trait]
impl SignalSink for HttpBackend {
    async fn publish(&self, signal: &TradingSignal) -> Result<(), SinkError> {
        self.post(SIGNALS_PATH, signal).await
    }
}

#[async_trait]
impl StatusSink for HttpBackend {
    async fn report(&self, status: &EngineStatusReport) -> Result<(), SinkError> {
        self.post(ENGINE_STATUS_PATH, status).await
    }
}
