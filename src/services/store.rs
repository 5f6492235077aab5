//! Durable storage for the applied parameter set

use crate::error::StoreError;
use crate::models::ParameterSet;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::info;

#[async_trait]
pub trait ParameterStore: Send + Sync {
    /// The last saved set, or `None` when nothing has been saved yet.
    async fn load(&self) -> Result<Option<ParameterSet>, StoreError>;

    async fn save(&self, parameters: &ParameterSet) -> Result<(), StoreError>;
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredParameters {
    saved_at: DateTime<Utc>,
    parameters: ParameterSet,
}

/// JSON document on local disk, replaced atomically on every save
#[derive(Debug, Clone)]
pub struct JsonFileParameterStore {
    path: PathBuf,
}

impl JsonFileParameterStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "parameters.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl ParameterStore for JsonFileParameterStore {
    async fn load(&self) -> Result<Option<ParameterSet>, StoreError> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let stored: StoredParameters = serde_json::from_slice(&raw)?;
        info!(
            path = %self.path.display(),
            saved_at = %stored.saved_at,
            "Loaded parameter set"
        );
        Ok(Some(stored.parameters))
    }

    async fn save(&self, parameters: &ParameterSet) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir).await?;
        }
        let stored = StoredParameters {
            saved_at: Utc::now(),
            parameters: parameters.clone(),
        };
        let payload = serde_json::to_vec_pretty(&stored)?;
        let staging = self.staging_path();
        tokio::fs::write(&staging, payload).await?;
        tokio::fs::rename(&staging, &self.path).await?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryParameterStore {
    current: RwLock<Option<ParameterSet>>,
}

impl InMemoryParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parameters(parameters: ParameterSet) -> Self {
        Self {
            current: RwLock::new(Some(parameters)),
        }
    }
}

#[async_trait]
impl ParameterStore for InMemoryParameterStore {
    async fn load(&self) -> Result<Option<ParameterSet>, StoreError> {
        Ok(self.current.read().await.clone())
    }

    async fn save(&self, parameters: &ParameterSet) -> Result<(), StoreError> {
        *self.current.write().await = Some(parameters.clone());
        Ok(())
    }
}
