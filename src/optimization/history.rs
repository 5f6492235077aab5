//! Append-only logs kept by the optimization service

use crate::models::{OptimizationHistoryEntry, PerformanceSample};
use tokio::sync::RwLock;

/// Accepted rollouts, oldest first
#[derive(Debug, Default)]
pub struct OptimizationHistory {
    entries: RwLock<Vec<OptimizationHistoryEntry>>,
}

impl OptimizationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn append(&self, entry: OptimizationHistoryEntry) {
        self.entries.write().await.push(entry);
    }

    pub async fn entries(&self) -> Vec<OptimizationHistoryEntry> {
        self.entries.read().await.clone()
    }

    pub async fn latest(&self) -> Option<OptimizationHistoryEntry> {
        self.entries.read().await.last().cloned()
    }
}

/// Realized performance per applied set, the surrogate's training data.
/// Drops the oldest samples beyond `capacity`.
#[derive(Debug)]
pub struct SampleLog {
    samples: RwLock<Vec<PerformanceSample>>,
    capacity: usize,
}

impl SampleLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: RwLock::new(Vec::new()),
            capacity: capacity.max(1),
        }
    }

    pub async fn record(&self, sample: PerformanceSample) {
        let mut samples = self.samples.write().await;
        samples.push(sample);
        if samples.len() > self.capacity {
            let excess = samples.len() - self.capacity;
            samples.drain(..excess);
        }
    }

    pub async fn samples(&self) -> Vec<PerformanceSample> {
        self.samples.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.samples.read().await.len()
    }
}
