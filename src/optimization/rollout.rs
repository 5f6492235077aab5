//! Applying an accepted candidate: persist, publish, record, notify
//!
//! The rollout is the only writer of the live parameter channel. Persisting
//! comes first, so a store failure leaves every other piece of state as it
//! was.

use super::history::OptimizationHistory;
use crate::error::StoreError;
use crate::metrics::Metrics;
use crate::models::{LiveParameters, OptimizationCandidate, OptimizationHistoryEntry};
use crate::services::{Notifier, ParameterStore, RetryPolicy};
use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum RolloutError {
    #[error("failed to persist parameters: {0}")]
    Store(#[from] StoreError),
}

pub struct Rollout {
    live: watch::Sender<Arc<LiveParameters>>,
    store: Arc<dyn ParameterStore>,
    notifier: Arc<dyn Notifier>,
    history: Arc<OptimizationHistory>,
    metrics: Arc<Metrics>,
    store_policy: RetryPolicy,
}

impl Rollout {
    pub fn new(
        initial: LiveParameters,
        store: Arc<dyn ParameterStore>,
        notifier: Arc<dyn Notifier>,
        history: Arc<OptimizationHistory>,
        metrics: Arc<Metrics>,
        store_policy: RetryPolicy,
    ) -> Self {
        metrics.current_score.set(initial.score);
        let (live, _) = watch::channel(Arc::new(initial));
        Self {
            live,
            store,
            notifier,
            history,
            metrics,
            store_policy,
        }
    }

    /// A receiver for engines and readers; every rollout replaces the value whole.
    pub fn subscribe(&self) -> watch::Receiver<Arc<LiveParameters>> {
        self.live.subscribe()
    }

    pub fn current(&self) -> Arc<LiveParameters> {
        self.live.borrow().clone()
    }

    pub fn history(&self) -> &Arc<OptimizationHistory> {
        &self.history
    }

    /// Make `candidate` the live set. The candidate must already have passed the
    /// gate against `baseline`, the live set's score under the same metrics.
    pub async fn apply(
        &self,
        candidate: &OptimizationCandidate,
        baseline: f64,
    ) -> Result<OptimizationHistoryEntry, RolloutError> {
        let store = &self.store;
        let parameters = &candidate.parameters;
        self.store_policy
            .run("save_parameters", move || store.save(parameters))
            .await?;

        let previous = self.current();
        let next = LiveParameters {
            parameters: candidate.parameters.clone(),
            score: candidate.score,
            revision: previous.revision + 1,
        };
        self.live.send_replace(Arc::new(next));

        let entry = OptimizationHistoryEntry {
            timestamp: Utc::now(),
            parameters: candidate.parameters.clone(),
            score: candidate.score,
            previous_score: baseline,
            method: candidate.method,
        };
        self.history.append(entry.clone()).await;

        self.metrics.current_score.set(candidate.score);
        self.metrics.rollouts_total.inc();
        info!(
            method = %candidate.method,
            score = candidate.score,
            previous_score = baseline,
            revision = previous.revision + 1,
            "Parameters rolled out"
        );

        let message = summary(&entry);
        if let Err(err) = self.notifier.notify(&message).await {
            warn!(error = %err, "Rollout notification failed");
        }
        Ok(entry)
    }
}

fn summary(entry: &OptimizationHistoryEntry) -> String {
    let gain = if entry.previous_score > 0.0 {
        format!(" (+{:.1}%)", (entry.score / entry.previous_score - 1.0) * 100.0)
    } else {
        String::new()
    };
    format!(
        "Hydra parameters updated via {} search: score {:.2} -> {:.2}{}",
        entry.method, entry.previous_score, entry.score, gain
    )
}
