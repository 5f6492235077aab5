//! Optimizer-facing records: candidates, history and training samples

use super::parameters::ParameterSet;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Search strategy that produced a candidate.
///
/// Declaration order is the tie-break priority: earlier variants are the
/// more conservative methods and win equal scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMethod {
    Bayesian,
    Evolutionary,
    Gradient,
    Stochastic,
}

impl SearchMethod {
    pub const ALL: [SearchMethod; 4] = [
        SearchMethod::Bayesian,
        SearchMethod::Evolutionary,
        SearchMethod::Gradient,
        SearchMethod::Stochastic,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SearchMethod::Bayesian => "bayesian",
            SearchMethod::Evolutionary => "evolutionary",
            SearchMethod::Gradient => "gradient",
            SearchMethod::Stochastic => "stochastic",
        }
    }
}

impl fmt::Display for SearchMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationCandidate {
    pub parameters: ParameterSet,
    pub score: f64,
    pub method: SearchMethod,
}

/// One accepted rollout; never mutated after being appended
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationHistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub parameters: ParameterSet,
    pub score: f64,
    pub previous_score: f64,
    pub method: SearchMethod,
}

/// Realized score observed while a parameter set was live
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSample {
    pub parameters: ParameterSet,
    pub realized_score: f64,
    pub observed_at: DateTime<Utc>,
}

/// The applied parameter set together with the score it was accepted at
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveParameters {
    pub parameters: ParameterSet,
    pub score: f64,
    /// Incremented on every rollout; engines use it to detect hot updates.
    pub revision: u64,
}
