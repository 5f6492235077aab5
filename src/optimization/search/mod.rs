//! Search strategies over the parameter space
//!
//! Each strategy is synchronous and CPU-bound; the optimizer runs them on
//! the blocking pool. A strategy checks [`SearchContext::should_stop`]
//! between trials and returns the best candidate it has seen so far once
//! its deadline passes.

pub mod bayesian;
pub mod evolutionary;
pub mod gradient;
pub mod stochastic;

pub use bayesian::BayesianSearch;
pub use evolutionary::EvolutionarySearch;
pub use gradient::GradientSearch;
pub use stochastic::StochasticSearch;

use super::scoring::Scorer;
use super::space::{SearchSpace, SpaceError};
use super::surrogate::RidgeSurrogate;
use crate::models::{OptimizationCandidate, ParameterSet, PerformanceMetrics, SearchMethod};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search was cancelled")]
    Cancelled,

    #[error("no candidate evaluated before the deadline")]
    NoCandidate,

    #[error(transparent)]
    Space(#[from] SpaceError),
}

/// Everything a strategy needs for one run
#[derive(Clone)]
pub struct SearchContext {
    pub space: Arc<SearchSpace>,
    pub scorer: Scorer,
    pub metrics: PerformanceMetrics,
    /// The applied parameter set the search starts from
    pub current: ParameterSet,
    pub surrogate: Option<Arc<RidgeSurrogate>>,
    pub trials: usize,
    pub deadline: Instant,
    pub seed: u64,
    pub cancel: Arc<AtomicBool>,
}

impl SearchContext {
    /// True score of a parameter set under the cycle's performance snapshot
    pub fn evaluate(&self, params: &ParameterSet) -> f64 {
        self.scorer.score(params, &self.metrics)
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    pub fn should_stop(&self) -> bool {
        self.is_cancelled() || Instant::now() >= self.deadline
    }

    /// Start point for local searches: the current set, repaired into the space
    pub fn start(&self) -> ParameterSet {
        self.space.repair(&self.current)
    }
}

pub trait SearchStrategy: Send + Sync {
    fn method(&self) -> SearchMethod;

    fn search(&self, ctx: &SearchContext) -> Result<OptimizationCandidate, SearchError>;
}

/// Best-so-far bookkeeping shared by the strategies
pub(crate) struct Incumbent {
    method: SearchMethod,
    best: Option<(ParameterSet, f64)>,
    evaluated: usize,
}

impl Incumbent {
    pub(crate) fn new(method: SearchMethod) -> Self {
        Self {
            method,
            best: None,
            evaluated: 0,
        }
    }

    /// Record an evaluation; returns true when it became the new best.
    pub(crate) fn offer(&mut self, params: &ParameterSet, score: f64) -> bool {
        self.evaluated += 1;
        if !score.is_finite() {
            return false;
        }
        let improved = self.best.as_ref().map_or(true, |(_, best)| score > *best);
        if improved {
            self.best = Some((params.clone(), score));
        }
        improved
    }

    pub(crate) fn best_score(&self) -> Option<f64> {
        self.best.as_ref().map(|(_, s)| *s)
    }

    pub(crate) fn evaluated(&self) -> usize {
        self.evaluated
    }

    pub(crate) fn finish(self, ctx: &SearchContext) -> Result<OptimizationCandidate, SearchError> {
        if ctx.is_cancelled() {
            return Err(SearchError::Cancelled);
        }
        let (parameters, score) = self.best.ok_or(SearchError::NoCandidate)?;
        Ok(OptimizationCandidate {
            parameters,
            score,
            method: self.method,
        })
    }
}

/// Per-strategy RNG stream derived from the cycle seed
pub(crate) fn strategy_seed(seed: u64, method: SearchMethod) -> u64 {
    seed ^ (method as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}
