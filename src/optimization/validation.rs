//! Validation gate between the optimizer and rollout

use super::space::{SearchSpace, SpaceError};
use crate::config::GateConfig;
use crate::models::{OptimizationCandidate, ParameterSet};
use thiserror::Error;
use tracing::{debug, warn};

/// Why a candidate was not admitted. Never fatal to the cycle.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Rejection {
    #[error("bounds check failed: {0}")]
    Bounds(#[from] SpaceError),

    #[error("allocations sum to {sum:.4}, expected 1 within {epsilon}")]
    AllocationSum { sum: f64, epsilon: f64 },

    #[error("max_daily_loss {value} exceeds the risk ceiling {cap}")]
    RiskCeiling { value: f64, cap: f64 },

    #[error("score {candidate:.4} does not beat {current:.4} by the required {required:.4}")]
    InsufficientImprovement {
        candidate: f64,
        current: f64,
        required: f64,
    },
}

impl Rejection {
    /// Short machine-readable reason, used as a metrics label
    pub fn reason(&self) -> &'static str {
        match self {
            Rejection::Bounds(_) => "bounds",
            Rejection::AllocationSum { .. } => "allocation",
            Rejection::RiskCeiling { .. } => "risk_ceiling",
            Rejection::InsufficientImprovement { .. } => "improvement",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ValidationGate {
    space: SearchSpace,
    config: GateConfig,
}

impl ValidationGate {
    pub fn new(space: SearchSpace, config: GateConfig) -> Self {
        Self { space, config }
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Structural checks only: bounds, allocation sum, risk ceiling.
    pub fn check_parameters(&self, params: &ParameterSet) -> Result<(), Rejection> {
        self.space.check_bounds(params)?;

        // check_bounds guarantees the allocation triple is present when the space declares it
        if let Some(sum) = params.allocation_sum() {
            if (sum - 1.0).abs() > self.config.allocation_epsilon {
                return Err(Rejection::AllocationSum {
                    sum,
                    epsilon: self.config.allocation_epsilon,
                });
            }
        }

        if let Some(value) = params.get("max_daily_loss") {
            if value > self.config.max_daily_loss_cap {
                return Err(Rejection::RiskCeiling {
                    value,
                    cap: self.config.max_daily_loss_cap,
                });
            }
        }

        Ok(())
    }

    /// Admit `candidate` only if it is structurally valid and strictly beats
    /// `current_score` by the configured margin.
    pub fn admit(
        &self,
        candidate: &OptimizationCandidate,
        current_score: f64,
    ) -> Result<(), Rejection> {
        if let Err(rejection) = self.evaluate(candidate, current_score) {
            warn!(
                method = %candidate.method,
                score = candidate.score,
                current_score,
                reason = rejection.reason(),
                "Candidate rejected: {}",
                rejection
            );
            return Err(rejection);
        }
        debug!(
            method = %candidate.method,
            score = candidate.score,
            current_score,
            "Candidate admitted"
        );
        Ok(())
    }

    fn evaluate(
        &self,
        candidate: &OptimizationCandidate,
        current_score: f64,
    ) -> Result<(), Rejection> {
        self.check_parameters(&candidate.parameters)?;

        let required = current_score * (1.0 + self.config.min_improvement);
        if !(candidate.score > required) {
            return Err(Rejection::InsufficientImprovement {
                candidate: candidate.score,
                current: current_score,
                required,
            });
        }
        Ok(())
    }
}
