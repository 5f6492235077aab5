//! Parameter optimization: search space, scoring, search, gate and rollout

pub mod history;
pub mod linalg;
pub mod optimizer;
pub mod rollout;
pub mod scoring;
pub mod search;
pub mod service;
pub mod space;
pub mod surrogate;
pub mod validation;

pub use history::{OptimizationHistory, SampleLog};
pub use optimizer::{select_best, MultiAlgorithmOptimizer, OptimizerError};
pub use rollout::{Rollout, RolloutError};
pub use scoring::{realized_score, ScoreBreakdown, Scorer};
pub use search::{SearchContext, SearchError, SearchStrategy};
pub use service::{CycleError, CycleOutcome, OptimizationService};
pub use space::{SearchSpace, SpaceError};
pub use surrogate::{GaussianProcess, ModelError, RidgeSurrogate};
pub use validation::{Rejection, ValidationGate};
