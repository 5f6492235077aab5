//! Gaussian-process Bayesian optimization with expected improvement

use super::{strategy_seed, Incumbent, SearchContext, SearchError, SearchStrategy};
use crate::models::{OptimizationCandidate, SearchMethod};
use crate::optimization::surrogate::{expected_improvement, GaussianProcess};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

#[derive(Debug, Clone, Copy)]
pub struct BayesianSearch {
    /// Random evaluations before the GP takes over
    pub initial_points: usize,
    /// Random proposals scored by expected improvement per trial
    pub proposal_pool: usize,
    pub length_scale: f64,
    /// Exploration margin, in score points
    pub xi: f64,
}

impl Default for BayesianSearch {
    fn default() -> Self {
        Self {
            initial_points: 10,
            proposal_pool: 256,
            length_scale: 0.5,
            xi: 0.01,
        }
    }
}

impl SearchStrategy for BayesianSearch {
    fn method(&self) -> SearchMethod {
        SearchMethod::Bayesian
    }

    fn search(&self, ctx: &SearchContext) -> Result<OptimizationCandidate, SearchError> {
        let mut rng = StdRng::seed_from_u64(strategy_seed(ctx.seed, self.method()));
        let mut incumbent = Incumbent::new(self.method());
        let budget = ctx.trials.max(1);

        let mut xs: Vec<Vec<f64>> = Vec::with_capacity(budget);
        let mut ys: Vec<f64> = Vec::with_capacity(budget);

        while incumbent.evaluated() < budget && !ctx.should_stop() {
            let params = if xs.is_empty() {
                ctx.start()
            } else if xs.len() < self.initial_points {
                ctx.space.sample(&mut rng)
            } else {
                match GaussianProcess::fit(&xs, &ys, self.length_scale) {
                    Ok(gp) => {
                        let best = incumbent.best_score().unwrap_or(f64::NEG_INFINITY);
                        let mut chosen = None;
                        let mut chosen_ei = f64::NEG_INFINITY;
                        for _ in 0..self.proposal_pool.max(1) {
                            let proposal = ctx.space.sample(&mut rng);
                            let unit = ctx.space.to_unit_vector(&proposal)?;
                            let (mean, std) = gp.predict(&unit);
                            let ei = expected_improvement(mean, std, best, self.xi);
                            if ei > chosen_ei {
                                chosen_ei = ei;
                                chosen = Some(proposal);
                            }
                        }
                        match chosen {
                            Some(p) => p,
                            None => ctx.space.sample(&mut rng),
                        }
                    }
                    Err(err) => {
                        debug!(error = %err, "GP fit failed, sampling at random");
                        ctx.space.sample(&mut rng)
                    }
                }
            };

            let score = ctx.evaluate(&params);
            incumbent.offer(&params, score);
            if score.is_finite() {
                xs.push(ctx.space.to_unit_vector(&params)?);
                ys.push(score);
            }
        }

        incumbent.finish(ctx)
    }
}
