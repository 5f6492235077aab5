//! Bounded Gaussian hill climbing around the incumbent

use super::{strategy_seed, Incumbent, SearchContext, SearchError, SearchStrategy};
use crate::models::{OptimizationCandidate, SearchMethod};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, StandardNormal};

#[derive(Debug, Clone, Copy)]
pub struct StochasticSearch {
    /// Perturbation standard deviation as a fraction of each parameter's range
    pub sigma: f64,
}

impl Default for StochasticSearch {
    fn default() -> Self {
        Self { sigma: 0.10 }
    }
}

impl SearchStrategy for StochasticSearch {
    fn method(&self) -> SearchMethod {
        SearchMethod::Stochastic
    }

    fn search(&self, ctx: &SearchContext) -> Result<OptimizationCandidate, SearchError> {
        let mut rng = StdRng::seed_from_u64(strategy_seed(ctx.seed, self.method()));
        let mut incumbent = Incumbent::new(self.method());

        let start = ctx.start();
        incumbent.offer(&start, ctx.evaluate(&start));
        let mut center = ctx.space.to_vector(&start)?;

        while incumbent.evaluated() < ctx.trials.max(1) && !ctx.should_stop() {
            let neighbour: Vec<f64> = ctx
                .space
                .descriptors()
                .iter()
                .zip(&center)
                .map(|(d, &v)| {
                    let z: f64 = StandardNormal.sample(&mut rng);
                    v + z * self.sigma * d.span()
                })
                .collect();
            let candidate = ctx.space.repair(&ctx.space.from_vector(&neighbour)?);
            if incumbent.offer(&candidate, ctx.evaluate(&candidate)) {
                center = ctx.space.to_vector(&candidate)?;
            }
        }

        incumbent.finish(ctx)
    }
}
