//! Differential evolution, rand/1/bin, over the unit cube

use super::{strategy_seed, Incumbent, SearchContext, SearchError, SearchStrategy};
use crate::models::{OptimizationCandidate, ParameterSet, SearchMethod};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Debug, Clone, Copy)]
pub struct EvolutionarySearch {
    pub population: usize,
    pub mutation: f64,
    pub crossover: f64,
}

impl Default for EvolutionarySearch {
    fn default() -> Self {
        Self {
            population: 15,
            mutation: 0.8,
            crossover: 0.7,
        }
    }
}

struct Member {
    unit: Vec<f64>,
    params: ParameterSet,
    score: f64,
}

impl EvolutionarySearch {
    /// Three distinct member indices, none equal to `target`
    fn pick_three(rng: &mut StdRng, size: usize, target: usize) -> [usize; 3] {
        let mut picked = [target; 3];
        let mut n = 0;
        while n < 3 {
            let idx = rng.gen_range(0..size);
            if idx != target && !picked[..n].contains(&idx) {
                picked[n] = idx;
                n += 1;
            }
        }
        picked
    }
}

impl SearchStrategy for EvolutionarySearch {
    fn method(&self) -> SearchMethod {
        SearchMethod::Evolutionary
    }

    fn search(&self, ctx: &SearchContext) -> Result<OptimizationCandidate, SearchError> {
        let mut rng = StdRng::seed_from_u64(strategy_seed(ctx.seed, self.method()));
        let mut incumbent = Incumbent::new(self.method());
        let budget = ctx.trials.max(1);
        let size = self.population.max(4);

        let mut population: Vec<Member> = Vec::with_capacity(size);
        while population.len() < size && incumbent.evaluated() < budget && !ctx.should_stop() {
            let params = if population.is_empty() {
                ctx.start()
            } else {
                ctx.space.sample(&mut rng)
            };
            let score = ctx.evaluate(&params);
            incumbent.offer(&params, score);
            population.push(Member {
                unit: ctx.space.to_unit_vector(&params)?,
                params,
                score,
            });
        }

        let dims = ctx.space.dimensions();
        'generations: while population.len() >= 4 {
            for target in 0..population.len() {
                if incumbent.evaluated() >= budget || ctx.should_stop() {
                    break 'generations;
                }
                let [a, b, c] = Self::pick_three(&mut rng, population.len(), target);
                let forced = rng.gen_range(0..dims);
                let trial: Vec<f64> = (0..dims)
                    .map(|j| {
                        if j == forced || rng.gen::<f64>() < self.crossover {
                            let v = population[a].unit[j]
                                + self.mutation * (population[b].unit[j] - population[c].unit[j]);
                            v.clamp(0.0, 1.0)
                        } else {
                            population[target].unit[j]
                        }
                    })
                    .collect();

                let params = ctx.space.repair(&ctx.space.from_unit_vector(&trial)?);
                let score = ctx.evaluate(&params);
                incumbent.offer(&params, score);
                if score >= population[target].score {
                    population[target] = Member {
                        unit: ctx.space.to_unit_vector(&params)?,
                        params,
                        score,
                    };
                }
            }
        }

        incumbent.finish(ctx)
    }
}
