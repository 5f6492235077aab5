//! Projected finite-difference ascent from the applied parameters
//!
//! With a trained surrogate the ascent follows predicted realized
//! performance blended with the analytic value-accrual and risk components.
//! Without one it climbs the scoring function directly. Either way the
//! returned candidate carries its true score.

use super::{Incumbent, SearchContext, SearchError, SearchStrategy};
use crate::models::{OptimizationCandidate, ParameterSet, SearchMethod};
use crate::optimization::scoring::{risk_score, value_accrual_score};

#[derive(Debug, Clone, Copy)]
pub struct GradientSearch {
    /// Initial step length in unit-cube coordinates
    pub step: f64,
    pub decay: f64,
    /// Finite-difference offset in unit-cube coordinates
    pub epsilon: f64,
}

impl Default for GradientSearch {
    fn default() -> Self {
        Self {
            step: 0.05,
            decay: 0.97,
            epsilon: 0.01,
        }
    }
}

impl GradientSearch {
    fn objective(&self, ctx: &SearchContext, unit: &[f64], params: &ParameterSet) -> f64 {
        match &ctx.surrogate {
            Some(model) => {
                let w = ctx.scorer.weights();
                model.predict(unit) * w.profit
                    + value_accrual_score(params, &ctx.metrics) * w.value_accrual
                    + risk_score(params) * w.risk
            }
            None => ctx.evaluate(params),
        }
    }

    fn gradient(
        &self,
        ctx: &SearchContext,
        unit: &[f64],
        base: f64,
    ) -> Result<Vec<f64>, SearchError> {
        let mut grad = vec![0.0; unit.len()];
        let mut probe = unit.to_vec();
        for j in 0..unit.len() {
            let original = probe[j];
            let (forward, h) = if original + self.epsilon <= 1.0 {
                (original + self.epsilon, self.epsilon)
            } else {
                (original - self.epsilon, -self.epsilon)
            };
            probe[j] = forward;
            let params = ctx.space.from_unit_vector(&probe)?;
            let value = self.objective(ctx, &probe, &params);
            grad[j] = (value - base) / h;
            probe[j] = original;
        }
        Ok(grad)
    }
}

impl SearchStrategy for GradientSearch {
    fn method(&self) -> SearchMethod {
        SearchMethod::Gradient
    }

    fn search(&self, ctx: &SearchContext) -> Result<OptimizationCandidate, SearchError> {
        let start = ctx.start();
        let mut unit = ctx.space.to_unit_vector(&start)?;
        let mut params = start;
        let mut value = self.objective(ctx, &unit, &params);

        let mut best_params = params.clone();
        let mut best_value = value;
        let mut step = self.step;

        for _ in 0..ctx.trials.max(1) {
            if ctx.should_stop() {
                break;
            }
            let grad = self.gradient(ctx, &unit, value)?;
            let norm = grad.iter().map(|g| g * g).sum::<f64>().sqrt();
            if !norm.is_finite() || norm < 1e-12 {
                break;
            }

            let moved: Vec<f64> = unit
                .iter()
                .zip(&grad)
                .map(|(x, g)| (x + step * g / norm).clamp(0.0, 1.0))
                .collect();
            params = ctx.space.repair(&ctx.space.from_unit_vector(&moved)?);
            unit = ctx.space.to_unit_vector(&params)?;
            value = self.objective(ctx, &unit, &params);
            if value > best_value {
                best_value = value;
                best_params = params.clone();
            }
            step *= self.decay;
        }

        let mut incumbent = Incumbent::new(self.method());
        incumbent.offer(&best_params, ctx.evaluate(&best_params));
        incumbent.finish(ctx)
    }
}
