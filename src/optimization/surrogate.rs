//! Regression models over normalized parameter vectors
//!
//! [`RidgeSurrogate`] predicts realized performance from historical samples
//! and steers the gradient strategy. [`GaussianProcess`] is refit on every
//! trial of the Bayesian strategy and supplies the mean/uncertainty used for
//! expected improvement.

use super::linalg::{cholesky, cholesky_solve, forward_substitute};
use ndarray::{Array1, Array2};
use statrs::distribution::{Continuous, ContinuousCDF, Normal};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("need at least {needed} samples to train, have {got}")]
    InsufficientSamples { needed: usize, got: usize },

    #[error("sample has {got} features, model expects {expected}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("system is not positive definite")]
    Singular,

    #[error("training target contains non-finite values")]
    NonFinite,
}

fn to_matrix(xs: &[Vec<f64>]) -> Result<Array2<f64>, ModelError> {
    let d = xs.first().map(Vec::len).unwrap_or(0);
    let mut m = Array2::<f64>::zeros((xs.len(), d));
    for (i, row) in xs.iter().enumerate() {
        if row.len() != d {
            return Err(ModelError::DimensionMismatch {
                expected: d,
                got: row.len(),
            });
        }
        for (j, v) in row.iter().enumerate() {
            m[[i, j]] = *v;
        }
    }
    Ok(m)
}

/// L2-regularized linear model `y = w . x + b`
#[derive(Debug, Clone, PartialEq)]
pub struct RidgeSurrogate {
    weights: Array1<f64>,
    intercept: f64,
}

impl RidgeSurrogate {
    pub fn fit(
        xs: &[Vec<f64>],
        ys: &[f64],
        lambda: f64,
        min_samples: usize,
    ) -> Result<Self, ModelError> {
        let needed = min_samples.max(2);
        if xs.len() < needed || ys.len() != xs.len() {
            return Err(ModelError::InsufficientSamples {
                needed,
                got: xs.len().min(ys.len()),
            });
        }
        if ys.iter().any(|y| !y.is_finite()) {
            return Err(ModelError::NonFinite);
        }

        let x = to_matrix(xs)?;
        let y = Array1::from_vec(ys.to_vec());
        let n = x.nrows() as f64;
        let x_mean = x.sum_axis(ndarray::Axis(0)) / n;
        let y_mean = y.sum() / n;
        let xc = &x - &x_mean;
        let yc = &y - y_mean;

        let mut xtx = xc.t().dot(&xc);
        for i in 0..xtx.nrows() {
            xtx[[i, i]] += lambda.max(1e-9);
        }
        let xty = xc.t().dot(&yc);
        let l = cholesky(&xtx).ok_or(ModelError::Singular)?;
        let weights = cholesky_solve(&l, &xty);
        let intercept = y_mean - weights.dot(&x_mean);

        if weights.iter().any(|w| !w.is_finite()) || !intercept.is_finite() {
            return Err(ModelError::NonFinite);
        }
        Ok(Self { weights, intercept })
    }

    pub fn dimensions(&self) -> usize {
        self.weights.len()
    }

    pub fn predict(&self, x: &[f64]) -> f64 {
        self.weights
            .iter()
            .zip(x)
            .map(|(w, v)| w * v)
            .sum::<f64>()
            + self.intercept
    }
}

/// Zero-mean GP with an RBF kernel over unit-cube inputs
#[derive(Debug, Clone)]
pub struct GaussianProcess {
    xs: Vec<Vec<f64>>,
    alpha: Array1<f64>,
    chol: Array2<f64>,
    y_mean: f64,
    y_scale: f64,
    length_scale: f64,
}

impl GaussianProcess {
    const NOISE: f64 = 1e-6;

    pub fn fit(xs: &[Vec<f64>], ys: &[f64], length_scale: f64) -> Result<Self, ModelError> {
        if xs.is_empty() || xs.len() != ys.len() {
            return Err(ModelError::InsufficientSamples {
                needed: 1,
                got: xs.len().min(ys.len()),
            });
        }
        if ys.iter().any(|y| !y.is_finite()) {
            return Err(ModelError::NonFinite);
        }

        let expected = xs[0].len();
        if let Some(bad) = xs.iter().find(|x| x.len() != expected) {
            return Err(ModelError::DimensionMismatch {
                expected,
                got: bad.len(),
            });
        }
        let n = ys.len();
        let y_mean = ys.iter().sum::<f64>() / n as f64;
        let variance = ys.iter().map(|y| (y - y_mean).powi(2)).sum::<f64>() / n as f64;
        let y_scale = if variance > 0.0 { variance.sqrt() } else { 1.0 };
        let y = Array1::from_iter(ys.iter().map(|v| (v - y_mean) / y_scale));

        let mut k = Array2::<f64>::zeros((n, n));
        for i in 0..n {
            for j in 0..=i {
                let v = rbf(&xs[i], &xs[j], length_scale);
                k[[i, j]] = v;
                k[[j, i]] = v;
            }
            k[[i, i]] += Self::NOISE;
        }
        let chol = cholesky(&k).ok_or(ModelError::Singular)?;
        let alpha = cholesky_solve(&chol, &y);

        Ok(Self {
            xs: xs.to_vec(),
            alpha,
            chol,
            y_mean,
            y_scale,
            length_scale,
        })
    }

    /// Posterior mean and standard deviation at `x`, in the target's units
    pub fn predict(&self, x: &[f64]) -> (f64, f64) {
        let k_star = Array1::from_iter(self.xs.iter().map(|row| rbf(row, x, self.length_scale)));
        let mean = k_star.dot(&self.alpha);
        let v = forward_substitute(&self.chol, &k_star);
        let variance = (1.0 - v.dot(&v)).max(0.0);
        (
            mean * self.y_scale + self.y_mean,
            variance.sqrt() * self.y_scale,
        )
    }
}

fn rbf(a: &[f64], b: &[f64], length_scale: f64) -> f64 {
    let sq: f64 = a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum();
    (-sq / (2.0 * length_scale * length_scale)).exp()
}

/// Expected improvement of a Gaussian posterior over `best`, for maximization
pub fn expected_improvement(mean: f64, std: f64, best: f64, xi: f64) -> f64 {
    let gain = mean - best - xi;
    if std <= 1e-12 {
        return gain.max(0.0);
    }
    let Ok(standard) = Normal::new(0.0, 1.0) else {
        return gain.max(0.0);
    };
    let z = gain / std;
    gain * standard.cdf(z) + std * standard.pdf(z)
}
