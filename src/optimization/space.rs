//! Parameter search space: bounds, vector conversion and repair

use crate::models::{ParameterDescriptor, ParameterGroup, ParameterSet, ALLOCATION_PARAMETERS};
use rand::Rng;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpaceError {
    #[error("parameter '{parameter}' = {value} is outside [{lower}, {upper}]")]
    OutOfBounds {
        parameter: String,
        value: f64,
        lower: f64,
        upper: f64,
    },

    #[error("parameter '{0}' is missing")]
    MissingParameter(String),

    #[error("parameter '{0}' is not part of the search space")]
    UnknownParameter(String),

    #[error("vector has {got} dimensions, search space has {expected}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("invalid descriptor: {0}")]
    InvalidDescriptor(String),
}

/// Live defaults applied when no stored parameter set exists
const DEFAULT_VALUES: &[(&str, f64)] = &[
    ("sniper_min_liquidity", 10.0),
    ("sniper_max_buy", 1.0),
    ("sniper_reaction_time", 2000.0),
    ("sniper_confidence_threshold", 0.75),
    ("momentum_threshold", 0.10),
    ("volume_spike_threshold", 2.0),
    ("rsi_oversold", 30.0),
    ("rsi_overbought", 70.0),
    ("reentry_confidence_threshold", 0.70),
    ("ai_min_confidence", 0.70),
    ("sentiment_weight", 0.30),
    ("technical_weight", 0.70),
    ("social_signals_weight", 0.20),
    ("max_position_size", 5.0),
    ("stop_loss_percentage", 0.15),
    ("take_profit_percentage", 0.25),
    ("max_daily_loss", 0.05),
    ("max_open_positions", 5.0),
    ("commission_rate", 0.015),
    ("treasury_allocation", 0.70),
    ("burn_allocation", 0.20),
    ("buyback_allocation", 0.10),
    ("burn_threshold", 1000.0),
    ("priority_fee", 0.01),
    ("slippage_tolerance", 0.01),
    ("retry_attempts", 3.0),
    ("timeout_seconds", 15.0),
];

#[derive(Debug, Clone)]
pub struct SearchSpace {
    descriptors: Vec<ParameterDescriptor>,
    index: HashMap<String, usize>,
}

impl SearchSpace {
    pub fn new(descriptors: Vec<ParameterDescriptor>) -> Result<Self, SpaceError> {
        let mut index = HashMap::with_capacity(descriptors.len());
        for (i, d) in descriptors.iter().enumerate() {
            if !(d.lower.is_finite() && d.upper.is_finite()) || d.lower > d.upper {
                return Err(SpaceError::InvalidDescriptor(format!(
                    "{} has bounds [{}, {}]",
                    d.name, d.lower, d.upper
                )));
            }
            if index.insert(d.name.clone(), i).is_some() {
                return Err(SpaceError::InvalidDescriptor(format!(
                    "{} is declared twice",
                    d.name
                )));
            }
        }
        Ok(Self { descriptors, index })
    }

    pub fn descriptors(&self) -> &[ParameterDescriptor] {
        &self.descriptors
    }

    pub fn descriptor(&self, name: &str) -> Option<&ParameterDescriptor> {
        self.index.get(name).map(|&i| &self.descriptors[i])
    }

    pub fn dimensions(&self) -> usize {
        self.descriptors.len()
    }

    /// Every declared parameter present, in bounds, and nothing undeclared.
    ///
    /// The first violation in declaration order is reported.
    pub fn check_bounds(&self, set: &ParameterSet) -> Result<(), SpaceError> {
        for d in &self.descriptors {
            let value = set
                .get(&d.name)
                .ok_or_else(|| SpaceError::MissingParameter(d.name.clone()))?;
            if !d.contains(value) {
                return Err(SpaceError::OutOfBounds {
                    parameter: d.name.clone(),
                    value,
                    lower: d.lower,
                    upper: d.upper,
                });
            }
        }
        if let Some((name, _)) = set.iter().find(|(name, _)| !self.index.contains_key(*name)) {
            return Err(SpaceError::UnknownParameter(name.to_string()));
        }
        Ok(())
    }

    /// Flat vector in descriptor order
    pub fn to_vector(&self, set: &ParameterSet) -> Result<Vec<f64>, SpaceError> {
        self.descriptors
            .iter()
            .map(|d| {
                set.get(&d.name)
                    .ok_or_else(|| SpaceError::MissingParameter(d.name.clone()))
            })
            .collect()
    }

    /// Named set from a flat vector; values are clamped and integers rounded.
    pub fn from_vector(&self, vector: &[f64]) -> Result<ParameterSet, SpaceError> {
        self.ensure_dimensions(vector)?;
        Ok(ParameterSet::from_pairs(
            self.descriptors
                .iter()
                .zip(vector)
                .map(|(d, &v)| (d.name.clone(), d.clamp(v))),
        ))
    }

    /// Vector with every coordinate scaled into [0, 1]
    pub fn to_unit_vector(&self, set: &ParameterSet) -> Result<Vec<f64>, SpaceError> {
        let raw = self.to_vector(set)?;
        Ok(self
            .descriptors
            .iter()
            .zip(raw)
            .map(|(d, v)| d.normalize(v))
            .collect())
    }

    pub fn from_unit_vector(&self, unit: &[f64]) -> Result<ParameterSet, SpaceError> {
        self.ensure_dimensions(unit)?;
        Ok(ParameterSet::from_pairs(
            self.descriptors
                .iter()
                .zip(unit)
                .map(|(d, &u)| (d.name.clone(), d.denormalize(u))),
        ))
    }

    pub fn defaults(&self) -> ParameterSet {
        let known: HashMap<&str, f64> = DEFAULT_VALUES.iter().copied().collect();
        let set = ParameterSet::from_pairs(self.descriptors.iter().map(|d| {
            let value = known
                .get(d.name.as_str())
                .copied()
                .unwrap_or(d.lower + d.span() / 2.0);
            (d.name.clone(), d.clamp(value))
        }));
        self.repair(&set)
    }

    /// Closest valid set: missing values take defaults, everything is
    /// clamped, and the allocation triple is projected onto sum = 1.
    pub fn repair(&self, set: &ParameterSet) -> ParameterSet {
        let mut repaired = ParameterSet::from_pairs(self.descriptors.iter().map(|d| {
            let value = set
                .get(&d.name)
                .or_else(|| DEFAULT_VALUES.iter().find(|(n, _)| *n == d.name).map(|(_, v)| *v))
                .unwrap_or(d.lower + d.span() / 2.0);
            (d.name.clone(), d.clamp(value))
        }));
        self.project_allocations(&mut repaired);
        repaired
    }

    /// Uniform sample from the space, repaired to satisfy the allocation constraint
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> ParameterSet {
        let set = ParameterSet::from_pairs(self.descriptors.iter().map(|d| {
            let value = if d.span() > 0.0 {
                rng.gen_range(d.lower..=d.upper)
            } else {
                d.lower
            };
            (d.name.clone(), d.clamp(value))
        }));
        self.repair(&set)
    }

    /// Shift the allocation fractions by a common offset (clamped per bound)
    /// so they sum to one. Left untouched when the bounds make that impossible.
    fn project_allocations(&self, set: &mut ParameterSet) {
        let mut parts = Vec::with_capacity(ALLOCATION_PARAMETERS.len());
        for name in ALLOCATION_PARAMETERS {
            match (self.descriptor(name), set.get(name)) {
                (Some(d), Some(v)) => parts.push((d, v)),
                _ => return,
            }
        }

        let lo_sum: f64 = parts.iter().map(|(d, _)| d.lower).sum();
        let hi_sum: f64 = parts.iter().map(|(d, _)| d.upper).sum();
        if lo_sum > 1.0 || hi_sum < 1.0 {
            return;
        }

        let total = |shift: f64| -> f64 {
            parts
                .iter()
                .map(|(d, v)| (v + shift).clamp(d.lower, d.upper))
                .sum()
        };

        let mut low = parts.iter().map(|(d, v)| d.lower - v).fold(f64::MAX, f64::min);
        let mut high = parts.iter().map(|(d, v)| d.upper - v).fold(f64::MIN, f64::max);
        for _ in 0..100 {
            let mid = (low + high) / 2.0;
            if total(mid) < 1.0 {
                low = mid;
            } else {
                high = mid;
            }
        }
        let shift = (low + high) / 2.0;
        for (d, v) in parts {
            set.insert(d.name.clone(), (v + shift).clamp(d.lower, d.upper));
        }
    }

    fn ensure_dimensions(&self, vector: &[f64]) -> Result<(), SpaceError> {
        if vector.len() != self.descriptors.len() {
            return Err(SpaceError::DimensionMismatch {
                expected: self.descriptors.len(),
                got: vector.len(),
            });
        }
        Ok(())
    }
}

impl Default for SearchSpace {
    fn default() -> Self {
        use ParameterGroup::*;
        let c = ParameterDescriptor::continuous;
        let i = ParameterDescriptor::integer;
        let descriptors = vec![
            c("sniper_min_liquidity", 5.0, 50.0, Sniper),
            c("sniper_max_buy", 0.5, 5.0, Sniper),
            i("sniper_reaction_time", 1000, 5000, Sniper),
            c("sniper_confidence_threshold", 0.6, 0.95, Sniper),
            c("momentum_threshold", 0.05, 0.30, Reentry),
            c("volume_spike_threshold", 1.5, 5.0, Reentry),
            i("rsi_oversold", 20, 40, Reentry),
            i("rsi_overbought", 60, 80, Reentry),
            c("reentry_confidence_threshold", 0.5, 0.9, Reentry),
            c("ai_min_confidence", 0.6, 0.9, AiSignal),
            c("sentiment_weight", 0.1, 0.5, AiSignal),
            c("technical_weight", 0.5, 0.9, AiSignal),
            c("social_signals_weight", 0.1, 0.4, AiSignal),
            c("max_position_size", 1.0, 10.0, Risk),
            c("stop_loss_percentage", 0.05, 0.25, Risk),
            c("take_profit_percentage", 0.15, 0.50, Risk),
            c("max_daily_loss", 0.01, 0.08, Risk),
            i("max_open_positions", 3, 15, Risk),
            c("commission_rate", 0.010, 0.025, ValueAccrual),
            c("treasury_allocation", 0.60, 0.80, ValueAccrual),
            c("burn_allocation", 0.15, 0.30, ValueAccrual),
            c("buyback_allocation", 0.05, 0.25, ValueAccrual),
            c("burn_threshold", 500.0, 2000.0, ValueAccrual),
            c("priority_fee", 0.001, 0.05, Execution),
            c("slippage_tolerance", 0.005, 0.03, Execution),
            i("retry_attempts", 1, 5, Execution),
            i("timeout_seconds", 5, 30, Execution),
        ];
        let index = descriptors
            .iter()
            .enumerate()
            .map(|(i, d)| (d.name.clone(), i))
            .collect();
        Self { descriptors, index }
    }
}
