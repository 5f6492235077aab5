//! Typed parameter descriptors and parameter sets

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Parameters whose values are fractions of one commission pool.
pub const ALLOCATION_PARAMETERS: [&str; 3] =
    ["treasury_allocation", "burn_allocation", "buyback_allocation"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterKind {
    Continuous,
    Integer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParameterGroup {
    Sniper,
    Reentry,
    AiSignal,
    Risk,
    ValueAccrual,
    Execution,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDescriptor {
    pub name: String,
    pub lower: f64,
    pub upper: f64,
    pub kind: ParameterKind,
    pub group: ParameterGroup,
}

impl ParameterDescriptor {
    pub fn continuous(name: &str, lower: f64, upper: f64, group: ParameterGroup) -> Self {
        Self {
            name: name.to_string(),
            lower,
            upper,
            kind: ParameterKind::Continuous,
            group,
        }
    }

    pub fn integer(name: &str, lower: i64, upper: i64, group: ParameterGroup) -> Self {
        Self {
            name: name.to_string(),
            lower: lower as f64,
            upper: upper as f64,
            kind: ParameterKind::Integer,
            group,
        }
    }

    pub fn span(&self) -> f64 {
        self.upper - self.lower
    }

    pub fn contains(&self, value: f64) -> bool {
        value.is_finite() && value >= self.lower && value <= self.upper
    }

    /// Clamp into bounds, rounding integer parameters. Non-finite input maps to the midpoint.
    pub fn clamp(&self, value: f64) -> f64 {
        let value = if value.is_finite() {
            value.clamp(self.lower, self.upper)
        } else {
            self.lower + self.span() / 2.0
        };
        match self.kind {
            ParameterKind::Continuous => value,
            ParameterKind::Integer => value.round().clamp(self.lower, self.upper),
        }
    }

    /// Position of `value` inside the bounds, in [0, 1]
    pub fn normalize(&self, value: f64) -> f64 {
        if self.span() <= 0.0 {
            return 0.0;
        }
        ((value - self.lower) / self.span()).clamp(0.0, 1.0)
    }

    pub fn denormalize(&self, unit: f64) -> f64 {
        self.clamp(self.lower + unit.clamp(0.0, 1.0) * self.span())
    }
}

/// Mapping from parameter name to value.
///
/// Ordered so that serialization and iteration are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterSet {
    values: BTreeMap<String, f64>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        Self {
            values: pairs.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    pub fn get_or(&self, name: &str, default: f64) -> f64 {
        self.get(name).filter(|v| v.is_finite()).unwrap_or(default)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: f64) -> Option<f64> {
        self.values.insert(name.into(), value)
    }

    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.insert(name, value);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Sum of treasury, burn and buyback fractions, if all three are present
    pub fn allocation_sum(&self) -> Option<f64> {
        ALLOCATION_PARAMETERS
            .iter()
            .map(|name| self.get(name))
            .sum::<Option<f64>>()
    }
}
