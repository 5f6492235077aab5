//! Trading signal emitted by an engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalSide {
    Buy,
    Sell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalStrength {
    Low,
    Medium,
    High,
}

impl SignalStrength {
    /// Tier for a confidence value in [0, 1]
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= 0.85 {
            SignalStrength::High
        } else if confidence >= 0.7 {
            SignalStrength::Medium
        } else {
            SignalStrength::Low
        }
    }
}

/// Immutable once constructed; the only way to build one is through an engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradingSignal {
    pub engine: String,
    #[serde(rename = "type")]
    pub side: SignalSide,
    pub symbol: String,
    pub confidence: f64,
    pub price: f64,
    pub reasoning: String,
    pub timestamp: DateTime<Utc>,
    pub expected_return: f64,
    pub strength: SignalStrength,
    pub timeframe: String,
}

/// What a strategy would like to emit, before cooldown gating.
///
/// Cheap to build; a [`TradingSignal`] is only materialized from it once the
/// engine's cooldown allows emission.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalIntent {
    pub side: SignalSide,
    pub confidence: f64,
    pub reasoning: String,
    pub expected_return: f64,
    pub strength: Option<SignalStrength>,
    pub timeframe: &'static str,
}

impl SignalIntent {
    pub fn new(side: SignalSide, confidence: f64, reasoning: impl Into<String>) -> Self {
        Self {
            side,
            confidence,
            reasoning: reasoning.into(),
            expected_return: 0.0,
            strength: None,
            timeframe: "1h",
        }
    }

    pub fn with_expected_return(mut self, expected_return: f64) -> Self {
        self.expected_return = expected_return;
        self
    }

    pub fn with_strength(mut self, strength: SignalStrength) -> Self {
        self.strength = Some(strength);
        self
    }

    pub fn with_timeframe(mut self, timeframe: &'static str) -> Self {
        self.timeframe = timeframe;
        self
    }
}
