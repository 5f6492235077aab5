//! Market snapshot consumed by every engine during a tick

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub symbol: String,
    pub price: f64,
    pub volume: f64,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_24h: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<f64>,
    /// Best quote for the same symbol on an alternate venue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_price: Option<f64>,
}

impl MarketSnapshot {
    pub fn new(
        symbol: impl Into<String>,
        price: f64,
        volume: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            price,
            volume,
            timestamp,
            change_24h: None,
            market_cap: None,
            reference_price: None,
        }
    }

    pub fn with_change_24h(mut self, change: f64) -> Self {
        self.change_24h = Some(change);
        self
    }

    pub fn with_market_cap(mut self, market_cap: f64) -> Self {
        self.market_cap = Some(market_cap);
        self
    }

    pub fn with_reference_price(mut self, price: f64) -> Self {
        self.reference_price = Some(price);
        self
    }

    /// Copy with non-finite or negative fields clamped.
    ///
    /// Price and volume fall back to zero; optional fields that are not
    /// finite are dropped, and a non-positive reference price is treated as
    /// missing.
    pub fn sanitized(&self) -> Self {
        let clamp = |v: f64| if v.is_finite() && v > 0.0 { v } else { 0.0 };
        Self {
            symbol: self.symbol.clone(),
            price: clamp(self.price),
            volume: clamp(self.volume),
            timestamp: self.timestamp,
            change_24h: self.change_24h.filter(|c| c.is_finite()),
            market_cap: self.market_cap.filter(|m| m.is_finite() && *m >= 0.0),
            reference_price: self.reference_price.filter(|p| p.is_finite() && *p > 0.0),
        }
    }

    pub fn has_price(&self) -> bool {
        self.price.is_finite() && self.price > 0.0
    }
}
