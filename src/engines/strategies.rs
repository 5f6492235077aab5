//! The six built-in strategies
//!
//! Each keeps a bounded rolling window of prices (and volumes where needed)
//! built from the snapshots it is shown, and reads its thresholds from the
//! live parameter set on every assessment.

use super::SignalStrategy;
use crate::error::EngineError;
use crate::indicators::{
    bollinger_zscore, calculate_rsi, drawdown_from_peak, math, sma_momentum,
};
use crate::models::{EngineKind, MarketSnapshot, ParameterSet, SignalIntent, SignalSide};
use chrono::Duration;
use std::collections::VecDeque;

const HISTORY_CAPACITY: usize = 120;
const FAST_PERIOD: usize = 5;
const SLOW_PERIOD: usize = 20;
const RSI_PERIOD: usize = 14;
const VOLUME_WINDOW: usize = 20;
const SCALPER_WINDOW: usize = 20;
const SCALPER_ZSCORE: f64 = 1.5;
const GUARDIAN_WINDOW: usize = 60;

/// All six strategies in registration order
pub fn default_strategies() -> Vec<Box<dyn SignalStrategy>> {
    vec![
        Box::new(SniperStrategy::default()),
        Box::new(ReentryStrategy::default()),
        Box::new(AiSignalStrategy::default()),
        Box::new(GuardianStrategy::default()),
        Box::new(ScalperStrategy::default()),
        Box::new(ArbitrageStrategy::default()),
    ]
}

#[derive(Debug, Clone)]
struct Window {
    values: VecDeque<f64>,
    capacity: usize,
}

impl Window {
    fn new(capacity: usize) -> Self {
        Self {
            values: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    fn push(&mut self, value: f64) {
        if self.values.len() == self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(value);
    }

    fn as_vec(&self) -> Vec<f64> {
        self.values.iter().copied().collect()
    }

    fn len(&self) -> usize {
        self.values.len()
    }
}

impl Default for Window {
    fn default() -> Self {
        Self::new(HISTORY_CAPACITY)
    }
}

/// Catches fresh liquidity: a volume burst far above the recent mean.
#[derive(Debug, Clone, Default)]
pub struct SniperStrategy {
    volumes: Window,
}

impl SignalStrategy for SniperStrategy {
    fn kind(&self) -> EngineKind {
        EngineKind::Sniper
    }

    fn cooldown(&self) -> Duration {
        Duration::seconds(30)
    }

    fn assess(
        &mut self,
        snapshot: &MarketSnapshot,
        params: &ParameterSet,
    ) -> Result<Option<SignalIntent>, EngineError> {
        let baseline = math::sma(&self.volumes.as_vec(), VOLUME_WINDOW.min(self.volumes.len()));
        self.volumes.push(snapshot.volume);

        let Some(baseline) = baseline.filter(|b| *b > 0.0) else {
            return Ok(None);
        };
        if !snapshot.has_price() {
            return Ok(None);
        }

        let spike_threshold = params.get_or("volume_spike_threshold", 2.0);
        let min_volume = params.get_or("sniper_min_liquidity", 10.0) * 100_000.0;
        let ratio = snapshot.volume / baseline;
        if ratio < spike_threshold || snapshot.volume < min_volume {
            return Ok(None);
        }

        let confidence = 1.0 - spike_threshold / (2.0 * ratio);
        if confidence < params.get_or("sniper_confidence_threshold", 0.75) {
            return Ok(None);
        }

        let take_profit = params.get_or("take_profit_percentage", 0.25);
        Ok(Some(
            SignalIntent::new(
                SignalSide::Buy,
                confidence,
                format!("Volume spike {ratio:.1}x the {VOLUME_WINDOW}-tick mean"),
            )
            .with_expected_return(take_profit * confidence)
            .with_timeframe("5m"),
        ))
    }
}

/// Re-enters after a pullback once short-term momentum turns back up.
#[derive(Debug, Clone, Default)]
pub struct ReentryStrategy {
    prices: Window,
}

impl SignalStrategy for ReentryStrategy {
    fn kind(&self) -> EngineKind {
        EngineKind::Reentry
    }

    fn cooldown(&self) -> Duration {
        Duration::seconds(60)
    }

    fn assess(
        &mut self,
        snapshot: &MarketSnapshot,
        params: &ParameterSet,
    ) -> Result<Option<SignalIntent>, EngineError> {
        if !snapshot.has_price() {
            return Ok(None);
        }
        self.prices.push(snapshot.price);
        let prices = self.prices.as_vec();

        let (Some(momentum), Some(rsi)) = (
            sma_momentum(&prices, FAST_PERIOD, SLOW_PERIOD),
            calculate_rsi(&prices, RSI_PERIOD),
        ) else {
            return Ok(None);
        };

        let required = params.get_or("momentum_threshold", 0.10) / 10.0;
        let oversold = params.get_or("rsi_oversold", 30.0);
        let overbought = params.get_or("rsi_overbought", 70.0);
        if momentum < required || rsi <= oversold || rsi >= overbought || required <= 0.0 {
            return Ok(None);
        }

        let strength = (momentum / required).min(2.0);
        let headroom = (overbought - rsi) / (overbought - oversold);
        let confidence = (0.55 + 0.15 * strength + 0.1 * headroom).min(0.95);
        if confidence < params.get_or("reentry_confidence_threshold", 0.70) {
            return Ok(None);
        }

        Ok(Some(
            SignalIntent::new(
                SignalSide::Buy,
                confidence,
                format!(
                    "SMA{FAST_PERIOD} {:.2}% above SMA{SLOW_PERIOD}, RSI recovered to {rsi:.1}",
                    momentum * 100.0
                ),
            )
            .with_expected_return(momentum * 2.0)
            .with_timeframe("15m"),
        ))
    }
}

/// Blends a technical read with a sentiment proxy.
#[derive(Debug, Clone, Default)]
pub struct AiSignalStrategy {
    prices: Window,
    /// (technical, sentiment) weights normalized to sum to one
    weights: Option<(f64, f64)>,
}

impl AiSignalStrategy {
    fn normalized_weights(params: &ParameterSet) -> (f64, f64) {
        let technical = params.get_or("technical_weight", 0.7).max(0.0);
        let sentiment = params.get_or("sentiment_weight", 0.3).max(0.0);
        let total = technical + sentiment;
        if total <= 0.0 {
            (0.5, 0.5)
        } else {
            (technical / total, sentiment / total)
        }
    }
}

impl SignalStrategy for AiSignalStrategy {
    fn kind(&self) -> EngineKind {
        EngineKind::AiSignal
    }

    fn cooldown(&self) -> Duration {
        Duration::seconds(45)
    }

    fn assess(
        &mut self,
        snapshot: &MarketSnapshot,
        params: &ParameterSet,
    ) -> Result<Option<SignalIntent>, EngineError> {
        if !snapshot.has_price() {
            return Ok(None);
        }
        self.prices.push(snapshot.price);
        let prices = self.prices.as_vec();

        let (Some(momentum), Some(rsi)) = (
            sma_momentum(&prices, FAST_PERIOD, SLOW_PERIOD),
            calculate_rsi(&prices, RSI_PERIOD),
        ) else {
            return Ok(None);
        };

        let technical = 0.5 * (momentum * 20.0).tanh() + 0.5 * (rsi - 50.0) / 50.0;
        let sentiment = (snapshot.change_24h.unwrap_or(0.0) / 10.0).tanh();
        let (w_technical, w_sentiment) = *self
            .weights
            .get_or_insert_with(|| Self::normalized_weights(params));
        let combined = w_technical * technical + w_sentiment * sentiment;

        let confidence = 0.5 + combined.abs() / 2.0;
        if combined == 0.0 || confidence < params.get_or("ai_min_confidence", 0.7) {
            return Ok(None);
        }

        let side = if combined > 0.0 {
            SignalSide::Buy
        } else {
            SignalSide::Sell
        };
        Ok(Some(
            SignalIntent::new(
                side,
                confidence,
                format!(
                    "Technical {technical:+.2} (RSI {rsi:.1}), \
                     sentiment {sentiment:+.2}, blended {combined:+.2}"
                ),
            )
            .with_expected_return(combined.abs() * params.get_or("take_profit_percentage", 0.25))
            .with_timeframe("1h"),
        ))
    }

    fn on_parameters_updated(&mut self, params: &ParameterSet) {
        self.weights = Some(Self::normalized_weights(params));
    }
}

/// Protective exit when price falls too far from its recent peak.
#[derive(Debug, Clone)]
pub struct GuardianStrategy {
    prices: Window,
}

impl Default for GuardianStrategy {
    fn default() -> Self {
        Self {
            prices: Window::new(GUARDIAN_WINDOW),
        }
    }
}

impl SignalStrategy for GuardianStrategy {
    fn kind(&self) -> EngineKind {
        EngineKind::Guardian
    }

    fn cooldown(&self) -> Duration {
        Duration::seconds(120)
    }

    fn assess(
        &mut self,
        snapshot: &MarketSnapshot,
        params: &ParameterSet,
    ) -> Result<Option<SignalIntent>, EngineError> {
        if !snapshot.has_price() {
            return Ok(None);
        }
        self.prices.push(snapshot.price);

        let Some(drawdown) = drawdown_from_peak(&self.prices.as_vec()) else {
            return Ok(None);
        };
        let stop_loss = params.get_or("stop_loss_percentage", 0.15);
        let trigger = stop_loss / 2.0;
        if drawdown < trigger || trigger <= 0.0 {
            return Ok(None);
        }

        let confidence = (0.6 + drawdown / stop_loss * 0.4).min(1.0);
        Ok(Some(
            SignalIntent::new(
                SignalSide::Sell,
                confidence,
                format!(
                    "Drawdown {:.1}% from peak breaches guard at {:.1}%",
                    drawdown * 100.0,
                    trigger * 100.0
                ),
            )
            .with_expected_return(drawdown)
            .with_timeframe("15m"),
        ))
    }
}

/// Fades short-lived deviations from the rolling mean.
#[derive(Debug, Clone, Default)]
pub struct ScalperStrategy {
    prices: Window,
}

impl SignalStrategy for ScalperStrategy {
    fn kind(&self) -> EngineKind {
        EngineKind::Scalper
    }

    fn cooldown(&self) -> Duration {
        Duration::seconds(15)
    }

    fn assess(
        &mut self,
        snapshot: &MarketSnapshot,
        _params: &ParameterSet,
    ) -> Result<Option<SignalIntent>, EngineError> {
        if !snapshot.has_price() {
            return Ok(None);
        }
        self.prices.push(snapshot.price);
        let prices = self.prices.as_vec();

        let (Some(z), Some(mean)) = (
            bollinger_zscore(&prices, SCALPER_WINDOW),
            math::sma(&prices, SCALPER_WINDOW),
        ) else {
            return Ok(None);
        };
        if z.abs() <= SCALPER_ZSCORE {
            return Ok(None);
        }

        let side = if z < 0.0 {
            SignalSide::Buy
        } else {
            SignalSide::Sell
        };
        let confidence = (0.55 + (z.abs() - SCALPER_ZSCORE) * 0.2).min(0.9);
        Ok(Some(
            SignalIntent::new(
                side,
                confidence,
                format!("Price {z:+.2} sigma from the {SCALPER_WINDOW}-tick mean"),
            )
                .with_expected_return(((mean - snapshot.price) / snapshot.price).abs())
                .with_timeframe("1m"),
        ))
    }
}

/// Trades the spread to an alternate venue once it covers execution costs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArbitrageStrategy;

impl SignalStrategy for ArbitrageStrategy {
    fn kind(&self) -> EngineKind {
        EngineKind::Arbitrage
    }

    fn cooldown(&self) -> Duration {
        Duration::seconds(20)
    }

    fn assess(
        &mut self,
        snapshot: &MarketSnapshot,
        params: &ParameterSet,
    ) -> Result<Option<SignalIntent>, EngineError> {
        let Some(reference) = snapshot.reference_price else {
            return Ok(None);
        };
        if !snapshot.has_price() {
            return Ok(None);
        }

        let spread = (reference - snapshot.price) / snapshot.price;
        let cost = params.get_or("slippage_tolerance", 0.01) + params.get_or("priority_fee", 0.01);
        if spread.abs() <= cost || cost <= 0.0 {
            return Ok(None);
        }

        // cheaper here than on the alternate venue: buy locally
        let side = if spread > 0.0 {
            SignalSide::Buy
        } else {
            SignalSide::Sell
        };
        let edge = spread.abs() - cost;
        let confidence = (0.5 + edge / cost * 0.25).min(0.95);
        Ok(Some(
            SignalIntent::new(
                side,
                confidence,
                format!(
                    "Spread {:.2}% to reference {reference:.8} exceeds costs {:.2}%",
                    spread * 100.0,
                    cost * 100.0
                ),
            )
            .with_expected_return(edge)
            .with_timeframe("1m"),
        ))
    }
}
