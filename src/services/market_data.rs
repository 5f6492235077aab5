//! Market snapshot providers

use crate::error::SinkError;
use crate::models::MarketSnapshot;
use async_trait::async_trait;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use std::collections::VecDeque;
use tokio::sync::Mutex;

/// Source of the one snapshot every engine sees during a tick
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn snapshot(&self) -> Result<MarketSnapshot, SinkError>;
}

/// Samples kept to derive the 24h change; one sample per tick.
const CHANGE_WINDOW: usize = 1_440;

struct WalkState {
    rng: StdRng,
    price: f64,
    history: VecDeque<f64>,
}

/// Bounded random walk used for sandbox runs and dry runs.
///
/// Price moves by a Gaussian step and is kept inside `[floor, ceiling]`;
/// volume occasionally spikes; the alternate-venue quote jitters around
/// the local price.
pub struct SimulatedMarketData {
    symbol: String,
    floor: f64,
    ceiling: f64,
    base_volume: f64,
    step_sigma: f64,
    venue_sigma: f64,
    state: Mutex<WalkState>,
}

impl SimulatedMarketData {
    pub fn new(symbol: impl Into<String>, start_price: f64, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let start_price = if start_price.is_finite() && start_price > 0.0 {
            start_price
        } else {
            1.0
        };
        Self {
            symbol: symbol.into(),
            floor: start_price * 0.2,
            ceiling: start_price * 5.0,
            base_volume: 1_250_000.0,
            step_sigma: 0.004,
            venue_sigma: 0.01,
            state: Mutex::new(WalkState {
                rng,
                price: start_price,
                history: VecDeque::with_capacity(CHANGE_WINDOW),
            }),
        }
    }
}

#[async_trait]
impl MarketDataProvider for SimulatedMarketData {
    async fn snapshot(&self) -> Result<MarketSnapshot, SinkError> {
        let mut state = self.state.lock().await;
        let WalkState { rng, price, history } = &mut *state;

        let step = rng.sample::<f64, _>(StandardNormal) * self.step_sigma;
        *price = (*price * (1.0 + step)).clamp(self.floor, self.ceiling);

        if history.len() == CHANGE_WINDOW {
            history.pop_front();
        }
        history.push_back(*price);
        let oldest = history.front().copied().unwrap_or(*price);
        let change_24h = (*price / oldest - 1.0) * 100.0;

        let spike = if rng.gen_bool(0.02) {
            rng.gen_range(3.0..8.0)
        } else {
            rng.gen_range(0.7..1.3)
        };
        let volume = self.base_volume * spike;
        let reference = *price * (1.0 + rng.sample::<f64, _>(StandardNormal) * self.venue_sigma);

        Ok(MarketSnapshot::new(self.symbol.clone(), *price, volume, Utc::now())
            .with_change_24h(change_24h)
            .with_market_cap(*price * 10_000_000_000.0)
            .with_reference_price(reference))
    }
}
