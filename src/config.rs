//! Process configuration loaded from the environment
//!
//! Every setting has a default so a bare `hydra-bot` starts in sandbox mode
//! against the simulated market feed. Production requires a backend URL.

use crate::error::ConfigError;
use crate::models::SearchMethod;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Current deployment environment (`HYDRA_ENV`), lowercased. Defaults to `sandbox`.
pub fn get_environment() -> String {
    env::var("HYDRA_ENV")
        .map(|v| v.trim().to_lowercase())
        .unwrap_or_else(|_| "sandbox".to_string())
}

pub fn is_production() -> bool {
    matches!(get_environment().as_str(), "production" | "prod")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    pub tick_interval_ms: u64,
    pub status_every_ticks: u64,
    pub publish_retries: usize,
    pub publish_backoff_ms: u64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1_000,
            status_every_ticks: 30,
            publish_retries: 3,
            publish_backoff_ms: 200,
        }
    }
}

impl OrchestratorConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn publish_backoff(&self) -> Duration {
        Duration::from_millis(self.publish_backoff_ms)
    }
}

/// Trial budget and deadline for one search strategy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrategyBudget {
    pub trials: usize,
    pub timeout_seconds: u64,
}

impl StrategyBudget {
    pub fn new(trials: usize, timeout_seconds: u64) -> Self {
        Self {
            trials,
            timeout_seconds,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizerConfig {
    pub optimization_interval_seconds: u64,
    pub retry_backoff_seconds: u64,
    pub min_trades_for_optimization: usize,
    pub min_surrogate_samples: usize,
    pub store_retries: usize,
    pub store_backoff_ms: u64,
    pub bayesian: StrategyBudget,
    pub evolutionary: StrategyBudget,
    pub gradient: StrategyBudget,
    pub stochastic: StrategyBudget,
    /// Fixed seed for reproducible searches; random when absent.
    pub seed: Option<u64>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            optimization_interval_seconds: 6 * 3600,
            retry_backoff_seconds: 30 * 60,
            min_trades_for_optimization: 50,
            min_surrogate_samples: 100,
            store_retries: 3,
            store_backoff_ms: 500,
            bayesian: StrategyBudget::new(100, 300),
            evolutionary: StrategyBudget::new(50, 300),
            gradient: StrategyBudget::new(100, 300),
            stochastic: StrategyBudget::new(50, 300),
            seed: None,
        }
    }
}

impl OptimizerConfig {
    pub fn budget(&self, method: SearchMethod) -> StrategyBudget {
        match method {
            SearchMethod::Bayesian => self.bayesian,
            SearchMethod::Evolutionary => self.evolutionary,
            SearchMethod::Gradient => self.gradient,
            SearchMethod::Stochastic => self.stochastic,
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.optimization_interval_seconds)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_secs(self.retry_backoff_seconds)
    }

    pub fn store_backoff(&self) -> Duration {
        Duration::from_millis(self.store_backoff_ms)
    }
}

/// Weights of the five score components; must sum to 1
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveWeights {
    pub profit: f64,
    pub risk: f64,
    pub execution: f64,
    pub value_accrual: f64,
    pub community: f64,
}

impl Default for ObjectiveWeights {
    fn default() -> Self {
        Self {
            profit: 0.25,
            risk: 0.20,
            execution: 0.15,
            value_accrual: 0.30,
            community: 0.10,
        }
    }
}

impl ObjectiveWeights {
    pub fn total(&self) -> f64 {
        self.profit + self.risk + self.execution + self.value_accrual + self.community
    }

    fn all(&self) -> [f64; 5] {
        [
            self.profit,
            self.risk,
            self.execution,
            self.value_accrual,
            self.community,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GateConfig {
    pub allocation_epsilon: f64,
    pub max_daily_loss_cap: f64,
    pub min_improvement: f64,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            allocation_epsilon: 0.01,
            max_daily_loss_cap: 0.08,
            min_improvement: 0.02,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceEndpoints {
    /// Backend receiving signals and engine status; signals are only recorded locally when absent.
    pub backend_url: Option<String>,
    pub parameter_file: PathBuf,
    pub http_port: u16,
    /// Symbol quoted by the simulated market feed
    pub market_symbol: String,
}

impl Default for ServiceEndpoints {
    fn default() -> Self {
        Self {
            backend_url: None,
            parameter_file: PathBuf::from("data/parameters.json"),
            http_port: 8080,
            market_symbol: "BOOMROACH".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub orchestrator: OrchestratorConfig,
    pub optimizer: OptimizerConfig,
    pub weights: ObjectiveWeights,
    pub gate: GateConfig,
    pub endpoints: ServiceEndpoints,
}

impl Config {
    /// Read settings from the environment (after loading `.env`), then validate.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let mut config = Config::default();

        let o = &mut config.orchestrator;
        o.tick_interval_ms = parse_or("TICK_INTERVAL_MS", o.tick_interval_ms)?;
        o.status_every_ticks = parse_or("STATUS_EVERY_TICKS", o.status_every_ticks)?;
        o.publish_retries = parse_or("PUBLISH_RETRIES", o.publish_retries)?;
        o.publish_backoff_ms = parse_or("PUBLISH_BACKOFF_MS", o.publish_backoff_ms)?;

        let opt = &mut config.optimizer;
        opt.optimization_interval_seconds =
            parse_or("OPTIMIZATION_INTERVAL_SECONDS", opt.optimization_interval_seconds)?;
        opt.retry_backoff_seconds = parse_or("RETRY_BACKOFF_SECONDS", opt.retry_backoff_seconds)?;
        opt.min_trades_for_optimization =
            parse_or("MIN_TRADES_FOR_OPTIMIZATION", opt.min_trades_for_optimization)?;
        opt.min_surrogate_samples = parse_or("MIN_SURROGATE_SAMPLES", opt.min_surrogate_samples)?;
        opt.bayesian.trials = parse_or("BAYESIAN_TRIALS", opt.bayesian.trials)?;
        opt.evolutionary.trials = parse_or("EVOLUTIONARY_TRIALS", opt.evolutionary.trials)?;
        opt.gradient.trials = parse_or("GRADIENT_TRIALS", opt.gradient.trials)?;
        opt.stochastic.trials = parse_or("STOCHASTIC_TRIALS", opt.stochastic.trials)?;
        let strategy_timeout: Option<u64> = parse_opt("STRATEGY_TIMEOUT_SECONDS")?;
        if let Some(secs) = strategy_timeout {
            for budget in [
                &mut opt.bayesian,
                &mut opt.evolutionary,
                &mut opt.gradient,
                &mut opt.stochastic,
            ] {
                budget.timeout_seconds = secs;
            }
        }
        opt.seed = parse_opt("OPTIMIZER_SEED")?;

        let w = &mut config.weights;
        w.profit = parse_or("WEIGHT_PROFIT", w.profit)?;
        w.risk = parse_or("WEIGHT_RISK", w.risk)?;
        w.execution = parse_or("WEIGHT_EXECUTION", w.execution)?;
        w.value_accrual = parse_or("WEIGHT_VALUE_ACCRUAL", w.value_accrual)?;
        w.community = parse_or("WEIGHT_COMMUNITY", w.community)?;

        let g = &mut config.gate;
        g.max_daily_loss_cap = parse_or("MAX_DAILY_LOSS_CAP", g.max_daily_loss_cap)?;
        g.min_improvement = parse_or("MIN_IMPROVEMENT", g.min_improvement)?;

        let e = &mut config.endpoints;
        e.backend_url = env::var("BACKEND_URL")
            .ok()
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .filter(|v| !v.is_empty());
        if let Ok(path) = env::var("PARAMETER_FILE") {
            e.parameter_file = PathBuf::from(path);
        }
        e.http_port = parse_or("PORT", e.http_port)?;
        if let Ok(symbol) = env::var("MARKET_SYMBOL") {
            if !symbol.trim().is_empty() {
                e.market_symbol = symbol.trim().to_string();
            }
        }

        config.validate(is_production())?;
        Ok(config)
    }

    pub fn validate(&self, production: bool) -> Result<(), ConfigError> {
        if self.orchestrator.tick_interval_ms == 0 {
            return Err(invalid("TICK_INTERVAL_MS", "must be greater than zero"));
        }
        if self.orchestrator.status_every_ticks == 0 {
            return Err(invalid("STATUS_EVERY_TICKS", "must be greater than zero"));
        }
        if self.optimizer.optimization_interval_seconds == 0 {
            return Err(invalid("OPTIMIZATION_INTERVAL_SECONDS", "must be greater than zero"));
        }
        if self.optimizer.retry_backoff_seconds == 0 {
            return Err(invalid("RETRY_BACKOFF_SECONDS", "must be greater than zero"));
        }
        for budget in [
            &self.optimizer.bayesian,
            &self.optimizer.evolutionary,
            &self.optimizer.gradient,
            &self.optimizer.stochastic,
        ] {
            if budget.trials == 0 || budget.timeout_seconds == 0 {
                return Err(invalid(
                    "STRATEGY_BUDGET",
                    "trials and timeout must be greater than zero",
                ));
            }
        }
        if self.weights.all().iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(invalid("WEIGHTS", "weights must be finite and non-negative"));
        }
        if (self.weights.total() - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(invalid(
                "WEIGHTS",
                format!("weights sum to {:.4}, expected 1", self.weights.total()),
            ));
        }
        if !(self.gate.min_improvement >= 0.0 && self.gate.max_daily_loss_cap > 0.0) {
            return Err(invalid(
                "GATE",
                "min improvement must be >= 0 and the daily loss cap > 0",
            ));
        }
        if production && self.endpoints.backend_url.is_none() {
            return Err(ConfigError::Missing("BACKEND_URL"));
        }
        Ok(())
    }
}

fn invalid(key: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        key,
        reason: reason.into(),
    }
}

fn parse_opt<T: FromStr>(key: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| invalid(key, format!("cannot parse '{raw}'"))),
        _ => Ok(None),
    }
}

fn parse_or<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    Ok(parse_opt(key)?.unwrap_or(default))
}
