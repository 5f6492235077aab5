//! Prometheus metrics for the HTTP surface, the tick loop and the optimizer

use prometheus::{
    Encoder, Gauge, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

pub struct Metrics {
    registry: Registry,

    pub http_requests_total: IntCounter,
    pub http_request_duration_seconds: Histogram,
    pub http_requests_in_flight: IntGauge,

    pub ticks_total: IntCounter,
    pub ticks_skipped_total: IntCounter,
    pub tick_duration_seconds: Histogram,
    pub signals_published_total: IntCounterVec,
    pub signals_dropped_total: IntCounterVec,
    pub engine_faults_total: IntCounterVec,
    pub engines_running: IntGauge,

    pub optimization_cycles_total: IntCounterVec,
    pub optimization_rejections_total: IntCounterVec,
    pub rollouts_total: IntCounter,
    pub current_score: Gauge,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some("hydra".to_string()), None)?;

        let http_requests_total =
            IntCounter::with_opts(Opts::new("http_requests_total", "Total HTTP requests served"))?;
        let http_request_duration_seconds = Histogram::with_opts(HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request latency in seconds",
        ))?;
        let http_requests_in_flight = IntGauge::with_opts(Opts::new(
            "http_requests_in_flight",
            "HTTP requests currently being served",
        ))?;

        let ticks_total =
            IntCounter::with_opts(Opts::new("ticks_total", "Orchestrator ticks run"))?;
        let ticks_skipped_total = IntCounter::with_opts(Opts::new(
            "ticks_skipped_total",
            "Ticks skipped because market data was unavailable",
        ))?;
        let tick_duration_seconds = Histogram::with_opts(
            HistogramOpts::new("tick_duration_seconds", "Wall time of one orchestrator tick")
                .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5]),
        )?;
        let signals_published_total = IntCounterVec::new(
            Opts::new("signals_published_total", "Signals accepted by the signal sink"),
            &["engine"],
        )?;
        let signals_dropped_total = IntCounterVec::new(
            Opts::new(
                "signals_dropped_total",
                "Signals dropped after exhausting publish retries",
            ),
            &["engine"],
        )?;
        let engine_faults_total = IntCounterVec::new(
            Opts::new("engine_faults_total", "Errors raised by engines during assessment"),
            &["engine", "kind"],
        )?;
        let engines_running =
            IntGauge::with_opts(Opts::new("engines_running", "Engines currently in RUNNING"))?;

        let optimization_cycles_total = IntCounterVec::new(
            Opts::new("optimization_cycles_total", "Optimization cycles by outcome"),
            &["outcome"],
        )?;
        let optimization_rejections_total = IntCounterVec::new(
            Opts::new(
                "optimization_rejections_total",
                "Candidates rejected by the validation gate",
            ),
            &["reason"],
        )?;
        let rollouts_total =
            IntCounter::with_opts(Opts::new("rollouts_total", "Parameter sets rolled out"))?;
        let current_score = Gauge::with_opts(Opts::new(
            "current_score",
            "Score of the live parameter set",
        ))?;

        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;
        registry.register(Box::new(http_requests_in_flight.clone()))?;
        registry.register(Box::new(ticks_total.clone()))?;
        registry.register(Box::new(ticks_skipped_total.clone()))?;
        registry.register(Box::new(tick_duration_seconds.clone()))?;
        registry.register(Box::new(signals_published_total.clone()))?;
        registry.register(Box::new(signals_dropped_total.clone()))?;
        registry.register(Box::new(engine_faults_total.clone()))?;
        registry.register(Box::new(engines_running.clone()))?;
        registry.register(Box::new(optimization_cycles_total.clone()))?;
        registry.register(Box::new(optimization_rejections_total.clone()))?;
        registry.register(Box::new(rollouts_total.clone()))?;
        registry.register(Box::new(current_score.clone()))?;

        Ok(Self {
            registry,
            http_requests_total,
            http_request_duration_seconds,
            http_requests_in_flight,
            ticks_total,
            ticks_skipped_total,
            tick_duration_seconds,
            signals_published_total,
            signals_dropped_total,
            engine_faults_total,
            engines_running,
            optimization_cycles_total,
            optimization_rejections_total,
            rollouts_total,
            current_score,
        })
    }

    /// Render every registered metric in the Prometheus text format
    pub fn export(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
