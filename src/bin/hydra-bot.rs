//! Hydra Bot
//!
//! Runs the signal engines, the optimization service and the operational
//! HTTP server until ctrl-c.

use hydra::config::{get_environment, Config};
use hydra::core::HydraRuntime;
use hydra::logging::init_logging;
use tokio::signal;
use tokio::sync::watch;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();
    let config = Config::from_env()?;

    println!("Starting Hydra Bot");
    println!("  Environment: {}", get_environment());
    println!("  HTTP Server: http://0.0.0.0:{}", config.endpoints.http_port);
    println!("  Tick interval: {} ms", config.orchestrator.tick_interval_ms);
    println!(
        "  Optimization: every {} seconds",
        config.optimizer.optimization_interval_seconds
    );
    match &config.endpoints.backend_url {
        Some(url) => println!("  Backend: {}", url),
        None => println!("  Backend: none (dry run)"),
    }

    let runtime = HydraRuntime::build(config).await?;
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let running = tokio::spawn(runtime.run(shutdown_rx));

    signal::ctrl_c().await?;
    println!("\nShutting down...");
    info!("Shutdown requested");
    shutdown_tx.send_replace(true);
    running.await?;

    Ok(())
}
