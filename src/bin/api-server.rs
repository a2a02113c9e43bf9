//! Market data API server
//!
//! Serves quotes, company search and the tool/resource/prompt catalog over
//! HTTP. Runs degraded when no Finnhub key is configured.

use dotenvy::dotenv;
use market_mcp::config::Config;
use market_mcp::core::http::start_server;
use market_mcp::logging;
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env if present
    dotenv().ok();

    let config = Config::from_env()?;
    logging::init_logging(&config);

    info!("Starting {}", config.app_name);
    info!(environment = %config.environment, version = %config.app_version, "Environment");
    info!(port = config.port, "HTTP Server: http://0.0.0.0:{}", config.port);

    let shutdown = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for shutdown signal");
        }
        info!("Shutting down API server...");
    };

    if let Err(e) = start_server(&config, shutdown).await {
        error!(error = %e, "HTTP server error");
        return Err(e);
    }

    info!("API server stopped");
    Ok(())
}
