//! Social worker entry point
//!
//! Run with:
//! ```bash
//! cargo run -p social-worker
//! ```
//!
//! Configuration is loaded from environment variables.

use social_common::{try_init_tracing_with_config, AppConfig, TracingConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Load configuration before tracing so the log format follows APP_ENV
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = try_init_tracing_with_config(TracingConfig::for_environment(config.app.env)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    if let Err(e) = run(config).await {
        error!(error = %e, code = e.error_code(), "Worker failed");
        std::process::exit(1);
    }
}

async fn run(config: AppConfig) -> social_common::AppResult<()> {
    info!(
        name = %config.app.name,
        env = ?config.app.env,
        stream_prefix = %config.stream.prefix,
        group = %config.stream.group,
        consumer = %config.stream.consumer,
        "Starting social worker"
    );

    social_worker::run(config, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for shutdown signal");
        }
    })
    .await
}
