//! Warden API Server entry point
//!
//! Run with:
//! ```bash
//! cargo run -p warden-api
//! ```
//!
//! Configuration is loaded from environment variables and an optional `.env` file.

use tracing::{error, info};
use warden_common::{try_init_tracing, try_init_tracing_with_config, AppConfig, TracingConfig};

#[tokio::main]
async fn main() {
    // Load configuration; tracing follows the configured environment
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            let _ = try_init_tracing();
            error!(error = %e, "Failed to load configuration");
            std::process::exit(1);
        }
    };

    if let Err(e) = try_init_tracing_with_config(&TracingConfig::for_environment(config.app.env)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    info!(
        name = %config.app.name,
        env = ?config.app.env,
        backend = ?config.database.backend,
        port = config.api.port,
        "Configuration loaded"
    );

    // Run the server
    if let Err(e) = warden_api::run(config).await {
        error!(error = %e, "Server failed to start");
        std::process::exit(1);
    }
}
