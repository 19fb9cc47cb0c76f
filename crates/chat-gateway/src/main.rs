//! Chat Gateway Server entry point
//!
//! Run with:
//! ```bash
//! cargo run -p chat-gateway
//! ```
//!
//! Configuration is loaded from environment variables.

use chat_common::{try_init_tracing, AppConfig, AppError};
use tracing::{error, info};

/// Exit codes (§6): 0 clean, 1 config error, 2 dependency connect failure,
/// 3 migration failure.
fn exit_code_for(err: &AppError) -> i32 {
    match err {
        AppError::Config(_) => 1,
        AppError::Migration(_) => 3,
        AppError::Database(_) | AppError::Cache(_) | AppError::ProduceFailed(_) => 2,
        _ => 1,
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    if let Err(e) = try_init_tracing() {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    // Run the server
    if let Err(e) = run().await {
        error!(error = %e, "Gateway failed to start");
        std::process::exit(exit_code_for(&e));
    }
}

async fn run() -> Result<(), AppError> {
    info!("Starting Chat Gateway Server...");

    // Load configuration
    let config = AppConfig::from_env().map_err(|e| {
        let e = AppError::Config(e.to_string());
        error!(error = %e, "Failed to load configuration");
        e
    })?;

    info!(
        env = ?config.app.env,
        port = config.gateway.port,
        "Configuration loaded"
    );

    // Run the gateway server
    chat_gateway::run(config).await?;

    Ok(())
}
