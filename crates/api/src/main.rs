//! `aetasaal-api` — server binary entry point.
//!
//! Startup sequence:
//! 1. Load the local `.env` definitions file and validate [`Config`] from
//!    environment variables.
//! 2. Initialise structured JSON logging.
//! 3. Build the shared [`AppState`] (origin policy, body ceilings).
//! 4. Load the TLS material, bind the HTTPS listener, and serve until killed.

mod config;
mod server;
mod telemetry;

use anyhow::Result;
use tracing::info;

use config::Config;
use server::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    dotenvy::dotenv().ok();

    let cfg = Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init(&cfg.log_level)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        port = cfg.port,
        env = %cfg.env,
        "aetasaal-api starting"
    );

    // -----------------------------------------------------------------------
    // 3. Shared state
    // -----------------------------------------------------------------------
    let state = AppState::from_config(&cfg);

    // -----------------------------------------------------------------------
    // 4. HTTPS server
    // -----------------------------------------------------------------------
    let server = server::Server::start(&cfg, state).await?;
    server.wait().await
}
