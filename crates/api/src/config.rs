//! Configuration loading and validation for the API server.
//!
//! Values are read from environment variables at startup, after a local
//! `.env` definitions file has been loaded into the process environment. The
//! process exits with a clear error message if any required variable is
//! missing or invalid.

use anyhow::{Context, Result};
use serde::Deserialize;

/// Validated server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Port the HTTPS server listens on. The `PORT` environment variable
    /// overrides this default.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Deployment environment name (e.g. `"development"`, `"production"`).
    #[serde(default = "default_env")]
    pub env: String,

    /// Directory holding `privkey.pem`, `cert.pem`, and `chain.pem` in the
    /// Let's Encrypt `live/<host>` layout. **Required.**
    pub tls_dir: String,

    /// Comma-separated list of origins permitted to make credentialed
    /// cross-origin requests.
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: String,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_port() -> u16 {
    3000
}
fn default_env() -> String {
    "development".into()
}
fn default_allowed_origins() -> String {
    "http://localhost:4200,http://localhost:3000,http://localhost:8100".into()
}
fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any required variable is absent or cannot be parsed.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// The origin allow-list parsed into individual origins.
    pub fn origin_list(&self) -> Vec<String> {
        self.allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_owned)
            .collect()
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        if self.tls_dir.trim().is_empty() {
            anyhow::bail!("TLS_DIR is required and must not be empty");
        }
        if self.port == 0 {
            anyhow::bail!("PORT must be a non-zero port number");
        }
        if self.origin_list().is_empty() {
            anyhow::bail!("ALLOWED_ORIGINS must contain at least one origin");
        }
        Ok(())
    }
}
