//! Shared application state injected into handlers and middleware stages.

use std::sync::Arc;

use crate::config::Config;

use super::cors::OriginPolicy;
use super::middleware::BodyLimits;

/// Application state shared across all request handlers.
///
/// All fields are cheaply cloneable (`Arc`-wrapped or `Copy`) so axum can
/// clone the state for each request without copying expensive data. Nothing
/// here is mutated after startup.
#[derive(Clone)]
pub struct AppState {
    /// Origin allow-list consulted by the CORS stage.
    pub policy: OriginPolicy,
    /// Body decoding ceilings enforced before extraction.
    pub limits: BodyLimits,
    /// Deployment environment name reported by `/health`.
    pub env: Arc<str>,
}

impl AppState {
    /// Create a new [`AppState`] from explicit parts.
    pub fn new(policy: OriginPolicy, limits: BodyLimits, env: &str) -> Self {
        Self {
            policy,
            limits,
            env: env.into(),
        }
    }

    /// Build the production state from validated configuration.
    pub fn from_config(cfg: &Config) -> Self {
        Self::new(
            OriginPolicy::new(cfg.origin_list()),
            BodyLimits::default(),
            &cfg.env,
        )
    }
}

impl Default for AppState {
    /// Default state with the development origin set, suitable for tests.
    fn default() -> Self {
        Self::new(
            OriginPolicy::new(vec![
                "http://localhost:4200".into(),
                "http://localhost:3000".into(),
                "http://localhost:8100".into(),
            ]),
            BodyLimits::default(),
            "test",
        )
    }
}
