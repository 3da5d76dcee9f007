//! Middleware configuration for the HTTP server.
//!
//! Both groups are defined in `reelhub-server` and read from CLI arguments
//! or environment variables.
//!
//! # Example
//!
//! ```bash
//! reelhub --cors-origins "https://reelhub.dev" --request-timeout 60
//! ```

use anyhow::ensure;
use clap::Args;
use reelhub_server::middleware::{CorsConfig, RecoveryConfig};

use crate::TRACING_TARGET_CONFIG;

/// Upper bound for the request timeout in seconds.
const MAX_REQUEST_TIMEOUT_SECS: u64 = 300;

/// Middleware configuration combining CORS and recovery settings.
#[derive(Debug, Clone, Args)]
pub struct MiddlewareConfig {
    /// CORS (Cross-Origin Resource Sharing) configuration.
    #[clap(flatten)]
    pub cors: CorsConfig,

    /// Request timeout and panic recovery configuration.
    #[clap(flatten)]
    pub recovery: RecoveryConfig,
}

impl MiddlewareConfig {
    /// Validates the request timeout range.
    pub fn validate(&self) -> anyhow::Result<()> {
        let timeout = self.recovery.request_timeout;
        ensure!(
            (1..=MAX_REQUEST_TIMEOUT_SECS).contains(&timeout),
            "request timeout of {timeout}s is outside 1..={MAX_REQUEST_TIMEOUT_SECS}s"
        );
        Ok(())
    }

    /// Logs middleware configuration at info level.
    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            origins = ?self.cors.allowed_origins,
            credentials = self.cors.allow_credentials,
            max_age_secs = self.cors.max_age_seconds,
            "CORS configuration"
        );

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            request_timeout_secs = self.recovery.request_timeout,
            "Recovery configuration"
        );
    }
}
