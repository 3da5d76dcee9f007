//! Listener address and shutdown settings.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::ops::RangeInclusive;
use std::time::Duration;

use anyhow::ensure;
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET_CONFIG;

/// Lowest port that can be bound without elevated privileges.
const MIN_UNPRIVILEGED_PORT: u16 = 1024;

/// Accepted graceful shutdown timeouts in seconds.
const SHUTDOWN_TIMEOUT_SECS: RangeInclusive<u64> = 1..=300;

/// Where the server listens and how long it drains on shutdown.
///
/// Read from `HOST`, `PORT` and `SHUTDOWN_TIMEOUT` when the matching flag is
/// not given.
#[derive(Debug, Clone, Args, Serialize, Deserialize)]
#[must_use = "config does nothing unless you use it"]
pub struct ServerConfig {
    /// Interface to bind; "0.0.0.0" listens on all of them.
    #[arg(long, env = "HOST", default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    pub host: IpAddr,

    /// TCP port to listen on.
    #[arg(short = 'p', long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Seconds in-flight requests may take to finish after a shutdown signal.
    #[arg(long, env = "SHUTDOWN_TIMEOUT", default_value_t = 30)]
    pub shutdown_timeout: u64,
}

impl ServerConfig {
    /// Rejects privileged ports and out-of-range shutdown timeouts.
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            self.port >= MIN_UNPRIVILEGED_PORT,
            "port {} requires elevated privileges; choose one from {MIN_UNPRIVILEGED_PORT} to 65535",
            self.port
        );
        ensure!(
            SHUTDOWN_TIMEOUT_SECS.contains(&self.shutdown_timeout),
            "shutdown timeout of {}s is outside {}..={}s",
            self.shutdown_timeout,
            SHUTDOWN_TIMEOUT_SECS.start(),
            SHUTDOWN_TIMEOUT_SECS.end()
        );
        Ok(())
    }

    /// Returns the socket address to bind.
    #[must_use]
    pub const fn server_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Returns the graceful shutdown timeout.
    #[must_use]
    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout)
    }

    /// Returns whether the host is the unspecified address of its family.
    #[must_use]
    pub fn binds_to_all_interfaces(&self) -> bool {
        self.host.is_unspecified()
    }

    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            addr = %self.server_addr(),
            shutdown_timeout_secs = self.shutdown_timeout,
            "Server configuration"
        );
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 3000,
            shutdown_timeout: 30,
        }
    }
}
