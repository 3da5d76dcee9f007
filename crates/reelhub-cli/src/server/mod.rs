//! HTTP server startup and graceful shutdown.

/// Tracing target for server startup events.
pub const TRACING_TARGET_STARTUP: &str = "reelhub_cli::server::startup";

/// Tracing target for server shutdown events.
pub const TRACING_TARGET_SHUTDOWN: &str = "reelhub_cli::server::shutdown";

mod error;
mod http_server;
mod shutdown;

pub use error::{Result, ServerError};
pub use http_server::serve;
use shutdown::shutdown_signal;
