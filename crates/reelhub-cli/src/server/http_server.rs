//! HTTP server startup and lifecycle management.

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::time::Instant;

use axum::Router;
use tokio::net::TcpListener;

use super::{TRACING_TARGET_SHUTDOWN, TRACING_TARGET_STARTUP};
use crate::config::ServerConfig;
use crate::server::{Result, ServerError, shutdown_signal};

/// Binds to the configured address and serves `app` until a shutdown signal.
///
/// In-flight requests get up to the configured shutdown timeout to finish
/// once the signal is received.
///
/// # Errors
///
/// - [`ServerError::BindError`] if the address cannot be bound
/// - [`ServerError::Runtime`] if the server fails while running
pub async fn serve(app: Router, server_config: ServerConfig) -> Result<()> {
    let server_addr = server_config.server_addr();

    let listener = TcpListener::bind(server_addr).await.map_err(|source| {
        tracing::error!(
            target: TRACING_TARGET_STARTUP,
            addr = %server_addr,
            error = %source,
            "Failed to bind to address"
        );

        ServerError::BindError {
            address: server_addr.to_string(),
            source,
        }
    })?;

    tracing::info!(
        target: TRACING_TARGET_STARTUP,
        addr = %server_addr,
        "Server is ready and listening for connections"
    );

    if server_config.binds_to_all_interfaces() {
        tracing::warn!(
            target: TRACING_TARGET_STARTUP,
            "Server is bound to all interfaces. Ensure firewall rules are properly configured."
        );
    }

    let start_time = Instant::now();
    let shutdown_timeout = server_config.shutdown_timeout();
    let (signal_tx, signal_rx) = tokio::sync::oneshot::channel::<()>();

    let server = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        let signal = shutdown_signal().await;
        tracing::info!(
            target: TRACING_TARGET_SHUTDOWN,
            %signal,
            timeout_secs = shutdown_timeout.as_secs(),
            "draining in-flight requests"
        );
        let _ = signal_tx.send(());
    })
    .into_future();
    tokio::pin!(server);

    // Drain in-flight requests for at most the shutdown timeout.
    let result = tokio::select! {
        result = &mut server => result,
        () = async {
            if signal_rx.await.is_ok() {
                tokio::time::sleep(shutdown_timeout).await;
            } else {
                std::future::pending::<()>().await;
            }
        } => {
            tracing::warn!(
                target: TRACING_TARGET_SHUTDOWN,
                timeout_secs = shutdown_timeout.as_secs(),
                "Shutdown timeout elapsed, dropping remaining connections"
            );
            Ok(())
        }
    };

    result.map_err(|err| {
        tracing::error!(
            target: TRACING_TARGET_SHUTDOWN,
            error = %err,
            "Server encountered an error"
        );
        ServerError::Runtime(err)
    })?;

    tracing::info!(
        target: TRACING_TARGET_SHUTDOWN,
        uptime_secs = start_time.elapsed().as_secs(),
        "Server shut down gracefully"
    );
    Ok(())
}
