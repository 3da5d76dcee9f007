//! Process signals that stop the server.

use std::fmt;

use super::TRACING_TARGET_SHUTDOWN;

/// The signal that ended the serve loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    /// SIGINT or Ctrl+C.
    Interrupt,
    /// SIGTERM, as sent by process supervisors.
    Terminate,
}

impl fmt::Display for ShutdownSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Interrupt => "SIGINT",
            Self::Terminate => "SIGTERM",
        })
    }
}

/// Resolves once the process receives an interrupt or terminate signal.
///
/// A handler that cannot be installed is logged and never fires, so the
/// other one still stops the server.
pub async fn shutdown_signal() -> ShutdownSignal {
    let interrupt = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => ShutdownSignal::Interrupt,
            Err(error) => {
                tracing::error!(
                    target: TRACING_TARGET_SHUTDOWN,
                    error = %error,
                    "cannot listen for SIGINT"
                );
                std::future::pending().await
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                ShutdownSignal::Terminate
            }
            Err(error) => {
                tracing::error!(
                    target: TRACING_TARGET_SHUTDOWN,
                    error = %error,
                    "cannot listen for SIGTERM"
                );
                std::future::pending().await
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<ShutdownSignal>();

    let received = tokio::select! {
        signal = interrupt => signal,
        signal = terminate => signal,
    };

    tracing::info!(
        target: TRACING_TARGET_SHUTDOWN,
        signal = %received,
        "shutdown signal received"
    );

    received
}
