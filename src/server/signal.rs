// Signal handling module
//
// Supported signals:
// - SIGINT:  Graceful shutdown (Ctrl+C)
// - SIGTERM: Graceful shutdown
// Other platforms only see Ctrl+C.

use std::future::Future;

use crate::error::StartupError;
use crate::logger;

/// Register shutdown signal handlers and return a future that resolves on the first one.
///
/// Handlers are installed before this returns, so a signal arriving between
/// registration and the first poll is not lost. Must be called from within a
/// Tokio runtime.
#[cfg(unix)]
pub fn shutdown_signal() -> Result<impl Future<Output = ()> + Send, StartupError> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt()).map_err(StartupError::Signal)?;
    let mut sigterm = signal(SignalKind::terminate()).map_err(StartupError::Signal)?;

    Ok(async move {
        let name = tokio::select! {
            _ = sigint.recv() => "SIGINT (Ctrl+C)",
            _ = sigterm.recv() => "SIGTERM",
        };
        logger::log_shutdown_requested(name);
    })
}

/// Windows fallback - only handles Ctrl+C
#[cfg(not(unix))]
pub fn shutdown_signal() -> Result<impl Future<Output = ()> + Send, StartupError> {
    Ok(async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => logger::log_shutdown_requested("Ctrl+C"),
            Err(e) => {
                logger::log_error(&format!("Failed to listen for Ctrl+C: {e}"));
                // Without a handler the process can only be killed; keep serving
                std::future::pending::<()>().await;
            }
        }
    })
}
