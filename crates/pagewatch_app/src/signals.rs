//! Shutdown on SIGINT / SIGTERM.

use std::future::Future;

use watch_logging::watch_info;
#[cfg(not(unix))]
use watch_logging::watch_error;

/// Registers the handlers now and returns a future that resolves on the first
/// shutdown signal. Registration failures abort startup.
#[cfg(unix)]
pub fn shutdown_signal() -> anyhow::Result<impl Future<Output = ()>> {
    use anyhow::Context;
    use tokio::signal::unix::{signal, SignalKind};

    let mut interrupt =
        signal(SignalKind::interrupt()).context("failed to install SIGINT handler")?;
    let mut terminate =
        signal(SignalKind::terminate()).context("failed to install SIGTERM handler")?;

    Ok(async move {
        tokio::select! {
            _ = interrupt.recv() => watch_info!("Received SIGINT"),
            _ = terminate.recv() => watch_info!("Received SIGTERM"),
        }
    })
}

#[cfg(not(unix))]
pub fn shutdown_signal() -> anyhow::Result<impl Future<Output = ()>> {
    Ok(async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => watch_info!("Received Ctrl+C"),
            Err(err) => {
                watch_error!("Listening for Ctrl+C failed: {}", err);
                std::future::pending::<()>().await
            }
        }
    })
}
