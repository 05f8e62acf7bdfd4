//! Signal handling for graceful shutdown.
//!
//! SIGINT (Ctrl+C) and SIGTERM both stop the HTTP server after in-flight
//! requests finish.

use tokio::sync::watch;
use tracing::warn;

/// Creates a shutdown signal receiver that triggers on SIGINT or SIGTERM.
///
/// Returns a `watch::Receiver<bool>` that changes to `true` when a shutdown
/// signal is received. The receiver can be cloned and shared across tasks.
///
/// # Example
///
/// ```no_run
/// use path402_cli::signals::{shutdown_signal, wait_for};
///
/// #[tokio::main]
/// async fn main() {
///     let shutdown = shutdown_signal();
///     wait_for(shutdown).await;
///     println!("Shutdown signal received");
/// }
/// ```
pub fn shutdown_signal() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);

    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        let _ = tx.send(true);
    });

    rx
}

/// Resolve once `rx` flips to `true` (or its sender is gone).
pub async fn wait_for(mut rx: watch::Receiver<bool>) {
    while !*rx.borrow() {
        if rx.changed().await.is_err() {
            return;
        }
    }
}

/// Wait for either SIGINT or SIGTERM.
async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_shutdown_signal_initial_state() {
        let rx = shutdown_signal();
        assert!(!*rx.borrow());
    }

    #[tokio::test]
    async fn test_wait_for_resolves_on_send() {
        let (tx, rx) = watch::channel(false);
        let waiter = tokio::spawn(wait_for(rx));
        tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
    }
}
