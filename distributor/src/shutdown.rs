//! Process shutdown signal.
//!
//! The HTTP server takes a future and stops accepting connections when it
//! resolves, then drains in-flight work requests before returning.

use tokio::signal;
use tracing::{info, warn};

/// Resolves on the first SIGINT (Ctrl-C) or, on Unix, SIGTERM.
///
/// A signal handler that cannot be installed is logged and treated as a
/// signal that never arrives, so the other one still works.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("failed to listen for SIGINT: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received SIGINT, draining requests"),
        _ = terminate => info!("received SIGTERM, draining requests"),
    }
}
