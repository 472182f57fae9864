//! Shutdown Signal Handling
//!
//! Turns Ctrl+C or SIGTERM into a cancelled token so every task watching it
//! winds down.

use tokio_util::sync::CancellationToken;

/// Wait for a shutdown signal, then cancel `token`.
///
/// Returns early, without cancelling, if the token is cancelled elsewhere.
#[cfg_attr(coverage_nightly, coverage(off))]
pub async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("received Ctrl+C, initiating shutdown");
        }
        _ = terminate => {
            tracing::info!("received SIGTERM, initiating shutdown");
        }
        _ = token.cancelled() => return,
    }

    token.cancel();
}
