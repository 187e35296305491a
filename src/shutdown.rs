//! Shutdown signalling and bounded draining.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;

/// Resolves on Ctrl+C or SIGTERM.
pub async fn signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
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
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

/// Serves `listener` until `stop` resolves, in a background task.
pub fn spawn_server<S>(
    listener: tokio::net::TcpListener,
    app: axum::Router,
    stop: S,
) -> JoinHandle<std::io::Result<()>>
where
    S: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move { axum::serve(listener, app).with_graceful_shutdown(stop).await })
}

/// Waits for a server that has been told to stop; aborts it once `grace` elapses.
pub async fn drain(mut server: JoinHandle<std::io::Result<()>>, grace: Duration) {
    match tokio::time::timeout(grace, &mut server).await {
        Ok(Ok(Ok(()))) => tracing::info!("Drained in-flight requests"),
        Ok(Ok(Err(e))) => tracing::error!("Server error while draining: {}", e),
        Ok(Err(e)) => tracing::error!("Server task failed: {}", e),
        Err(_) => {
            tracing::warn!("Grace period of {:?} elapsed, aborting open requests", grace);
            server.abort();
        }
    }
}
