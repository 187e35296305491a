use axum::extract::Extension;
use axum::routing::get;
use axum::Router;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use super::handlers::{handle_get_snapshot, handle_hello, handle_push};
use super::identity::{NodeIdentity, bind_listener};
use super::protocol::{ENDPOINT_HELLO, ENDPOINT_PUSH};
use super::random::{RandomSource, SeededRandom, ThreadRandom};
use super::service::ServiceNode;
use crate::config::NodeConfig;
use crate::error::MeshError;
use crate::shutdown;

pub fn router(node: Arc<ServiceNode>) -> Router {
    Router::new()
        .route(ENDPOINT_PUSH, get(handle_get_snapshot).post(handle_push))
        .route(ENDPOINT_HELLO, get(handle_hello))
        .layer(Extension(node))
}

/// A bound, not yet registered node.
pub struct NodeServer {
    listener: TcpListener,
    node: Arc<ServiceNode>,
    grace: Duration,
}

impl NodeServer {
    pub async fn bind(config: NodeConfig) -> Result<Self, MeshError> {
        config.validate()?;

        let random: Arc<dyn RandomSource> = match config.seed {
            Some(seed) => Arc::new(SeededRandom::new(seed)),
            None => Arc::new(ThreadRandom),
        };

        let (listener, identity) = bind_listener(
            &config.name,
            &config.host,
            config.advertised_host(),
            config.port,
            random.as_ref(),
        )
        .await?;
        let node = ServiceNode::new(identity, &config, random);

        Ok(Self {
            listener,
            node,
            grace: config.shutdown_grace,
        })
    }

    pub fn identity(&self) -> &NodeIdentity {
        &self.node.identity
    }

    pub fn node(&self) -> Arc<ServiceNode> {
        self.node.clone()
    }

    /// Serves, registers, waits for `shutdown`, unregisters and drains.
    ///
    /// A failed registration stops the server and is returned to the caller.
    /// `shutdown` is honoured while registration is still retrying.
    pub async fn run<S>(self, shutdown: S) -> Result<(), MeshError>
    where
        S: Future<Output = ()> + Send + 'static,
    {
        let node = self.node;
        tracing::info!(
            "Node {} listening on {}",
            node.identity.name,
            node.identity.addr
        );

        let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
        let server = shutdown::spawn_server(self.listener, router(node.clone()), async move {
            let _ = stop_rx.await;
        });

        tokio::pin!(shutdown);

        // Serving first lets the discovery service's first push land.
        let registered = tokio::select! {
            result = node.register() => Some(result),
            _ = &mut shutdown => None,
        };

        match registered {
            Some(Ok(())) => {
                shutdown.await;
                if let Err(e) = node.unregister().await {
                    tracing::warn!("Best-effort unregistration failed: {}", e);
                }
            }
            Some(Err(e)) => {
                tracing::error!("{}", e);
                let _ = stop_tx.send(());
                shutdown::drain(server, self.grace).await;
                return Err(e);
            }
            None => {
                tracing::info!("Shutdown requested during registration");
                match tokio::time::timeout(self.grace, node.abandon_registration()).await {
                    Ok(Err(e)) => tracing::warn!("Best-effort unregistration failed: {}", e),
                    Err(_) => tracing::warn!("Best-effort unregistration timed out"),
                    Ok(Ok(())) => {}
                }
            }
        }

        let _ = stop_tx.send(());
        shutdown::drain(server, self.grace).await;

        tracing::info!("Node {} stopped", node.identity.name);
        Ok(())
    }
}
