use axum::extract::Extension;
use axum::routing::{get, post};
use axum::Router;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use super::handlers::{
    handle_get_registry, handle_get_services, handle_register, handle_unregister,
};
use super::propagation::HttpPusher;
use super::protocol::{ENDPOINT_REGISTER, ENDPOINT_REGISTRY, ENDPOINT_SERVICES, ENDPOINT_UNREGISTER};
use super::service::DiscoveryService;
use crate::config::DiscoveryConfig;
use crate::error::MeshError;
use crate::registry::store::RegistryStore;
use crate::shutdown;

pub fn router(discovery: Arc<DiscoveryService>) -> Router {
    Router::new()
        .route(ENDPOINT_REGISTER, post(handle_register))
        .route(ENDPOINT_UNREGISTER, post(handle_unregister))
        .route(ENDPOINT_REGISTRY, get(handle_get_registry))
        .route(ENDPOINT_SERVICES, get(handle_get_services))
        .layer(Extension(discovery))
}

/// A bound, not yet serving discovery service.
pub struct DiscoveryServer {
    listener: TcpListener,
    discovery: Arc<DiscoveryService>,
    config: DiscoveryConfig,
}

impl DiscoveryServer {
    pub async fn bind(config: DiscoveryConfig) -> Result<Self, MeshError> {
        let listener = TcpListener::bind(config.bind).await?;
        let pusher = Arc::new(HttpPusher::new(config.push_timeout));
        let discovery = DiscoveryService::new(RegistryStore::new(), pusher);

        Ok(Self {
            listener,
            discovery,
            config,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, MeshError> {
        Ok(self.listener.local_addr()?)
    }

    pub fn discovery(&self) -> Arc<DiscoveryService> {
        self.discovery.clone()
    }

    /// Serves until `shutdown` resolves, then drains for at most the grace period.
    pub async fn run<S>(self, shutdown: S) -> Result<(), MeshError>
    where
        S: Future<Output = ()> + Send + 'static,
    {
        let addr = self.local_addr()?;
        tracing::info!("Discovery service listening on {}", addr);

        let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
        let server = shutdown::spawn_server(self.listener, router(self.discovery), async move {
            let _ = stop_rx.await;
        });

        shutdown.await;
        let _ = stop_tx.send(());
        shutdown::drain(server, self.config.shutdown_grace).await;

        tracing::info!("Discovery service stopped");
        Ok(())
    }
}
