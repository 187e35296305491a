use axum::body::Bytes;
use axum::http::StatusCode;
use std::sync::Arc;

use super::cache::{ApplyOutcome, SnapshotCache};
use super::client::DiscoveryClient;
use super::forward::{Forwarder, Reply};
use super::identity::NodeIdentity;
use super::lifecycle::{Lifecycle, LifecycleState};
use super::protocol::{CorrelationToken, HELLO_BODY};
use super::random::RandomSource;
use super::routing::{Decision, RoutingPolicy};
use crate::config::NodeConfig;
use crate::error::MeshError;
use crate::registry::types::Snapshot;

pub struct ServiceNode {
    pub identity: NodeIdentity,
    cache: SnapshotCache,
    policy: RoutingPolicy,
    forwarder: Forwarder,
    discovery: DiscoveryClient,
    lifecycle: Lifecycle,
}

impl ServiceNode {
    pub fn new(
        identity: NodeIdentity,
        config: &NodeConfig,
        random: Arc<dyn RandomSource>,
    ) -> Arc<Self> {
        Arc::new(Self {
            identity,
            cache: SnapshotCache::new(),
            policy: RoutingPolicy::new(config.termination_probability, config.max_hops, random),
            forwarder: Forwarder::new(config.forward_timeout),
            discovery: DiscoveryClient::new(
                &config.discovery_url,
                config.register_timeout,
                config.register_attempts,
            ),
            lifecycle: Lifecycle::new(),
        })
    }

    pub fn state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.cache.current()
    }

    pub async fn register(&self) -> Result<(), MeshError> {
        self.lifecycle.transition(LifecycleState::Registering)?;

        match self.discovery.register(&self.identity).await {
            Ok(()) => {
                self.lifecycle.transition(LifecycleState::Registered)?;
                tracing::info!(
                    "Registered as {} at {}",
                    self.identity.name,
                    self.identity.addr
                );
                Ok(())
            }
            Err(e) => {
                self.lifecycle.transition(LifecycleState::Unregistered)?;
                Err(e)
            }
        }
    }

    /// Leaves the mesh. The node ends up `Departed` even when the call fails.
    pub async fn unregister(&self) -> Result<(), MeshError> {
        self.lifecycle.transition(LifecycleState::Unregistering)?;
        let result = self.discovery.unregister(&self.identity.name).await;
        self.lifecycle.transition(LifecycleState::Departed)?;

        if result.is_ok() {
            tracing::info!("Unregistered {}", self.identity.name);
        }
        result
    }

    /// Backs out of a registration cut short by shutdown.
    ///
    /// The register call may already have reached the discovery service, so a
    /// single unregister is still sent.
    pub async fn abandon_registration(&self) -> Result<(), MeshError> {
        if self.state() != LifecycleState::Registering {
            return Ok(());
        }
        self.lifecycle.transition(LifecycleState::Unregistered)?;
        self.discovery.unregister(&self.identity.name).await
    }

    pub fn apply_snapshot(&self, snapshot: Snapshot) -> ApplyOutcome {
        let version = snapshot.version;
        let members = snapshot.len();
        let outcome = self.cache.apply(snapshot);

        match outcome {
            ApplyOutcome::Applied => {
                tracing::info!("Applied snapshot v{} ({} members)", version, members)
            }
            ApplyOutcome::Stale => tracing::debug!("Ignored stale snapshot v{}", version),
        }
        outcome
    }

    /// Answers here or forwards, following the routing policy.
    pub async fn handle_hello(
        &self,
        correlation: Option<CorrelationToken>,
        hops: u32,
    ) -> Result<Reply, MeshError> {
        let correlation = correlation.unwrap_or_else(CorrelationToken::generate);
        let snapshot = self.cache.current();

        match self.policy.decide(&snapshot, &self.identity.name, hops) {
            Decision::Local(reason) => {
                tracing::debug!(
                    correlation = %correlation,
                    hops,
                    "Answering locally ({:?})",
                    reason
                );
                Ok(Reply {
                    status: StatusCode::OK,
                    body: Bytes::from_static(HELLO_BODY.as_bytes()),
                    content_type: Some("text/plain; charset=utf-8".to_string()),
                    served_by: Some(self.identity.name.clone()),
                    correlation,
                })
            }
            Decision::Forward { name, addr } => {
                tracing::debug!(
                    correlation = %correlation,
                    hops,
                    "Forwarding to {} at {}",
                    name,
                    addr
                );
                self.forwarder
                    .forward(&name, &addr, &correlation, hops + 1)
                    .await
            }
        }
    }
}
