use std::sync::Arc;

use super::propagation::{Propagation, SnapshotPusher, propagate};
use super::protocol::{RegisterRequest, UnregisterRequest};
use crate::error::MeshError;
use crate::registry::store::RegistryStore;
use crate::registry::types::Snapshot;

/// Discovery service: the registry plus the push fan-out that follows each call.
pub struct DiscoveryService {
    store: RegistryStore,
    pusher: Arc<dyn SnapshotPusher>,
}

/// What a register/unregister call produced.
pub struct Applied {
    pub snapshot: Arc<Snapshot>,
    pub changed: bool,
    pub propagation: Propagation,
}

impl DiscoveryService {
    pub fn new(store: RegistryStore, pusher: Arc<dyn SnapshotPusher>) -> Arc<Self> {
        Arc::new(Self { store, pusher })
    }

    pub fn register(&self, req: RegisterRequest) -> Result<Applied, MeshError> {
        let name = req.name.trim();
        let addr = req.addr.trim();
        if name.is_empty() {
            return Err(MeshError::InvalidRequest("name must not be empty".to_string()));
        }
        if addr.is_empty() {
            return Err(MeshError::InvalidRequest("addr must not be empty".to_string()));
        }

        let mutation = self.store.register(name, addr);
        if mutation.changed {
            tracing::info!(
                "Registered {} at {} (members={}, v{})",
                name,
                addr,
                mutation.snapshot.len(),
                mutation.snapshot.version
            );
        } else {
            tracing::debug!("{} re-registered at unchanged address {}", name, addr);
        }

        let propagation = propagate(&self.pusher, mutation.snapshot.clone());

        Ok(Applied {
            snapshot: mutation.snapshot,
            changed: mutation.changed,
            propagation,
        })
    }

    pub fn unregister(&self, req: UnregisterRequest) -> Result<Applied, MeshError> {
        let name = req.name.trim();
        if name.is_empty() {
            return Err(MeshError::InvalidRequest("name must not be empty".to_string()));
        }

        let mutation = self.store.unregister(name);
        if mutation.changed {
            tracing::info!(
                "Unregistered {} (members={}, v{})",
                name,
                mutation.snapshot.len(),
                mutation.snapshot.version
            );
        } else {
            tracing::debug!("Unregister for unknown member {}", name);
        }

        let propagation = propagate(&self.pusher, mutation.snapshot.clone());

        Ok(Applied {
            snapshot: mutation.snapshot,
            changed: mutation.changed,
            propagation,
        })
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.store.snapshot()
    }
}
