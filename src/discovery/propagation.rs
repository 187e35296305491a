//! Snapshot propagation.
//!
//! Every push is its own tokio task. Nothing waits for it, nothing retries it, and a
//! failure never reaches the register/unregister caller.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use super::protocol::{ENDPOINT_REGISTRY, http_url};
use crate::error::MeshError;
use crate::registry::types::Snapshot;

pub type PushFuture = Pin<Box<dyn Future<Output = Result<(), MeshError>> + Send>>;

/// Delivers one snapshot to one member.
pub trait SnapshotPusher: Send + Sync {
    fn push(&self, name: String, addr: String, snapshot: Arc<Snapshot>) -> PushFuture;
}

/// Posts the snapshot as JSON to the member's `/registry` endpoint.
pub struct HttpPusher {
    http_client: reqwest::Client,
    timeout: Duration,
}

impl HttpPusher {
    pub fn new(timeout: Duration) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            timeout,
        }
    }
}

impl SnapshotPusher for HttpPusher {
    fn push(&self, _name: String, addr: String, snapshot: Arc<Snapshot>) -> PushFuture {
        let client = self.http_client.clone();
        let timeout = self.timeout;

        Box::pin(async move {
            let url = http_url(&addr, ENDPOINT_REGISTRY);
            let response = client
                .post(url)
                .json(&*snapshot)
                .timeout(timeout)
                .send()
                .await
                .map_err(|e| MeshError::PropagationFailure {
                    addr: addr.clone(),
                    reason: e.to_string(),
                })?;

            if !response.status().is_success() {
                return Err(MeshError::PropagationFailure {
                    addr,
                    reason: format!("status {}", response.status()),
                });
            }

            Ok(())
        })
    }
}

/// Handles of the pushes spawned for one mutation.
///
/// Dropping it detaches the pushes. Tests await `settled` to observe delivery.
#[must_use = "drop to detach the pushes, or await settled()"]
pub struct Propagation {
    handles: Vec<JoinHandle<()>>,
}

impl Propagation {
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub async fn settled(self) {
        for handle in self.handles {
            let _ = handle.await;
        }
    }
}

/// Spawns one push per address in `snapshot`, including freshly added members.
pub fn propagate(pusher: &Arc<dyn SnapshotPusher>, snapshot: Arc<Snapshot>) -> Propagation {
    let handles = snapshot
        .addr_by_name
        .iter()
        .map(|(name, addr)| {
            let push = pusher.push(name.clone(), addr.clone(), snapshot.clone());
            let name = name.clone();
            let version = snapshot.version;

            tokio::spawn(async move {
                match push.await {
                    Ok(()) => {
                        tracing::debug!("Pushed snapshot v{} to {}", version, name);
                    }
                    Err(e) => {
                        tracing::warn!("Dropped snapshot v{} for {}: {}", version, name, e);
                    }
                }
            })
        })
        .collect();

    Propagation { handles }
}
