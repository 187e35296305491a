use parking_lot::RwLock;
use std::sync::Arc;

use crate::registry::types::Snapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    /// Same epoch, not newer than what is cached.
    Stale,
}

/// The node's copy of the last accepted push.
///
/// Replacement swaps the `Arc`, so a reader keeps a consistent snapshot for as long
/// as it holds it.
pub struct SnapshotCache {
    current: RwLock<Arc<Snapshot>>,
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Arc::new(Snapshot::default())),
        }
    }

    pub fn current(&self) -> Arc<Snapshot> {
        Arc::clone(&self.current.read())
    }

    pub fn apply(&self, snapshot: Snapshot) -> ApplyOutcome {
        let mut current = self.current.write();
        if !snapshot.supersedes(&current) {
            return ApplyOutcome::Stale;
        }
        *current = Arc::new(snapshot);
        ApplyOutcome::Applied
    }
}

impl Default for SnapshotCache {
    fn default() -> Self {
        Self::new()
    }
}
