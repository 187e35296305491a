use parking_lot::RwLock;
use std::sync::Arc;

use super::types::Snapshot;

/// In-memory registry with copy-on-write snapshots.
///
/// Writers serialize on the lock while building the next snapshot. Readers only hold
/// the lock long enough to clone the `Arc`.
pub struct RegistryStore {
    current: RwLock<Arc<Snapshot>>,
}

/// Result of a mutation: the snapshot that is current right after it, and whether the
/// mapping actually changed.
#[derive(Debug, Clone)]
pub struct Mutation {
    pub snapshot: Arc<Snapshot>,
    pub changed: bool,
}

impl RegistryStore {
    pub fn new() -> Self {
        Self::with_epoch(uuid::Uuid::new_v4().to_string())
    }

    pub fn with_epoch(epoch: impl Into<String>) -> Self {
        Self {
            current: RwLock::new(Arc::new(Snapshot::new(epoch))),
        }
    }

    /// Inserts or overwrites `name`. Re-registering an identical pair changes nothing.
    pub fn register(&self, name: &str, addr: &str) -> Mutation {
        let mut current = self.current.write();

        if current.addr_of(name) == Some(addr) {
            return Mutation {
                snapshot: Arc::clone(&current),
                changed: false,
            };
        }

        let mut next = Snapshot::clone(&current);
        next.addr_by_name.insert(name.to_string(), addr.to_string());
        next.version += 1;

        let next = Arc::new(next);
        *current = Arc::clone(&next);

        Mutation {
            snapshot: next,
            changed: true,
        }
    }

    /// Removes `name`. Removing an absent name is a no-op.
    pub fn unregister(&self, name: &str) -> Mutation {
        let mut current = self.current.write();

        if current.addr_of(name).is_none() {
            return Mutation {
                snapshot: Arc::clone(&current),
                changed: false,
            };
        }

        let mut next = Snapshot::clone(&current);
        next.addr_by_name.remove(name);
        next.version += 1;

        let next = Arc::new(next);
        *current = Arc::clone(&next);

        Mutation {
            snapshot: next,
            changed: true,
        }
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.current.read())
    }

    pub fn len(&self) -> usize {
        self.current.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.read().is_empty()
    }
}

impl Default for RegistryStore {
    fn default() -> Self {
        Self::new()
    }
}
