use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A point-in-time, read-only copy of the registry.
///
/// This is also the push payload sent to every member. `epoch` identifies the store
/// instance that produced it and `version` orders snapshots within one epoch. Both
/// default when missing so a bare `{"addrByName": {...}}` body is still accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub epoch: String,
    #[serde(default)]
    pub version: u64,
    pub addr_by_name: BTreeMap<String, String>,
}

impl Snapshot {
    pub fn new(epoch: impl Into<String>) -> Self {
        Self {
            epoch: epoch.into(),
            version: 0,
            addr_by_name: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.addr_by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addr_by_name.is_empty()
    }

    pub fn addr_of(&self, name: &str) -> Option<&str> {
        self.addr_by_name.get(name).map(String::as_str)
    }

    /// All entries except `own_name`, in name order.
    pub fn peers_excluding<'a>(&'a self, own_name: &'a str) -> impl Iterator<Item = (&'a str, &'a str)> {
        self.addr_by_name
            .iter()
            .filter(move |(name, _)| name.as_str() != own_name)
            .map(|(name, addr)| (name.as_str(), addr.as_str()))
    }

    /// Whether `self` should replace `current` in a node's cache.
    ///
    /// Within one epoch only strictly newer versions win. Version 0 means the sender
    /// does not version its snapshots, so it always wins.
    pub fn supersedes(&self, current: &Snapshot) -> bool {
        if self.version == 0 || self.epoch != current.epoch {
            return true;
        }
        self.version > current.version
    }
}
