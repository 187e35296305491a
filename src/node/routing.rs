//! Routing policy: answer here, or hand the request to a random peer.

use std::sync::Arc;

use super::random::RandomSource;
use crate::registry::types::Snapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationReason {
    /// The snapshot holds a single entry that is not this node.
    SoleMember,
    /// The termination draw came up.
    Drawn,
    /// Nothing but this node is known (includes an empty snapshot).
    NoPeers,
    /// The hop limit was reached.
    HopLimit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Local(TerminationReason),
    Forward { name: String, addr: String },
}

pub struct RoutingPolicy {
    termination_probability: f64,
    max_hops: u32,
    random: Arc<dyn RandomSource>,
}

impl RoutingPolicy {
    pub fn new(termination_probability: f64, max_hops: u32, random: Arc<dyn RandomSource>) -> Self {
        Self {
            termination_probability: termination_probability.clamp(0.0, 1.0),
            max_hops,
            random,
        }
    }

    pub fn termination_probability(&self) -> f64 {
        self.termination_probability
    }

    pub fn max_hops(&self) -> u32 {
        self.max_hops
    }

    /// Decides for a request that has already been forwarded `hops` times.
    pub fn decide(&self, snapshot: &Snapshot, own_name: &str, hops: u32) -> Decision {
        if hops >= self.max_hops {
            return Decision::Local(TerminationReason::HopLimit);
        }

        let peers: Vec<(&str, &str)> = snapshot.peers_excluding(own_name).collect();
        if peers.is_empty() {
            return Decision::Local(TerminationReason::NoPeers);
        }
        if snapshot.len() == 1 {
            return Decision::Local(TerminationReason::SoleMember);
        }
        if self.random.unit() < self.termination_probability {
            return Decision::Local(TerminationReason::Drawn);
        }

        let (name, addr) = peers[self.random.below(peers.len())];
        Decision::Forward {
            name: name.to_string(),
            addr: addr.to_string(),
        }
    }
}
