//! Service Node Module
//!
//! A mesh participant. It registers with the discovery service, keeps the last pushed
//! snapshot, and answers `/hello` either locally or by forwarding to a random peer.
//!
//! ## Core Mechanisms
//! - **Lifecycle**: `Unregistered -> Registering -> Registered -> Unregistering -> Departed`.
//! - **Snapshot cache**: pushes replace the cached snapshot wholesale; stale versions from
//!   the same discovery epoch are ignored.
//! - **Routing**: terminate with probability `p` (or when no peer is left, or at the hop
//!   limit), otherwise forward to a uniformly chosen peer. Chains end almost surely.
//! - **Correlation**: a token rides along every forward so an observer can rebuild the chain.

pub mod cache;
pub mod client;
pub mod forward;
pub mod handlers;
pub mod identity;
pub mod lifecycle;
pub mod protocol;
pub mod random;
pub mod routing;
pub mod server;
pub mod service;

#[cfg(test)]
mod tests;
