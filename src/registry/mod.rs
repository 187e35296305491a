//! Registry Module
//!
//! The authoritative `name -> address` mapping owned by the discovery service.
//!
//! ## Core Concepts
//! - **Copy-on-write**: every mutation builds a fresh `Snapshot` and swaps the shared
//!   pointer, so readers holding an `Arc<Snapshot>` never see a half-applied change.
//! - **Versioning**: each store has a random `epoch` and a `version` bumped on every
//!   effective change, letting receivers drop pushes that arrive out of order.

pub mod store;
pub mod types;
