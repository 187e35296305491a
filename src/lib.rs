//! Service Mesh Simulation Library
//!
//! A discovery authority keeps the set of named service endpoints and pushes full
//! membership snapshots to every member on change. Service nodes register themselves,
//! cache the last snapshot they were pushed, and route each request either by answering
//! locally or by forwarding to a random peer.
//!
//! ## Architecture Modules
//! - **`registry`**: the copy-on-write `name -> address` store and its `Snapshot` type.
//! - **`discovery`**: the HTTP discovery service; mutates the registry and fans out
//!   best-effort pushes.
//! - **`node`**: a mesh participant; lifecycle, snapshot cache, routing policy and
//!   request forwarding with correlation tokens.
//! - **`config`**, **`error`**, **`shutdown`**, **`telemetry`**: process plumbing.

pub mod config;
pub mod discovery;
pub mod error;
pub mod node;
pub mod registry;
pub mod shutdown;
pub mod telemetry;
