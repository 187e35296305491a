//! Discovery Module
//!
//! The central authority that tracks which service nodes exist and where they live.
//!
//! ## Core Mechanisms
//! - **Registration**: nodes `POST /register` and `POST /unregister`; each call mutates the
//!   `RegistryStore` and is acknowledged before propagation finishes.
//! - **Propagation**: after every call the full snapshot is pushed to every registered
//!   address, each push independent and best-effort (no retry, no rollback).
//! - **Inspection**: `GET /registry` and `GET /services` expose the current state.

pub mod handlers;
pub mod propagation;
pub mod protocol;
pub mod server;
pub mod service;
