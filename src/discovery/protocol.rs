//! Discovery Network Protocol
//!
//! Endpoints and DTOs exchanged between service nodes and the discovery service.

use serde::{Deserialize, Serialize};

// --- API Endpoints ---

/// Adds or replaces a member.
pub const ENDPOINT_REGISTER: &str = "/register";
/// Removes a member.
pub const ENDPOINT_UNREGISTER: &str = "/unregister";
/// Full snapshot (epoch, version and mapping). On nodes the same path receives pushes.
pub const ENDPOINT_REGISTRY: &str = "/registry";
/// Plain `name -> addr` map.
pub const ENDPOINT_SERVICES: &str = "/services";

// --- Data Transfer Objects ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub addr: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnregisterRequest {
    pub name: String,
}

/// Builds a URL for `path` on a member address.
///
/// Registry addresses are plain `host:port`; an address that already has a scheme is
/// used as-is.
pub fn http_url(addr: &str, path: &str) -> String {
    let base = addr.trim_end_matches('/');
    if base.starts_with("http://") || base.starts_with("https://") {
        format!("{}{}", base, path)
    } else {
        format!("http://{}{}", base, path)
    }
}
