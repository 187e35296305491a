//! Service Node Protocol
//!
//! Endpoints and headers served by every node.

use axum::http::{HeaderMap, HeaderValue};
use std::fmt;

/// Business endpoint answered locally or forwarded.
pub const ENDPOINT_HELLO: &str = "/hello";
/// Push receiver (POST) and cache inspection (GET).
pub use crate::discovery::protocol::ENDPOINT_REGISTRY as ENDPOINT_PUSH;

/// Opaque token identifying one request chain.
pub const HEADER_CORRELATION_ID: &str = "x-correlation-id";
/// Number of forwards made before reaching the current node.
pub const HEADER_HOPS: &str = "x-mesh-hops";
/// Name of the node that produced the answer.
pub const HEADER_SERVED_BY: &str = "x-served-by";

pub const HELLO_BODY: &str = "Hello, world!\n";

/// Correlation token threaded through every forwarded call. Never interpreted.
///
/// Holds the header bytes as received, so tokens that are not valid UTF-8
/// are relayed and echoed exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CorrelationToken(HeaderValue);

impl CorrelationToken {
    pub fn generate() -> Self {
        let id = uuid::Uuid::new_v4().to_string();
        // A hyphenated uuid is plain ASCII.
        Self(HeaderValue::from_str(&id).unwrap_or_else(|_| HeaderValue::from_static("generated")))
    }

    /// Panics if `token` is not a legal header value.
    pub fn from_static(token: &'static str) -> Self {
        Self(HeaderValue::from_static(token))
    }

    /// The caller's token, unless the header is missing or blank.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        headers
            .get(HEADER_CORRELATION_ID)
            .filter(|value| !value.as_bytes().iter().all(u8::is_ascii_whitespace))
            .map(|value| Self(value.clone()))
    }

    pub fn header_value(&self) -> &HeaderValue {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for CorrelationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(self.as_bytes()))
    }
}

/// Hop count from the request headers. Missing or garbled counts as 0.
pub fn hops_from_headers(headers: &HeaderMap) -> u32 {
    headers
        .get(HEADER_HOPS)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(0)
}
