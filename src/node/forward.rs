//! Forwarding a request to a peer and relaying its answer.

use axum::body::{Body, Bytes};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use std::time::Duration;

use super::protocol::{
    CorrelationToken, ENDPOINT_HELLO, HEADER_CORRELATION_ID, HEADER_HOPS, HEADER_SERVED_BY,
};
use crate::discovery::protocol::http_url;
use crate::error::MeshError;

/// An answer to `/hello`, produced here or relayed from a peer.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: StatusCode,
    pub body: Bytes,
    pub content_type: Option<String>,
    pub served_by: Option<String>,
    pub correlation: CorrelationToken,
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;

        let headers = response.headers_mut();
        headers.insert(HEADER_CORRELATION_ID, self.correlation.header_value().clone());
        if let Some(served_by) = self.served_by
            && let Ok(value) = HeaderValue::from_str(&served_by)
        {
            headers.insert(HEADER_SERVED_BY, value);
        }
        if let Some(content_type) = self.content_type
            && let Ok(value) = HeaderValue::from_str(&content_type)
        {
            headers.insert(axum::http::header::CONTENT_TYPE, value);
        }

        response
    }
}

pub struct Forwarder {
    http_client: reqwest::Client,
    timeout: Duration,
}

impl Forwarder {
    pub fn new(timeout: Duration) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            timeout,
        }
    }

    /// Sends the request on to `addr` as hop `hops` and relays the peer's answer.
    ///
    /// Any peer status is relayed as-is; only transport failures become errors.
    pub async fn forward(
        &self,
        peer: &str,
        addr: &str,
        correlation: &CorrelationToken,
        hops: u32,
    ) -> Result<Reply, MeshError> {
        let routing_failure = |reason: String| MeshError::RoutingFailure {
            peer: peer.to_string(),
            reason,
        };

        let response = self
            .http_client
            .get(http_url(addr, ENDPOINT_HELLO))
            .header(HEADER_CORRELATION_ID, correlation.header_value().clone())
            .header(HEADER_HOPS, hops.to_string())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| routing_failure(e.to_string()))?;

        let status = StatusCode::from_u16(response.status().as_u16())
            .unwrap_or(StatusCode::BAD_GATEWAY);
        let header = |name: &str| {
            response
                .headers()
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
        };
        let served_by = header(HEADER_SERVED_BY);
        let content_type = header(reqwest::header::CONTENT_TYPE.as_str());

        let body = response
            .bytes()
            .await
            .map_err(|e| routing_failure(e.to_string()))?;

        Ok(Reply {
            status,
            body,
            content_type,
            served_by,
            correlation: correlation.clone(),
        })
    }
}
