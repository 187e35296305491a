use axum::body::Bytes;
use axum::extract::Extension;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use std::sync::Arc;

use super::forward::Reply;
use super::protocol::{CorrelationToken, hops_from_headers};
use super::service::ServiceNode;
use crate::discovery::handlers::parse_body;
use crate::error::MeshError;
use crate::registry::types::Snapshot;

/// Push receiver. Stale pushes are acknowledged but not applied.
pub async fn handle_push(
    Extension(node): Extension<Arc<ServiceNode>>,
    body: Bytes,
) -> Result<StatusCode, MeshError> {
    let snapshot: Snapshot = parse_body(&body)?;
    node.apply_snapshot(snapshot);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn handle_get_snapshot(Extension(node): Extension<Arc<ServiceNode>>) -> Json<Snapshot> {
    Json(Snapshot::clone(&node.snapshot()))
}

pub async fn handle_hello(
    Extension(node): Extension<Arc<ServiceNode>>,
    headers: HeaderMap,
) -> Result<Reply, MeshError> {
    let correlation = CorrelationToken::from_headers(&headers);
    let hops = hops_from_headers(&headers);
    node.handle_hello(correlation, hops).await
}
