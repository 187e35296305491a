use axum::body::Bytes;
use axum::extract::Extension;
use axum::http::StatusCode;
use axum::Json;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::protocol::{RegisterRequest, UnregisterRequest};
use super::service::DiscoveryService;
use crate::error::MeshError;
use crate::registry::types::Snapshot;

/// Parses a JSON body without relying on the content type.
pub fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, MeshError> {
    serde_json::from_slice(body).map_err(|e| MeshError::InvalidRequest(e.to_string()))
}

pub async fn handle_register(
    Extension(discovery): Extension<Arc<DiscoveryService>>,
    body: Bytes,
) -> Result<StatusCode, MeshError> {
    let req: RegisterRequest = parse_body(&body)?;
    // Pushes keep running after the response.
    let _ = discovery.register(req)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn handle_unregister(
    Extension(discovery): Extension<Arc<DiscoveryService>>,
    body: Bytes,
) -> Result<StatusCode, MeshError> {
    let req: UnregisterRequest = parse_body(&body)?;
    let _ = discovery.unregister(req)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn handle_get_registry(
    Extension(discovery): Extension<Arc<DiscoveryService>>,
) -> Json<Snapshot> {
    Json(Snapshot::clone(&discovery.snapshot()))
}

pub async fn handle_get_services(
    Extension(discovery): Extension<Arc<DiscoveryService>>,
) -> Json<BTreeMap<String, String>> {
    Json(discovery.snapshot().addr_by_name.clone())
}
