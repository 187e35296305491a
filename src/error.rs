//! Error types shared by the discovery service and the service nodes.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MeshError {
    /// Malformed register/unregister/push body. State is left untouched.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The node could not register with the discovery service. Fatal at startup.
    #[error("Registration failed: {0}")]
    RegistrationFailure(String),

    /// A snapshot push to a member failed. Logged and dropped by the caller.
    #[error("Push to {addr} failed: {reason}")]
    PropagationFailure { addr: String, reason: String },

    /// The chosen peer could not be reached while forwarding.
    #[error("Forward to {peer} failed: {reason}")]
    RoutingFailure { peer: String, reason: String },

    #[error("Invalid lifecycle transition: {0}")]
    Lifecycle(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl MeshError {
    pub fn kind(&self) -> &'static str {
        match self {
            MeshError::InvalidRequest(_) => "invalid_request",
            MeshError::RegistrationFailure(_) => "registration_failure",
            MeshError::PropagationFailure { .. } => "propagation_failure",
            MeshError::RoutingFailure { .. } => "routing_failure",
            MeshError::Lifecycle(_) => "lifecycle",
            MeshError::Config(_) => "config",
            MeshError::Serialization(_) => "serialization",
            MeshError::Io(_) => "io",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            MeshError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            MeshError::RoutingFailure { .. } => StatusCode::BAD_GATEWAY,
            MeshError::RegistrationFailure(_) | MeshError::PropagationFailure { .. } => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for MeshError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::warn!("Rejected request: {}", self);
        }

        let body = Json(ErrorBody {
            error: self.kind(),
            message: self.to_string(),
        });

        (status, body).into_response()
    }
}
