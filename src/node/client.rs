//! Calls from a node to the discovery service.

use std::time::Duration;

use crate::discovery::protocol::{
    ENDPOINT_REGISTER, ENDPOINT_UNREGISTER, RegisterRequest, UnregisterRequest, http_url,
};
use crate::error::MeshError;

use super::identity::NodeIdentity;

pub struct DiscoveryClient {
    http_client: reqwest::Client,
    base_url: String,
    timeout: Duration,
    attempts: usize,
}

impl DiscoveryClient {
    pub fn new(base_url: &str, timeout: Duration, attempts: usize) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            attempts: attempts.max(1),
        }
    }

    async fn post_with_retry<T: serde::Serialize>(
        &self,
        path: &str,
        payload: &T,
        attempts: usize,
    ) -> Result<(), String> {
        let url = http_url(&self.base_url, path);
        let mut delay_ms = 150u64;
        let mut last_error = String::from("no attempt made");

        for attempt in 0..attempts {
            let response = self
                .http_client
                .post(url.clone())
                .json(payload)
                .timeout(self.timeout)
                .send()
                .await;

            match response {
                Ok(resp) if resp.status().is_success() => return Ok(()),
                Ok(resp) => last_error = format!("status {}", resp.status()),
                Err(e) => last_error = e.to_string(),
            }

            if attempt + 1 < attempts {
                tracing::warn!(
                    "POST {} failed (attempt {}/{}): {}",
                    path,
                    attempt + 1,
                    attempts,
                    last_error
                );
                let jitter = rand::random::<u64>() % 50;
                tokio::time::sleep(Duration::from_millis(delay_ms + jitter)).await;
                delay_ms = (delay_ms * 2).min(1200);
            }
        }

        Err(last_error)
    }

    /// Registers `identity`, retrying a bounded number of times.
    pub async fn register(&self, identity: &NodeIdentity) -> Result<(), MeshError> {
        let payload = RegisterRequest {
            name: identity.name.clone(),
            addr: identity.addr.clone(),
        };

        self.post_with_retry(ENDPOINT_REGISTER, &payload, self.attempts)
            .await
            .map_err(|reason| {
                MeshError::RegistrationFailure(format!(
                    "{} via {}: {}",
                    identity.name, self.base_url, reason
                ))
            })
    }

    /// Single best-effort unregistration.
    pub async fn unregister(&self, name: &str) -> Result<(), MeshError> {
        let payload = UnregisterRequest {
            name: name.to_string(),
        };

        self.post_with_retry(ENDPOINT_UNREGISTER, &payload, 1)
            .await
            .map_err(|reason| {
                MeshError::RegistrationFailure(format!("unregister {}: {}", name, reason))
            })
    }
}
