use std::net::SocketAddr;
use tokio::net::TcpListener;

use super::random::RandomSource;
use crate::error::MeshError;

pub const RANDOM_PORT_MIN: u16 = 1025;
pub const RANDOM_PORT_MAX: u16 = 65535;
const RANDOM_PORT_ATTEMPTS: usize = 8;

/// Who this node is. Fixed for the life of the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeIdentity {
    pub name: String,
    /// `host:port` other members use to reach this node.
    pub addr: String,
}

/// Binds the node's listener and derives its identity from the bound port.
///
/// `advertise` is the host peers dial; the listener itself binds `host`.
/// With no configured port a random one is tried a few times before giving up.
pub async fn bind_listener(
    name: &str,
    host: &str,
    advertise: &str,
    port: Option<u16>,
    random: &dyn RandomSource,
) -> Result<(TcpListener, NodeIdentity), MeshError> {
    let listener = match port {
        Some(port) => TcpListener::bind((host, port)).await?,
        None => bind_random_port(host, random).await?,
    };

    let local: SocketAddr = listener.local_addr()?;
    let identity = NodeIdentity {
        name: name.to_string(),
        addr: format!("{}:{}", advertise, local.port()),
    };

    Ok((listener, identity))
}

async fn bind_random_port(host: &str, random: &dyn RandomSource) -> Result<TcpListener, MeshError> {
    let mut last_error = None;

    for _ in 0..RANDOM_PORT_ATTEMPTS {
        let port = random.port(RANDOM_PORT_MIN, RANDOM_PORT_MAX);
        match TcpListener::bind((host, port)).await {
            Ok(listener) => return Ok(listener),
            Err(e) => {
                tracing::debug!("Port {} unavailable: {}", port, e);
                last_error = Some(e);
            }
        }
    }

    Err(last_error
        .map(MeshError::Io)
        .unwrap_or_else(|| MeshError::Config("no port attempts made".to_string())))
}
