//! Process configuration for both roles.
//!
//! Flags are parsed by hand from `std::env::args()`; a few values fall back to
//! environment variables (`NAME`, `PORT`, `DISCOVERY_ADDR`, `ADVERTISE_HOST`).

use std::net::SocketAddr;
use std::time::Duration;

use crate::error::MeshError;

pub const DEFAULT_DISCOVERY_BIND: &str = "127.0.0.1:8090";
pub const DEFAULT_DISCOVERY_URL: &str = "http://localhost:8090";
pub const DEFAULT_TERMINATION_PROBABILITY: f64 = 0.1;
pub const DEFAULT_MAX_HOPS: u32 = 16;

#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    pub bind: SocketAddr,
    pub push_timeout: Duration,
    pub shutdown_grace: Duration,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8090)),
            push_timeout: Duration::from_millis(1000),
            shutdown_grace: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub name: String,
    pub host: String,
    /// Host published to the registry. Falls back to `host`.
    pub advertise_host: Option<String>,
    /// `None` picks a random port.
    pub port: Option<u16>,
    pub discovery_url: String,
    pub termination_probability: f64,
    pub max_hops: u32,
    pub forward_timeout: Duration,
    pub register_timeout: Duration,
    pub register_attempts: usize,
    pub shutdown_grace: Duration,
    /// Seeds the random source for reproducible routing.
    pub seed: Option<u64>,
}

impl NodeConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            host: "127.0.0.1".to_string(),
            advertise_host: None,
            port: None,
            discovery_url: DEFAULT_DISCOVERY_URL.to_string(),
            termination_probability: DEFAULT_TERMINATION_PROBABILITY,
            max_hops: DEFAULT_MAX_HOPS,
            forward_timeout: Duration::from_secs(10),
            register_timeout: Duration::from_millis(1000),
            register_attempts: 3,
            shutdown_grace: Duration::from_secs(5),
            seed: None,
        }
    }

    /// The host peers should dial, which is not always the bind host.
    pub fn advertised_host(&self) -> &str {
        self.advertise_host.as_deref().unwrap_or(&self.host)
    }

    pub fn validate(&self) -> Result<(), MeshError> {
        if self.name.trim().is_empty() {
            return Err(MeshError::Config("node name must not be empty".to_string()));
        }
        if is_unspecified_host(self.advertised_host()) {
            return Err(MeshError::Config(format!(
                "cannot advertise wildcard host {}; pass --advertise-host",
                self.advertised_host()
            )));
        }
        if !(0.0..=1.0).contains(&self.termination_probability) {
            return Err(MeshError::Config(format!(
                "termination probability {} is outside [0, 1]",
                self.termination_probability
            )));
        }
        if self.register_attempts == 0 {
            return Err(MeshError::Config(
                "register attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Flags accepted after `node`. Each one takes a value.
const NODE_FLAGS: &[&str] = &[
    "--name",
    "--host",
    "--advertise-host",
    "--port",
    "--discovery",
    "--termination-probability",
    "--max-hops",
    "--forward-timeout-ms",
    "--register-attempts",
    "--grace-ms",
    "--seed",
];

/// Wildcard bind addresses are reachable locally but useless to peers.
fn is_unspecified_host(host: &str) -> bool {
    let host = host.trim();
    let bare = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);
    host.is_empty()
        || bare
            .parse::<std::net::IpAddr>()
            .is_ok_and(|ip| ip.is_unspecified())
}

fn value<'a>(args: &'a [String], i: usize, flag: &str) -> Result<&'a str, MeshError> {
    args.get(i + 1)
        .map(String::as_str)
        .ok_or_else(|| MeshError::Config(format!("{} requires a value", flag)))
}

fn parse<T: std::str::FromStr>(raw: &str, flag: &str) -> Result<T, MeshError>
where
    T::Err: std::fmt::Display,
{
    raw.parse()
        .map_err(|e: T::Err| MeshError::Config(format!("invalid value for {}: {}", flag, e)))
}

/// Parses the flags after `discovery`.
pub fn parse_discovery_args(args: &[String]) -> Result<DiscoveryConfig, MeshError> {
    let mut config = DiscoveryConfig::default();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--bind" => {
                config.bind = parse(value(args, i, "--bind")?, "--bind")?;
                i += 2;
            }
            "--push-timeout-ms" => {
                let ms: u64 = parse(value(args, i, "--push-timeout-ms")?, "--push-timeout-ms")?;
                config.push_timeout = Duration::from_millis(ms);
                i += 2;
            }
            "--grace-ms" => {
                let ms: u64 = parse(value(args, i, "--grace-ms")?, "--grace-ms")?;
                config.shutdown_grace = Duration::from_millis(ms);
                i += 2;
            }
            other => {
                return Err(MeshError::Config(format!("unknown flag {}", other)));
            }
        }
    }

    Ok(config)
}

/// Parses the flags after `node`, using `env` for fallbacks.
pub fn parse_node_args<F>(args: &[String], env: F) -> Result<NodeConfig, MeshError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = NodeConfig::new(env("NAME").unwrap_or_default());
    if let Some(port) = env("PORT") {
        config.port = Some(parse(&port, "PORT")?);
    }
    if let Some(url) = env("DISCOVERY_ADDR") {
        config.discovery_url = url;
    }
    if let Some(host) = env("ADVERTISE_HOST") {
        config.advertise_host = Some(host);
    }

    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        if !NODE_FLAGS.contains(&flag) {
            return Err(MeshError::Config(format!("unknown flag {}", flag)));
        }
        let raw = value(args, i, flag)?;
        match flag {
            "--name" => config.name = raw.to_string(),
            "--host" => config.host = raw.to_string(),
            "--advertise-host" => config.advertise_host = Some(raw.to_string()),
            "--port" => config.port = Some(parse(raw, flag)?),
            "--discovery" => config.discovery_url = raw.to_string(),
            "--termination-probability" => config.termination_probability = parse(raw, flag)?,
            "--max-hops" => config.max_hops = parse(raw, flag)?,
            "--forward-timeout-ms" => {
                config.forward_timeout = Duration::from_millis(parse(raw, flag)?)
            }
            "--register-attempts" => config.register_attempts = parse(raw, flag)?,
            "--grace-ms" => config.shutdown_grace = Duration::from_millis(parse(raw, flag)?),
            "--seed" => config.seed = Some(parse(raw, flag)?),
            other => {
                return Err(MeshError::Config(format!("unknown flag {}", other)));
            }
        }
        i += 2;
    }

    config.validate()?;
    Ok(config)
}
