//! Configuration types and structures.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// Accumulated environment mapping.
///
/// A `BTreeMap` so enumeration is always key-sorted.
pub type EnvMap = BTreeMap<String, String>;

/// Default peer when none is configured.
pub const DEFAULT_PEER: &str = "127.0.0.1:4001";

/// Default root prefix for all tiers.
pub const DEFAULT_PREFIX: &str = "/config";

/// Default connect timeout to the store.
pub const DEFAULT_DIAL_TIMEOUT: Duration = Duration::from_secs(1);

/// TLS material for talking to the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TlsConfig {
    /// CA certificate (PEM) used to verify peers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ca_file: Option<PathBuf>,
    /// Client certificate (PEM)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cert_file: Option<PathBuf>,
    /// Client private key (PEM)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_file: Option<PathBuf>,
}

impl TlsConfig {
    /// Whether any TLS material was configured.
    pub fn is_configured(&self) -> bool {
        self.ca_file.is_some() || self.cert_file.is_some() || self.key_file.is_some()
    }
}

/// Everything the resolver and supervisor need, built once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Store endpoints, in the order they are tried
    pub peers: Vec<String>,
    /// TLS material
    #[serde(default)]
    pub tls: TlsConfig,
    /// Refresh the peer list from the cluster before reading
    pub sync: bool,
    /// Root prefix of the tier directories
    pub prefix: String,
    /// System tier selector
    #[serde(default)]
    pub system: String,
    /// Service tier selector
    #[serde(default)]
    pub service: String,
    /// Host tier selector
    #[serde(default)]
    pub hostname: String,
    /// Replace characters outside `[A-Za-z0-9_]` in key names
    pub sanitize: bool,
    /// Upper-case key names
    pub upcase: bool,
    /// Start the child with an empty environment
    pub clean_env: bool,
    /// Export the default gateway as `ENVETCD_DEFAULT_GATEWAY`
    pub use_default_gateway: bool,
    /// Write an env-file here instead of running a command
    #[serde(skip_serializing_if = "Option::is_none")]
    pub write_env: Option<PathBuf>,
    /// Redirect child stdout to this file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    /// Connect timeout to the store
    #[serde(with = "duration_millis", default = "default_dial_timeout")]
    pub dial_timeout: Duration,
    /// Child argv
    #[serde(default)]
    pub command: Vec<String>,
}

fn default_dial_timeout() -> Duration {
    DEFAULT_DIAL_TIMEOUT
}

impl Default for Config {
    fn default() -> Self {
        Self {
            peers: vec![DEFAULT_PEER.to_string()],
            tls: TlsConfig::default(),
            sync: true,
            prefix: DEFAULT_PREFIX.to_string(),
            system: String::new(),
            service: String::new(),
            hostname: String::new(),
            sanitize: true,
            upcase: true,
            clean_env: false,
            use_default_gateway: false,
            write_env: None,
            output: None,
            dial_timeout: DEFAULT_DIAL_TIMEOUT,
            command: Vec::new(),
        }
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
