//! Error types for envetcd operations.

use std::path::PathBuf;
use thiserror::Error;

/// Process exit codes reported by the `envetcd` binary.
///
/// Anything outside this table is the numeric exit status of the child.
pub mod exit {
    /// Child exited 0, or the env-file was written.
    pub const SUCCESS: i32 = 0;
    /// Abnormal child termination, file close failure, anything unclassified.
    pub const GENERIC: i32 = 10;
    /// Command line could not be parsed or is inconsistent.
    pub const PARSE: i32 = 11;
    /// The child could not be started.
    pub const RUNNER: i32 = 12;
    /// The key/value store is unusable.
    pub const STORE: i32 = 13;
}

/// The main error type for envetcd operations.
#[derive(Error, Debug)]
pub enum EnvEtcdError {
    /// A configured peer endpoint could not be parsed
    #[error("malformed peer {peer:?}: {reason}")]
    MalformedPeer {
        /// The peer string as configured
        peer: String,
        /// Why it was rejected
        reason: String,
    },

    /// Cluster sync was requested but no peer answered
    #[error("cluster unreachable, tried: {}", .peers.join(", "))]
    ClusterUnreachable {
        /// Peers that were attempted
        peers: Vec<String>,
    },

    /// A directory or key does not exist in the store
    #[error("key not found: {0}")]
    NotFound(String),

    /// A read against the store failed
    #[error("read of {path} failed: {reason}")]
    Read {
        /// Path being read
        path: String,
        /// Transport or decoding failure
        reason: String,
    },

    /// The child process could not be started
    #[error("failed to start {command:?}")]
    Spawn {
        /// Program name
        command: String,
        /// Underlying OS error
        #[source]
        source: std::io::Error,
    },

    /// The child terminated without an exit status
    #[error("child terminated abnormally: {0}")]
    ChildAbnormal(String),

    /// Opening, writing or closing an output file failed
    #[error("file error on {}", .path.display())]
    File {
        /// File involved
        path: PathBuf,
        /// Underlying OS error
        #[source]
        source: std::io::Error,
    },

    /// Configuration is missing or inconsistent
    #[error("configuration error: {0}")]
    Config(String),

    /// No default gateway could be determined
    #[error("default gateway lookup failed: {0}")]
    Gateway(String),

    /// Default gateway discovery is not available on this platform
    #[error("default gateway discovery is not supported on this platform")]
    GatewayUnsupported,

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EnvEtcdError {
    /// Exit code the process should terminate with for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            EnvEtcdError::MalformedPeer { .. } | EnvEtcdError::ClusterUnreachable { .. } => {
                exit::STORE
            }
            EnvEtcdError::Spawn { .. } => exit::RUNNER,
            EnvEtcdError::Config(_) => exit::PARSE,
            _ => exit::GENERIC,
        }
    }
}

/// A specialized Result type for envetcd operations.
pub type Result<T> = std::result::Result<T, EnvEtcdError>;
