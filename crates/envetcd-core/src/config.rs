//! Configuration normalization for envetcd.
//!
//! The command line produces a raw [`Config`]; [`normalize`] turns it into
//! the record the resolver consumes:
//!
//! 1. Peers get a scheme when they lack one and are validated
//! 2. An empty system selector is derived from the service selector
//! 3. The prefix loses any trailing slash
//! 4. Flag combinations are checked
//!
//! Normalization runs exactly once, before any store reads.

use envetcd_types::config::{Config, DEFAULT_PEER};
use envetcd_types::{EnvEtcdError, Result};
use tracing::{debug, warn};
use url::Url;

/// Give `peer` an `http://` scheme when it has none, and validate it.
///
/// The returned string has no trailing slash.
///
/// # Errors
///
/// Returns [`EnvEtcdError::MalformedPeer`] when the result is not a URL with
/// a host.
pub fn coerce_peer(peer: &str) -> Result<String> {
    let peer = peer.trim();
    let candidate = if peer.contains("://") {
        peer.to_string()
    } else {
        format!("http://{}", peer)
    };

    let url = Url::parse(&candidate).map_err(|e| EnvEtcdError::MalformedPeer {
        peer: peer.to_string(),
        reason: e.to_string(),
    })?;

    if !url.has_host() || url.host_str().map_or(true, str::is_empty) {
        return Err(EnvEtcdError::MalformedPeer {
            peer: peer.to_string(),
            reason: "missing host".to_string(),
        });
    }

    Ok(candidate.trim_end_matches('/').to_string())
}

/// Coerce every configured peer, falling back to the default peer when none are given.
pub fn coerce_peers(peers: &[String]) -> Result<Vec<String>> {
    let peers: Vec<&str> = peers
        .iter()
        .map(String::as_str)
        .filter(|p| !p.trim().is_empty())
        .collect();

    if peers.is_empty() {
        return Ok(vec![coerce_peer(DEFAULT_PEER)?]);
    }

    peers.into_iter().map(coerce_peer).collect()
}

/// The system selector implied by a service name: everything before the first `-`.
pub fn derive_system(service: &str) -> &str {
    service.split('-').next().unwrap_or_default()
}

/// Hostname reported by the OS, or an empty string if it cannot be read.
#[cfg(unix)]
pub fn default_hostname() -> String {
    match nix::unistd::gethostname() {
        Ok(name) => name.to_string_lossy().into_owned(),
        Err(e) => {
            debug!(error = %e, "could not read OS hostname");
            String::new()
        }
    }
}

/// Hostname reported by the OS, or an empty string if it cannot be read.
#[cfg(not(unix))]
pub fn default_hostname() -> String {
    std::env::var("COMPUTERNAME").unwrap_or_default()
}

/// Normalize a raw configuration into the record used for resolution.
///
/// # Errors
///
/// - [`EnvEtcdError::MalformedPeer`] for an unparsable peer
/// - [`EnvEtcdError::Config`] when no command is given without `write_env`,
///   or when only one of the client certificate and key is set
pub fn normalize(mut config: Config) -> Result<Config> {
    config.peers = coerce_peers(&config.peers)?;

    if config.system.is_empty() && !config.service.is_empty() {
        config.system = derive_system(&config.service).to_string();
        debug!(system = %config.system, service = %config.service, "derived system from service");
    }

    if config.prefix.len() > 1 {
        config.prefix = config.prefix.trim_end_matches('/').to_string();
    }

    if config.tls.cert_file.is_some() != config.tls.key_file.is_some() {
        return Err(EnvEtcdError::Config(
            "--cert-file and --key-file must be given together".to_string(),
        ));
    }

    match (&config.write_env, config.command.is_empty()) {
        (None, true) => {
            return Err(EnvEtcdError::Config("no command given".to_string()));
        }
        (Some(path), false) => {
            warn!(
                path = %path.display(),
                command = ?config.command,
                "both --write-env and a command were given; writing env file and not running the command"
            );
        }
        _ => {}
    }

    Ok(config)
}
