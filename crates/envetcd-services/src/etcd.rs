//! etcd v2 client implementation.
//!
//! Reads use `GET /v2/keys{path}?recursive=true`; cluster discovery uses
//! `GET /v2/members` and switches to the members' client URLs.

use async_trait::async_trait;
use envetcd_core::config::coerce_peers;
use envetcd_types::config::{Config, TlsConfig, DEFAULT_DIAL_TIMEOUT};
use envetcd_types::{EnvEtcdError, KvStore, Node, Result};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// etcd error code for a missing key.
const ERROR_CODE_KEY_NOT_FOUND: u64 = 100;

/// etcd client configuration.
#[derive(Debug, Clone)]
pub struct EtcdConfig {
    /// Peer endpoints, tried in order
    pub peers: Vec<String>,
    /// TLS material
    pub tls: TlsConfig,
    /// Connect timeout per request
    pub dial_timeout: Duration,
}

impl Default for EtcdConfig {
    fn default() -> Self {
        Self {
            peers: vec!["http://127.0.0.1:4001".to_string()],
            tls: TlsConfig::default(),
            dial_timeout: DEFAULT_DIAL_TIMEOUT,
        }
    }
}

impl From<&Config> for EtcdConfig {
    fn from(config: &Config) -> Self {
        Self {
            peers: config.peers.clone(),
            tls: config.tls.clone(),
            dial_timeout: config.dial_timeout,
        }
    }
}

#[derive(Debug, Deserialize)]
struct KeysResponse {
    node: RawNode,
}

#[derive(Debug, Deserialize)]
struct RawNode {
    #[serde(default)]
    key: Option<String>,
    #[serde(default)]
    dir: bool,
    #[serde(default)]
    value: Option<String>,
    #[serde(default)]
    nodes: Vec<RawNode>,
}

impl RawNode {
    fn into_node(self, fallback_key: &str) -> Node {
        let key = self.key.unwrap_or_else(|| fallback_key.to_string());
        if self.dir {
            let children = self
                .nodes
                .into_iter()
                .map(|child| child.into_node(&key))
                .collect();
            Node::dir(key, children)
        } else {
            Node::leaf(key, self.value.unwrap_or_default())
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(rename = "errorCode")]
    error_code: u64,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct MembersResponse {
    #[serde(default)]
    members: Vec<Member>,
}

#[derive(Debug, Deserialize)]
struct Member {
    #[serde(rename = "clientURLs", default)]
    client_urls: Vec<String>,
}

/// Client for the etcd v2 keys API.
#[derive(Clone)]
pub struct EtcdClient {
    client: Client,
    endpoints: Vec<String>,
}

impl EtcdClient {
    /// Create a new etcd client.
    ///
    /// Peers without a scheme are given `http://`.
    pub fn new(config: EtcdConfig) -> Result<Self> {
        let endpoints = coerce_peers(&config.peers)?;

        let builder = Client::builder().connect_timeout(config.dial_timeout);
        let client = crate::tls::apply(builder, &config.tls)?
            .build()
            .map_err(|e| EnvEtcdError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, endpoints })
    }

    fn keys_url(peer: &str, path: &str) -> Result<Url> {
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{}", path)
        };

        let mut url = Url::parse(&format!("{}/v2/keys{}", peer, path)).map_err(|e| {
            EnvEtcdError::Read {
                path: path.clone(),
                reason: format!("invalid URL: {}", e),
            }
        })?;
        url.query_pairs_mut().append_pair("recursive", "true");
        Ok(url)
    }

    async fn get_from(&self, peer: &str, path: &str) -> std::result::Result<Node, ReadAttempt> {
        let url = Self::keys_url(peer, path).map_err(ReadAttempt::Answered)?;

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ReadAttempt::Unreachable(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .bytes()
            .await
            .map_err(|e| ReadAttempt::Unreachable(e.to_string()))?;

        if !status.is_success() {
            let error: Option<ErrorBody> = serde_json::from_slice(&body).ok();
            let not_found = status == StatusCode::NOT_FOUND
                || error
                    .as_ref()
                    .is_some_and(|e| e.error_code == ERROR_CODE_KEY_NOT_FOUND);
            if not_found {
                return Err(ReadAttempt::Answered(EnvEtcdError::NotFound(path.to_string())));
            }

            let message = error
                .map(|e| e.message)
                .unwrap_or_else(|| String::from_utf8_lossy(&body).into_owned());
            return Err(ReadAttempt::Answered(EnvEtcdError::Read {
                path: path.to_string(),
                reason: format!("etcd request failed ({}): {}", status, message),
            }));
        }

        let decoded: KeysResponse = serde_json::from_slice(&body).map_err(|e| {
            ReadAttempt::Answered(EnvEtcdError::Read {
                path: path.to_string(),
                reason: format!("Failed to parse response: {}", e),
            })
        })?;

        Ok(decoded.node.into_node(path))
    }

    async fn members_from(&self, peer: &str) -> std::result::Result<Vec<String>, String> {
        let url = Url::parse(&format!("{}/v2/members", peer)).map_err(|e| e.to_string())?;

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = resp.status();
        if !status.is_success() {
            return Err(format!("members request failed ({})", status));
        }

        let decoded: MembersResponse = resp.json().await.map_err(|e| e.to_string())?;

        let mut urls: Vec<String> = Vec::new();
        for url in decoded.members.into_iter().flat_map(|m| m.client_urls) {
            let url = url.trim_end_matches('/').to_string();
            if !url.is_empty() && !urls.contains(&url) {
                urls.push(url);
            }
        }
        Ok(urls)
    }
}

/// Outcome of asking a single peer.
enum ReadAttempt {
    /// Peer did not answer; try the next one
    Unreachable(String),
    /// Peer answered; report this to the caller
    Answered(EnvEtcdError),
}

#[async_trait]
impl KvStore for EtcdClient {
    async fn get(&self, path: &str) -> Result<Node> {
        let mut last_failure = String::from("no peers configured");

        for peer in &self.endpoints {
            match self.get_from(peer, path).await {
                Ok(node) => return Ok(node),
                Err(ReadAttempt::Answered(e)) => return Err(e),
                Err(ReadAttempt::Unreachable(reason)) => {
                    debug!(%peer, %path, %reason, "peer did not answer");
                    last_failure = reason;
                }
            }
        }

        Err(EnvEtcdError::Read {
            path: path.to_string(),
            reason: last_failure,
        })
    }

    async fn sync_cluster(&mut self) -> Result<()> {
        let mut discovered = None;

        for peer in &self.endpoints {
            match self.members_from(peer).await {
                Ok(members) if !members.is_empty() => {
                    discovered = Some(members);
                    break;
                }
                Ok(_) => debug!(%peer, "peer reported no members"),
                Err(reason) => debug!(%peer, %reason, "cluster sync failed against peer"),
            }
        }

        match discovered {
            Some(members) => {
                info!(members = %members.join(", "), "synced cluster members");
                self.endpoints = members;
                Ok(())
            }
            None => Err(EnvEtcdError::ClusterUnreachable {
                peers: self.endpoints.clone(),
            }),
        }
    }

    fn cluster_members(&self) -> Vec<String> {
        self.endpoints.clone()
    }
}
