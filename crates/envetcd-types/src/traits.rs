//! Core trait definitions for envetcd abstractions.

use crate::errors::Result;
use crate::node::Node;
use async_trait::async_trait;

/// Trait for hierarchical key/value store backends.
///
/// Implementers provide recursive reads and client-side cluster discovery.
/// The resolver only ever talks to a store through this trait, so tests can
/// supply an in-memory implementation.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Recursively read every descendant under `path`.
    ///
    /// Returns [`EnvEtcdError::NotFound`](crate::EnvEtcdError::NotFound) when
    /// the path does not exist.
    async fn get(&self, path: &str) -> Result<Node>;

    /// Refresh the known peer list by asking the cluster for its members.
    async fn sync_cluster(&mut self) -> Result<()>;

    /// Currently known peers, in the order they are tried.
    fn cluster_members(&self) -> Vec<String>;
}
