//! In-memory key/value store.

use async_trait::async_trait;
use envetcd_types::{EnvEtcdError, KvStore, Node, Result};
use std::collections::BTreeMap;

/// A flat map of absolute keys to values, served as a tree.
///
/// Intermediate directories are implied by the keys, the way etcd creates
/// them on write.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
    members: Vec<String>,
    syncs: usize,
}

impl MemoryStore {
    /// Create an empty store reporting `members` as its cluster.
    pub fn new(members: Vec<String>) -> Self {
        Self {
            members,
            ..Default::default()
        }
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Set `key` to `value`.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Number of times [`KvStore::sync_cluster`] has been called.
    pub fn sync_count(&self) -> usize {
        self.syncs
    }

    fn build_dir(&self, dir: &str) -> Node {
        let prefix = child_prefix(dir);
        let mut children: Vec<String> = Vec::new();

        for key in self
            .entries
            .range(prefix.clone()..)
            .map(|(k, _)| k)
            .take_while(|k| k.starts_with(&prefix))
        {
            let rest = &key[prefix.len()..];
            let child = match rest.split_once('/') {
                Some((head, _)) => format!("{}{}", prefix, head),
                None => key.clone(),
            };
            if children.last() != Some(&child) {
                children.push(child);
            }
        }

        let nodes = children
            .into_iter()
            .map(|child| match self.entries.get(&child) {
                Some(value) => Node::leaf(child, value.clone()),
                None => self.build_dir(&child),
            })
            .collect();

        Node::dir(dir, nodes)
    }
}

fn child_prefix(dir: &str) -> String {
    if dir.ends_with('/') {
        dir.to_string()
    } else {
        format!("{}/", dir)
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, path: &str) -> Result<Node> {
        let path = if path.len() > 1 {
            path.trim_end_matches('/')
        } else {
            path
        };

        if let Some(value) = self.entries.get(path) {
            return Ok(Node::leaf(path, value.clone()));
        }

        let prefix = child_prefix(path);
        let exists = self
            .entries
            .range(prefix.clone()..)
            .next()
            .is_some_and(|(k, _)| k.starts_with(&prefix));

        if exists {
            Ok(self.build_dir(path))
        } else {
            Err(EnvEtcdError::NotFound(path.to_string()))
        }
    }

    async fn sync_cluster(&mut self) -> Result<()> {
        self.syncs += 1;
        if self.members.is_empty() {
            return Err(EnvEtcdError::ClusterUnreachable { peers: Vec::new() });
        }
        Ok(())
    }

    fn cluster_members(&self) -> Vec<String> {
        self.members.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use envetcd_types::NodeKind;

    fn store() -> MemoryStore {
        MemoryStore::new(vec!["http://127.0.0.1:4001".to_string()])
            .with("/config/global/FOO", "g")
            .with("/config/global/a/b/c", "x")
            .with("/config/global/a/d", "y")
            .with("/config/globalish/BAR", "no")
    }

    #[tokio::test]
    async fn test_get_builds_tree() {
        let node = store().get("/config/global").await.unwrap();
        let leaves: Vec<_> = node.leaves().collect();
        assert_eq!(
            leaves,
            vec![
                ("/config/global/FOO", "g"),
                ("/config/global/a/b/c", "x"),
                ("/config/global/a/d", "y"),
            ]
        );

        let NodeKind::Dir(children) = &node.kind else {
            panic!("expected a directory");
        };
        assert_eq!(children.len(), 2);
        assert!(children[1].is_dir());
        assert_eq!(children[1].key, "/config/global/a");
    }

    #[tokio::test]
    async fn test_get_leaf_and_missing() {
        let store = store();
        assert_eq!(
            store.get("/config/global/FOO").await.unwrap(),
            Node::leaf("/config/global/FOO", "g")
        );
        assert!(matches!(
            store.get("/config/host/h1").await,
            Err(EnvEtcdError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_sync_counts_and_fails_without_members() {
        let mut store = store();
        store.sync_cluster().await.unwrap();
        assert_eq!(store.sync_count(), 1);

        let mut empty = MemoryStore::default();
        assert!(matches!(
            empty.sync_cluster().await,
            Err(EnvEtcdError::ClusterUnreachable { .. })
        ));
    }
}
