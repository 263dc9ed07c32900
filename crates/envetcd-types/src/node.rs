//! Tree nodes returned by recursive store reads.

/// A directory or leaf, keyed by its absolute path in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Absolute key, e.g. `/config/global/LOG_LEVEL`
    pub key: String,
    /// Directory children or leaf value
    pub kind: NodeKind,
}

/// Payload of a [`Node`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// A directory holding child nodes
    Dir(Vec<Node>),
    /// A leaf holding a value
    Leaf(String),
}

impl Node {
    /// Create a directory node.
    pub fn dir(key: impl Into<String>, children: Vec<Node>) -> Self {
        Self {
            key: key.into(),
            kind: NodeKind::Dir(children),
        }
    }

    /// Create a leaf node.
    pub fn leaf(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            kind: NodeKind::Leaf(value.into()),
        }
    }

    /// Whether this node is a directory.
    pub fn is_dir(&self) -> bool {
        matches!(self.kind, NodeKind::Dir(_))
    }

    /// Iterate over every leaf below (and including) this node as `(key, value)`.
    ///
    /// Directories are descended depth-first in child order.
    pub fn leaves(&self) -> impl Iterator<Item = (&str, &str)> {
        let mut out = Vec::new();
        collect_leaves(self, &mut out);
        out.into_iter()
    }
}

fn collect_leaves<'a>(node: &'a Node, out: &mut Vec<(&'a str, &'a str)>) {
    match &node.kind {
        NodeKind::Leaf(value) => out.push((node.key.as_str(), value.as_str())),
        NodeKind::Dir(children) => {
            for child in children {
                collect_leaves(child, out);
            }
        }
    }
}
