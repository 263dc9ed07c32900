//! # envetcd Types
//!
//! Core types, traits, and enums shared across all envetcd crates.
//!
//! This crate provides the fundamental building blocks for envetcd,
//! including:
//!
//! - The configuration record consumed by the resolver and supervisor
//! - The node tree returned by key/value store reads
//! - The [`KvStore`] trait that store clients implement
//! - Error types, exit codes, and result aliases
//!
//! ## Example
//!
//! ```
//! use envetcd_types::{Node, NodeKind};
//!
//! let tree = Node::dir("/config/global", vec![
//!     Node::leaf("/config/global/LOG_LEVEL", "DEBUG"),
//! ]);
//!
//! let leaves: Vec<_> = tree.leaves().collect();
//! assert_eq!(leaves, vec![("/config/global/LOG_LEVEL", "DEBUG")]);
//! assert!(matches!(tree.kind, NodeKind::Dir(_)));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod enums;
pub mod errors;
pub mod node;
pub mod traits;

// Re-export common types for convenience
pub use config::{Config, EnvMap};
pub use enums::LogLevel;
pub use errors::{exit, EnvEtcdError, Result};
pub use node::{Node, NodeKind};
pub use traits::KvStore;
