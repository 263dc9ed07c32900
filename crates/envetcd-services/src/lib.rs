//! # envetcd Services
//!
//! Key/value store clients for envetcd.
//!
//! This crate provides implementations of [`envetcd_types::KvStore`]:
//! - **etcd**: the etcd v2 keys API over HTTP(S), with cluster discovery
//! - **memory**: an in-memory tree, for tests and embedding

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod etcd;
pub mod memory;
pub mod tls;

pub use etcd::{EtcdClient, EtcdConfig};
pub use memory::MemoryStore;
