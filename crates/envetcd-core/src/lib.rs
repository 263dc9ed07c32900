//! # envetcd Core
//!
//! Core utilities for envetcd.
//!
//! This crate provides:
//!
//! - **Keys**: flattening store paths into environment variable names
//! - **Configuration**: peer coercion, tier selector derivation, defaults
//! - **Gateway**: default-gateway discovery from the kernel route table
//! - **State**: process-wide values computed once at startup
//! - **Logging**: `tracing` subscriber setup writing to stderr
//!
//! ## Example
//!
//! ```
//! use envetcd_core::keys;
//!
//! assert_eq!(keys::transform("a_b-c", true, true), "A_B_C");
//! assert_eq!(keys::transform("weird-key", false, false), "weird-key");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod gateway;
pub mod keys;
pub mod log;
pub mod state;

// Re-export commonly used items
pub use config::{coerce_peer, normalize};
pub use envetcd_types::{EnvEtcdError, Result};
pub use keys::{transform, KeyOptions};
