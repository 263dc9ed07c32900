//! # envetcd Env
//!
//! Builds a child environment from the tiered store layout and runs the child.
//!
//! - [`tiers`]: the four precedence tiers as data
//! - [`resolver`]: reads the tiers in order and merges them into one mapping
//! - [`compose`]: combines the mapping with the inherited environment
//! - [`envfile`]: writes the mapping as a shell-sourceable file
//! - [`runner`]: spawns and supervises the child
//! - [`signals`]: forwards termination and user signals to the child
//! - [`supervisor`]: drives the whole lifecycle

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod compose;
pub mod envfile;
pub mod resolver;
pub mod runner;
pub mod signals;
pub mod supervisor;
pub mod tiers;

pub use compose::{compose, EnvList};
pub use envfile::write_env_file;
pub use resolver::resolve;
pub use runner::{Runner, StdoutSink};
pub use supervisor::{Phase, Supervisor};
pub use tiers::{Tier, TierName};
