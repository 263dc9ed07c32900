//! Tier resolution.
//!
//! Reads the tier directories in precedence order and merges their leaves
//! into a single mapping, later tiers overwriting earlier ones.

use crate::tiers::Tier;
use envetcd_core::keys::{relative_key, KeyOptions};
use envetcd_types::{Config, EnvEtcdError, EnvMap, KvStore, Node, Result};
use std::net::Ipv4Addr;
use tracing::{debug, warn};

/// Comma-separated list of the store endpoints in use.
pub const ETCD_PEERS: &str = "ETCD_PEERS";
/// Service selector, when configured.
pub const ENVETCD_SERVICE: &str = "ENVETCD_SERVICE";
/// System selector, when configured or derived.
pub const ENVETCD_SYSTEM: &str = "ENVETCD_SYSTEM";
/// Host selector, when configured.
pub const ENVETCD_HOSTNAME: &str = "ENVETCD_HOSTNAME";
/// Default gateway address, when requested and discoverable.
pub const ENVETCD_DEFAULT_GATEWAY: &str = "ENVETCD_DEFAULT_GATEWAY";

/// Build the final mapping for `config` from `store`.
///
/// `NotFound` and read failures only drop the tier they occur in; any other
/// store error aborts resolution.
pub async fn resolve<S>(config: &Config, store: &S, gateway: Option<Ipv4Addr>) -> Result<EnvMap>
where
    S: KvStore + ?Sized,
{
    let opts = KeyOptions {
        sanitize: config.sanitize,
        upcase: config.upcase,
    };
    let mut env = EnvMap::new();

    for tier in Tier::plan(config) {
        if !tier.enabled {
            debug!(tier = %tier.name, "tier not selected");
            continue;
        }

        match store.get(&tier.directory).await {
            Ok(node) => {
                let count = merge_tier(&mut env, &tier.directory, &node, opts);
                debug!(tier = %tier.name, dir = %tier.directory, entries = count, "merged tier");
            }
            Err(EnvEtcdError::NotFound(_)) => {
                debug!(tier = %tier.name, dir = %tier.directory, "tier directory not found");
            }
            Err(e @ EnvEtcdError::Read { .. }) => {
                warn!(tier = %tier.name, dir = %tier.directory, error = %e, "skipping tier");
            }
            Err(e) => return Err(e),
        }
    }

    enrich(&mut env, config, &store.cluster_members(), gateway);

    for (key, value) in &env {
        debug!(%key, %value, "env");
    }

    Ok(env)
}

/// Merge every leaf of `node` into `env`, keyed relative to `dir`.
///
/// Returns the number of entries written.
pub fn merge_tier(env: &mut EnvMap, dir: &str, node: &Node, opts: KeyOptions) -> usize {
    let mut count = 0;
    for (key, value) in node.leaves() {
        let Some(relative) = relative_key(key, dir) else {
            debug!(%key, "ignoring value stored at tier directory");
            continue;
        };
        env.insert(opts.apply(&relative), value.to_string());
        count += 1;
    }
    count
}

/// Inject the runtime-context variables after all tiers are merged.
pub fn enrich(env: &mut EnvMap, config: &Config, members: &[String], gateway: Option<Ipv4Addr>) {
    env.insert(ETCD_PEERS.to_string(), members.join(", "));

    for (name, value) in [
        (ENVETCD_SERVICE, &config.service),
        (ENVETCD_SYSTEM, &config.system),
        (ENVETCD_HOSTNAME, &config.hostname),
    ] {
        if !value.is_empty() {
            env.insert(name.to_string(), value.clone());
        }
    }

    if config.use_default_gateway {
        if let Some(gateway) = gateway {
            env.insert(ENVETCD_DEFAULT_GATEWAY.to_string(), gateway.to_string());
        }
    }
}
