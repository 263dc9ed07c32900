//! Global application state.
//!
//! Values here are computed once at startup and never torn down.

use once_cell::sync::OnceCell;
use std::net::Ipv4Addr;
use tracing::debug;

static DEFAULT_GATEWAY: OnceCell<Option<Ipv4Addr>> = OnceCell::new();

/// Discover the default gateway and cache the outcome for the life of the process.
///
/// Discovery failures are not fatal; they are logged and cached as `None`.
/// Later calls return the cached value without touching the route table.
pub fn init_default_gateway() -> Option<Ipv4Addr> {
    *DEFAULT_GATEWAY.get_or_init(|| match crate::gateway::discover() {
        Ok(gateway) => {
            debug!(%gateway, "discovered default gateway");
            Some(gateway)
        }
        Err(e) => {
            debug!(error = %e, "no default gateway");
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_gateway() -> Option<Ipv4Addr> {
        DEFAULT_GATEWAY.get().copied().flatten()
    }

    #[test]
    fn test_init_is_cached() {
        let first = init_default_gateway();
        assert_eq!(default_gateway(), first);
        assert_eq!(init_default_gateway(), first);
    }
}
