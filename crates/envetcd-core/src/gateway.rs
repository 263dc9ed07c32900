//! Default gateway discovery.
//!
//! On Linux the kernel exposes the IPv4 routing table in `/proc/net/route`:
//!
//! ```text
//! Iface   Destination Gateway  Flags RefCnt Use Metric Mask     MTU Window IRTT
//! eth0    00000000    0102A8C0 0003  0      0   0      00000000 0   0      0
//! ```
//!
//! Addresses are hex encoded in host (little-endian) byte order. The default
//! route is the row whose destination is `0.0.0.0`.

use envetcd_types::{EnvEtcdError, Result};
use std::net::Ipv4Addr;

/// Location of the kernel route table.
pub const ROUTE_TABLE: &str = "/proc/net/route";

/// Find the default gateway in the text of a route table.
///
/// The first line is a header and is skipped. Rows that do not have at least
/// three tokens or carry unparsable addresses are ignored.
///
/// # Errors
///
/// Returns [`EnvEtcdError::Gateway`] when no row has a `0.0.0.0` destination.
pub fn parse_route_table(contents: &str) -> Result<Ipv4Addr> {
    for line in contents.lines().skip(1) {
        let mut tokens = line.split_whitespace();
        let (Some(_iface), Some(destination), Some(gateway)) =
            (tokens.next(), tokens.next(), tokens.next())
        else {
            continue;
        };

        match (parse_hex_le(destination), parse_hex_le(gateway)) {
            (Some(dest), Some(gw)) if dest == Ipv4Addr::UNSPECIFIED => return Ok(gw),
            _ => continue,
        }
    }

    Err(EnvEtcdError::Gateway(
        "no default route in routing table".to_string(),
    ))
}

fn parse_hex_le(token: &str) -> Option<Ipv4Addr> {
    u32::from_str_radix(token, 16)
        .ok()
        .map(|raw| Ipv4Addr::from(raw.to_le_bytes()))
}

/// Look up the default gateway of this host.
///
/// # Errors
///
/// [`EnvEtcdError::Gateway`] when the table cannot be read or has no default
/// route.
#[cfg(target_os = "linux")]
pub fn discover() -> Result<Ipv4Addr> {
    let contents = std::fs::read_to_string(ROUTE_TABLE)
        .map_err(|e| EnvEtcdError::Gateway(format!("reading {}: {}", ROUTE_TABLE, e)))?;
    parse_route_table(&contents)
}

/// Look up the default gateway of this host.
///
/// # Errors
///
/// Always [`EnvEtcdError::GatewayUnsupported`] off Linux.
#[cfg(not(target_os = "linux"))]
pub fn discover() -> Result<Ipv4Addr> {
    Err(EnvEtcdError::GatewayUnsupported)
}
