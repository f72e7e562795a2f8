// # Interface-Enumeration Address Resolver
//
// This crate provides the OS-backed `AddressResolver` for the agent: it
// enumerates the host's network interfaces via getifaddrs and selects the
// first IPv6 address of the first non-loopback interface.
//
// ## Selection
//
// - Loopback entries are skipped.
// - Entries are considered in enumeration order; the first IPv6 address
//   wins. There is no preference between link-local and global addresses,
//   and no ordering between interfaces beyond what the OS reports.
// - A `%zone` suffix in the textual form is stripped before parsing; the
//   zone index identifies the originating interface and is not part of
//   the routable address.
//
// ## Failure
//
// Enumeration failure (insufficient privilege, driver error) and the
// no-address outcome both surface as `Error::Resolve`; the advertiser
// logs them and skips the tick, never terminating the scheduling loop.

use async_trait::async_trait;
use get_if_addrs::get_if_addrs;
use homecloud_core::traits::AddressResolver;
use homecloud_core::{Error, Result};
use std::net::Ipv6Addr;
use tracing::debug;

/// One enumerated interface address, reduced to what selection needs
struct Candidate {
    interface: String,
    loopback: bool,
    address: String,
}

/// Strip a `%zone` suffix from an address literal.
fn strip_zone_index(literal: &str) -> &str {
    match literal.split_once('%') {
        Some((address, _zone)) => address,
        None => literal,
    }
}

/// Select the first IPv6 address of the first non-loopback entry.
///
/// Non-IPv6 literals simply fail to parse and are passed over.
fn select_ipv6(candidates: impl IntoIterator<Item = Candidate>) -> Option<Ipv6Addr> {
    candidates.into_iter().find_map(|candidate| {
        if candidate.loopback {
            return None;
        }
        let literal = strip_zone_index(&candidate.address);
        match literal.parse::<Ipv6Addr>() {
            Ok(address) => {
                debug!("selected {address} on interface {}", candidate.interface);
                Some(address)
            }
            Err(_) => None,
        }
    })
}

/// getifaddrs-backed address resolver
#[derive(Debug, Default)]
pub struct IfAddrsResolver;

impl IfAddrsResolver {
    /// Create a new resolver
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AddressResolver for IfAddrsResolver {
    async fn resolve(&self) -> Result<Ipv6Addr> {
        let entries = get_if_addrs()
            .map_err(|e| Error::resolve(format!("interface enumeration failed: {e}")))?;

        let candidates = entries.into_iter().map(|entry| {
            let loopback = entry.is_loopback();
            let address = entry.ip().to_string();
            Candidate {
                interface: entry.name,
                loopback,
                address,
            }
        });

        select_ipv6(candidates)
            .ok_or_else(|| Error::resolve("no IPv6 address on any non-loopback interface"))
    }
}
