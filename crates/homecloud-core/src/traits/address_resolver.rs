// # Address Resolver Trait
//
// Defines the interface for discovering the host's advertisable IPv6
// address.
//
// ## Implementations
//
// - getifaddrs-based enumeration: `homecloud-ip-ifaddrs` crate
//
// ## Caching
//
// The advertiser invokes `resolve()` at most once per process lifetime and
// caches the outcome itself; implementations do not need a cache of their
// own.

use async_trait::async_trait;
use std::net::Ipv6Addr;

/// Trait for local IPv6 address discovery
///
/// Implementations enumerate the host's network interfaces and select one
/// IPv6 address that does not belong to a loopback interface. The returned
/// address carries no zone index.
#[async_trait]
pub trait AddressResolver: Send + Sync {
    /// Resolve the host's advertisable IPv6 address.
    ///
    /// # Returns
    ///
    /// - `Ok(Ipv6Addr)`: the first IPv6 address of the first non-loopback
    ///   interface, in enumeration order
    /// - `Err(Error::Resolve)`: no interface carries an IPv6 address, or
    ///   interface enumeration itself failed
    async fn resolve(&self) -> Result<Ipv6Addr, crate::Error>;
}
