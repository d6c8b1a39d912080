//! System DNS resolver using getaddrinfo.
//!
//! This resolver uses the operating system's native DNS resolution via
//! `getaddrinfo`, executed in a thread pool to avoid blocking the async
//! runtime. It is the default resolver of every client.

use super::{Addrs, Name, Resolve, Resolving};
use crate::base::context::IoResultExt;
use crate::base::neterror::NetError;
use std::{
    io,
    net::{IpAddr, Ipv6Addr, SocketAddr, ToSocketAddrs},
};

/// System DNS resolver using `getaddrinfo` in a thread pool.
///
/// This resolver wraps the standard library's `ToSocketAddrs` trait and
/// executes resolution in `tokio::task::spawn_blocking`.
#[derive(Clone, Debug, Default)]
pub struct GaiResolver;

impl GaiResolver {
    /// Creates a new `GaiResolver`.
    pub fn new() -> Self {
        Self
    }
}

impl Resolve for GaiResolver {
    fn resolve(&self, name: Name) -> Resolving {
        Box::pin(async move {
            let host = name.as_str().to_string();
            let domain = host.clone();

            let result = tokio::task::spawn_blocking(move || {
                tracing::debug!(host = %host, "resolving via getaddrinfo");
                (host.as_str(), 0u16)
                    .to_socket_addrs()
                    .map(|iter| iter.collect::<Vec<_>>())
            })
            .await;

            // Task join error (cancellation, panic)
            let addrs = result
                .map_err(|e| {
                    tracing::error!(error = %e, "DNS resolution task failed");
                    NetError::NameNotResolved
                })?
                .dns_context(&domain)
                .inspect_err(|e| tracing::debug!(domain = %domain, error = %e, "DNS resolution failed"))?;

            if addrs.is_empty() {
                return Err(NetError::dns_failed(
                    domain,
                    io::Error::new(
                        io::ErrorKind::NotFound,
                        "No addresses returned by getaddrinfo",
                    ),
                ));
            }

            tracing::debug!(domain = %domain, count = addrs.len(), "DNS resolution complete");
            Ok(Box::new(addrs.into_iter()) as Addrs)
        })
    }
}

/// Candidate destination addresses for one exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocketAddrs {
    addrs: Vec<SocketAddr>,
}

impl SocketAddrs {
    /// Creates a new `SocketAddrs` from a vector.
    pub fn new(addrs: Vec<SocketAddr>) -> Self {
        Self { addrs }
    }

    /// Attempts to parse a host string as an IP address.
    ///
    /// Returns `Some` if the host is a valid IPv4 or IPv6 address (IPv6 may
    /// be bracketed), `None` if it's a hostname that requires DNS resolution.
    pub fn try_parse(host: &str, port: u16) -> Option<Self> {
        if let Ok(ip) = host.parse::<IpAddr>() {
            return Some(Self {
                addrs: vec![SocketAddr::new(ip, port)],
            });
        }

        let unbracketed = host.strip_prefix('[')?.strip_suffix(']')?;
        let ip = unbracketed.parse::<Ipv6Addr>().ok()?;
        Some(Self {
            addrs: vec![SocketAddr::new(IpAddr::V6(ip), port)],
        })
    }

    /// Returns true if no addresses are available.
    pub fn is_empty(&self) -> bool {
        self.addrs.is_empty()
    }

    /// Returns the number of addresses.
    pub fn len(&self) -> usize {
        self.addrs.len()
    }

    /// Overwrite the port of every address.
    pub fn with_port(mut self, port: u16) -> Self {
        for addr in &mut self.addrs {
            addr.set_port(port);
        }
        self
    }

    /// Pick the address to send to from a socket bound at `local`.
    ///
    /// An IPv4 socket cannot reach an IPv6 destination (and vice versa for
    /// a v6-only socket), so the first address of the local family wins.
    /// Falls back to the first address overall.
    pub fn pick_for(&self, local: SocketAddr) -> Option<SocketAddr> {
        self.addrs
            .iter()
            .find(|a| a.is_ipv4() == local.is_ipv4())
            .or_else(|| self.addrs.first())
            .copied()
    }
}

impl IntoIterator for SocketAddrs {
    type Item = SocketAddr;
    type IntoIter = std::vec::IntoIter<SocketAddr>;

    fn into_iter(self) -> Self::IntoIter {
        self.addrs.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn test_socket_addrs_try_parse_ipv4() {
        let addrs = SocketAddrs::try_parse("239.255.255.250", 1900).unwrap();
        assert_eq!(addrs.len(), 1);
        assert_eq!(
            addrs.pick_for("0.0.0.0:0".parse().unwrap()),
            Some(SocketAddr::new(IpAddr::V4(Ipv4Addr::new(239, 255, 255, 250)), 1900))
        );
    }

    #[test]
    fn test_socket_addrs_try_parse_ipv6() {
        let plain = SocketAddrs::try_parse("ff02::c", 1900).unwrap();
        let bracketed = SocketAddrs::try_parse("[ff02::c]", 1900).unwrap();
        assert_eq!(plain, bracketed);
        assert!(plain.pick_for("[::]:0".parse().unwrap()).unwrap().is_ipv6());
    }

    #[test]
    fn test_socket_addrs_try_parse_hostname() {
        assert!(SocketAddrs::try_parse("router.lan", 1900).is_none());
        assert!(SocketAddrs::try_parse("[router.lan]", 1900).is_none());
    }

    #[test]
    fn test_pick_prefers_local_family() {
        let addrs = SocketAddrs::new(vec![
            "[::1]:0".parse().unwrap(),
            "127.0.0.1:0".parse().unwrap(),
        ])
        .with_port(1900);

        let v4 = addrs.pick_for("0.0.0.0:0".parse().unwrap()).unwrap();
        assert_eq!(v4, "127.0.0.1:1900".parse::<SocketAddr>().unwrap());

        let v6 = addrs.pick_for("[::]:0".parse().unwrap()).unwrap();
        assert_eq!(v6, "[::1]:1900".parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn test_pick_falls_back_to_first() {
        let addrs = SocketAddrs::new(vec!["[::1]:1900".parse().unwrap()]);
        assert_eq!(
            addrs.pick_for("0.0.0.0:0".parse().unwrap()),
            Some("[::1]:1900".parse().unwrap())
        );
        assert_eq!(SocketAddrs::new(vec![]).pick_for("0.0.0.0:0".parse().unwrap()), None);
    }

    #[tokio::test]
    async fn test_gai_resolver_localhost() {
        let resolver = GaiResolver::new();
        let result = resolver.resolve(Name::new("localhost")).await;

        // localhost should always resolve
        assert!(result.is_ok());
        let addrs: Vec<_> = result.unwrap().collect();
        assert!(!addrs.is_empty());
    }
}
