//! Resolution of a request's `host:port` into a datagram destination.

use super::gai::SocketAddrs;
use super::{Name, Resolve};
use crate::base::neterror::NetError;
use http::uri::Authority;
use std::net::SocketAddr;

/// A parsed `host:port` pair. The port is mandatory for datagrams.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    host: String,
    port: u16,
}

impl Destination {
    pub fn parse(host_port: &str) -> Result<Self, NetError> {
        if host_port.is_empty() {
            return Err(NetError::AddressInvalid("missing host".to_string()));
        }
        let authority: Authority = host_port
            .parse()
            .map_err(|_| NetError::AddressInvalid(host_port.to_string()))?;
        let port = authority
            .port_u16()
            .ok_or_else(|| NetError::AddressInvalid(format!("{host_port}: missing port in address")))?;

        Ok(Self {
            host: authority.host().to_string(),
            port,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Resolve to a single address reachable from a socket bound at `local`.
    ///
    /// IP literals never touch the resolver.
    pub async fn resolve(
        &self,
        resolver: &dyn Resolve,
        local: SocketAddr,
    ) -> Result<SocketAddr, NetError> {
        let candidates = match SocketAddrs::try_parse(&self.host, self.port) {
            Some(addrs) => addrs,
            None => {
                let addrs = resolver.resolve(Name::new(self.host.as_str())).await?;
                SocketAddrs::new(addrs.collect()).with_port(self.port)
            }
        };

        let dest = candidates
            .pick_for(local)
            .ok_or(NetError::NameNotResolved)?;
        tracing::debug!(host = %self.host, %dest, "resolved destination");
        Ok(dest)
    }
}
