//! Ergonomic error context helpers.
//!
//! Provides extension traits for adding context to `Result` types,
//! converting IO errors into context-rich `NetError` variants.

use crate::base::neterror::NetError;
use std::io;
use std::net::SocketAddr;

/// Extension trait for adding context to IO Results.
pub trait IoResultExt<T> {
    /// Add bind context to an IO error.
    ///
    /// # Example
    /// ```ignore
    /// use httpu::base::context::IoResultExt;
    ///
    /// let socket = UdpSocket::bind("0.0.0.0:1900").await
    ///     .bind_context("0.0.0.0:1900")?;
    /// // Error: "Failed to bind UDP socket on 0.0.0.0:1900: address in use"
    /// ```
    fn bind_context(self, addr: &str) -> Result<T, NetError>;

    /// Add send context to an IO error.
    fn send_context(self, addr: SocketAddr) -> Result<T, NetError>;

    /// Add DNS resolution context to an IO error.
    fn dns_context(self, domain: &str) -> Result<T, NetError>;
}

impl<T> IoResultExt<T> for Result<T, io::Error> {
    fn bind_context(self, addr: &str) -> Result<T, NetError> {
        self.map_err(|e| NetError::bind_failed(addr, e))
    }

    fn send_context(self, addr: SocketAddr) -> Result<T, NetError> {
        self.map_err(|e| NetError::send_failed(addr, e))
    }

    fn dns_context(self, domain: &str) -> Result<T, NetError> {
        self.map_err(|e| NetError::dns_failed(domain, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_bind_context() {
        let result: Result<(), io::Error> = Err(Error::new(ErrorKind::AddrInUse, "in use"));
        let err = result.bind_context("0.0.0.0:1900").unwrap_err();

        match err {
            NetError::BindFailed { addr, source } => {
                assert_eq!(addr, "0.0.0.0:1900");
                assert_eq!(source.kind(), ErrorKind::AddrInUse);
            }
            _ => panic!("Expected BindFailed"),
        }
    }

    #[test]
    fn test_send_context() {
        let dest: SocketAddr = "239.255.255.250:1900".parse().unwrap();
        let result: Result<(), io::Error> =
            Err(Error::new(ErrorKind::PermissionDenied, "denied"));
        let err = result.send_context(dest).unwrap_err();

        assert!(err.is_transmission());
        match err {
            NetError::SendFailed { addr, .. } => assert_eq!(addr, dest),
            _ => panic!("Expected SendFailed"),
        }
    }

    #[test]
    fn test_dns_context() {
        let result: Result<(), io::Error> = Err(Error::new(ErrorKind::NotFound, "no such host"));
        let err = result.dns_context("unknown.example.com").unwrap_err();

        match err {
            NetError::NameNotResolvedFor { domain, .. } => {
                assert_eq!(domain, "unknown.example.com");
            }
            _ => panic!("Expected NameNotResolvedFor"),
        }
    }
}
