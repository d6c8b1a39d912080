//! The resolver seam between an exchange and name lookup.
//!
//! A request names its destination as `host:port`. IP literals are used as
//! they are; anything else goes through a [`Resolve`] implementation owned
//! by the client.

use crate::base::neterror::NetError;
use std::{fmt, future::Future, net::SocketAddr, pin::Pin, sync::Arc};

/// Host part of a request destination that needs a lookup.
#[derive(Clone, Hash, Eq, PartialEq)]
pub struct Name {
    host: Box<str>,
}

impl Name {
    pub fn new(host: impl Into<Box<str>>) -> Self {
        Self { host: host.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.host
    }
}

impl From<&str> for Name {
    fn from(host: &str) -> Self {
        Name::new(host)
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.host, f)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.host)
    }
}

/// Addresses produced by a lookup.
pub type Addrs = Box<dyn Iterator<Item = SocketAddr> + Send>;

/// Alias for the `Future` returned by [`Resolve::resolve`].
pub type Resolving = Pin<Box<dyn Future<Output = Result<Addrs, NetError>> + Send>>;

/// Name lookup used for request destinations.
///
/// Implementations are shared by every exchange of a client, so they take
/// `&self` and must be thread-safe.
pub trait Resolve: Send + Sync {
    /// Look up `name`. Ports of the returned addresses are ignored; the
    /// port always comes from the request.
    fn resolve(&self, name: Name) -> Resolving;
}

impl<R: Resolve + ?Sized> Resolve for Arc<R> {
    fn resolve(&self, name: Name) -> Resolving {
        (**self).resolve(name)
    }
}
