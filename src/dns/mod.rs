//! DNS Resolution Module
//!
//! Turns the host of an outbound request into the address its datagrams are
//! sent to:
//! - System resolver (getaddrinfo via thread pool)
//! - `host:port` parsing with mandatory port
//!
//! The `Resolve` trait is the seam a client uses, so tests and callers can
//! plug in their own lookup.
//!
//! # Example
//!
//! ```rust,ignore
//! use httpu::dns::{Destination, GaiResolver};
//!
//! let dest = Destination::parse("239.255.255.250:1900")?;
//! let addr = dest.resolve(&GaiResolver::new(), local_addr).await?;
//! ```

mod destination;
mod gai;
mod resolve;

pub use destination::Destination;
pub use gai::{GaiResolver, SocketAddrs};
pub use resolve::{Addrs, Name, Resolve, Resolving};
