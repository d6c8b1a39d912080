//! # httpu
//!
//! A client for HTTP over UDP (HTTPU), the transport under SSDP and UPnP
//! device discovery.
//!
//! A request goes out as a datagram, usually to a multicast or broadcast
//! address, and any number of devices may answer. The client therefore
//! sends the same request several times and collects whatever replies
//! arrive within a time window instead of waiting for exactly one.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use httpu::{HttpuClient, LOCAL_ADDRESS_HEADER};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = HttpuClient::open().await.unwrap();
//!     let req = http::Request::builder()
//!         .method("M-SEARCH")
//!         .uri("*")
//!         .header("HOST", "239.255.255.250:1900")
//!         .header("MAN", "\"ssdp:discover\"")
//!         .header("MX", "2")
//!         .header("ST", "ssdp:all")
//!         .body(())
//!         .unwrap();
//!
//!     for resp in client.execute(&req, Duration::from_secs(3), 3).await.unwrap() {
//!         println!("{:?} via {:?}", resp.headers().get("location"),
//!             resp.headers().get(LOCAL_ADDRESS_HEADER));
//!     }
//! }
//! ```
//!
//! ## Modules
//!
//! - [`base`] - Errors and exchange context (deadline, cancellation)
//! - [`client`] - The HTTPU client and its builder
//! - [`dns`] - Destination resolution
//! - [`http`] - Request encoding and reply parsing
//! - [`multi`] - Fan-out over several local interfaces
//! - [`socket`] - UDP socket with a movable read deadline
//!
//! ## Errors
//!
//! Only failures to put a request on the wire (bad request, unresolvable
//! destination, failed or short write) and fatal socket failures are
//! returned. Malformed replies and timeouts just mean fewer responses.

pub mod base;
pub mod client;
pub mod dns;
mod exchange;
pub mod http;
pub mod multi;
pub mod socket;

pub use base::cancel::{CancelToken, Context};
pub use base::neterror::NetError;
pub use client::{ClientBuilder, HttpuClient, HttpuExecutor, Responses};
pub use crate::http::LOCAL_ADDRESS_HEADER;
pub use multi::MultiClient;
pub use socket::config::HttpuConfig;
