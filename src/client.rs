//! HTTPU client.
//!
//! An [`HttpuClient`] owns one UDP socket and performs exchanges on it: it
//! sends a request a few times and collects every reply that arrives
//! before the deadline. Exchanges on one client never overlap; a second
//! caller waits until the first one's receive window has closed.
//!
//! # Example
//!
//! ```rust,ignore
//! use httpu::HttpuClient;
//! use std::time::Duration;
//!
//! let client = HttpuClient::open().await?;
//! let req = http::Request::builder()
//!     .method("M-SEARCH")
//!     .uri("*")
//!     .header("HOST", "239.255.255.250:1900")
//!     .header("MAN", "\"ssdp:discover\"")
//!     .header("MX", "2")
//!     .header("ST", "ssdp:all")
//!     .body(())?;
//!
//! let responses = client.execute(&req, Duration::from_secs(3), 3).await?;
//! ```

use crate::base::cancel::Context;
use crate::base::neterror::NetError;
use crate::dns::{GaiResolver, Resolve};
use crate::exchange::Exchange;
use crate::socket::config::HttpuConfig;
use crate::socket::udp::DeadlineSocket;
use bytes::Bytes;
use http::{Request, Response};
use std::fmt;
use std::future::Future;
use std::net::{IpAddr, SocketAddr};
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Replies collected by one exchange, in receipt order.
pub type Responses = Vec<Response<Bytes>>;

/// Alias for the `Future` returned by an [`HttpuExecutor`].
pub type Executing<'a> = Pin<Box<dyn Future<Output = Result<Responses, NetError>> + Send + 'a>>;

/// Anything that can run an HTTPU exchange.
///
/// Implemented by [`HttpuClient`] and [`MultiClient`](crate::multi::MultiClient)
/// so discovery code can be written against either, or against a fake.
pub trait HttpuExecutor: Send + Sync {
    /// Send `req` `num_sends` times and collect replies for `timeout`.
    ///
    /// A zero `timeout` leaves the request's own [`Context`] in charge.
    fn execute<'a>(
        &'a self,
        req: &'a Request<()>,
        timeout: Duration,
        num_sends: usize,
    ) -> Executing<'a>;

    /// Send `req` `num_sends` times and collect replies until the request's
    /// [`Context`] is done.
    fn execute_with_context<'a>(&'a self, req: &'a Request<()>, num_sends: usize)
        -> Executing<'a>;
}

/// Client for HTTP over UDP, typically HTTPMU and SSDP.
pub struct HttpuClient {
    socket: Arc<DeadlineSocket>,
    exchange_lock: Mutex<()>,
    resolver: Arc<dyn Resolve>,
    config: HttpuConfig,
}

impl HttpuClient {
    /// Open a client on an unspecified local address and ephemeral port.
    pub async fn open() -> Result<Self, NetError> {
        Self::builder().open().await
    }

    /// Open a client that sends from `address` (an IP literal) on an
    /// ephemeral port.
    pub async fn open_on_address(address: &str) -> Result<Self, NetError> {
        Self::builder().bind_ip(address)?.open().await
    }

    /// Open a client bound to an explicit `host:port`.
    pub async fn open_on_address_port(address_port: &str) -> Result<Self, NetError> {
        Self::builder().bind(address_port).open().await
    }

    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.socket.local_addr()
    }

    pub fn config(&self) -> &HttpuConfig {
        &self.config
    }

    pub fn is_closed(&self) -> bool {
        self.socket.is_closed()
    }

    /// Shut the client down. It is no longer useful afterwards.
    ///
    /// An exchange blocked on a read is woken and fails with
    /// [`NetError::SocketClosed`].
    pub fn close(&self) -> Result<(), NetError> {
        self.socket.close()
    }

    /// Perform an exchange bounded by `timeout`.
    ///
    /// A positive `timeout` derives a deadline from the request's
    /// [`Context`] (keeping its cancellation); zero inherits the context
    /// unchanged. An error is only returned for failing to send the
    /// request. Failures in receipt simply do not add to the responses.
    pub async fn execute(
        &self,
        req: &Request<()>,
        timeout: Duration,
        num_sends: usize,
    ) -> Result<Responses, NetError> {
        let mut ctx = Context::of(req);
        if !timeout.is_zero() {
            ctx = ctx.child_with_timeout(timeout);
        }
        self.exchange(req, &ctx, num_sends).await
    }

    /// Perform an exchange that lasts until the request's [`Context`] is
    /// done.
    ///
    /// If the context is never cancelled and has no deadline, this call
    /// does not return until the client is closed. Give the context a
    /// deadline, or cancel it, when the exchange should finish.
    ///
    /// An error is only returned for failing to send the request.
    pub async fn execute_with_context(
        &self,
        req: &Request<()>,
        num_sends: usize,
    ) -> Result<Responses, NetError> {
        self.exchange(req, &Context::of(req), num_sends).await
    }

    async fn exchange(
        &self,
        req: &Request<()>,
        ctx: &Context,
        num_sends: usize,
    ) -> Result<Responses, NetError> {
        let _guard = self.exchange_lock.lock().await;
        if self.socket.is_closed() {
            return Err(NetError::SocketClosed);
        }

        Exchange {
            socket: &self.socket,
            resolver: self.resolver.as_ref(),
            config: &self.config,
        }
        .run(req, ctx, num_sends)
        .await
    }
}

impl HttpuExecutor for HttpuClient {
    fn execute<'a>(
        &'a self,
        req: &'a Request<()>,
        timeout: Duration,
        num_sends: usize,
    ) -> Executing<'a> {
        Box::pin(HttpuClient::execute(self, req, timeout, num_sends))
    }

    fn execute_with_context<'a>(
        &'a self,
        req: &'a Request<()>,
        num_sends: usize,
    ) -> Executing<'a> {
        Box::pin(HttpuClient::execute_with_context(self, req, num_sends))
    }
}

impl fmt::Debug for HttpuClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpuClient")
            .field("local_addr", &self.socket.local_addr())
            .field("closed", &self.socket.is_closed())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Builder for creating an [`HttpuClient`].
#[derive(Default)]
pub struct ClientBuilder {
    bind: Option<String>,
    config: Option<HttpuConfig>,
    resolver: Option<Arc<dyn Resolve>>,
}

impl ClientBuilder {
    /// Local `host:port` to bind (default `0.0.0.0:0`).
    pub fn bind(mut self, address_port: impl Into<String>) -> Self {
        self.bind = Some(address_port.into());
        self
    }

    /// Bind to the IP literal `address` on an ephemeral port.
    pub fn bind_ip(self, address: &str) -> Result<Self, NetError> {
        let ip: IpAddr = address
            .parse()
            .map_err(|_| NetError::InvalidAddress(address.to_string()))?;
        Ok(self.bind(SocketAddr::new(ip, 0).to_string()))
    }

    /// Set socket and exchange configuration.
    pub fn config(mut self, config: HttpuConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the resolver used for request destinations (default: getaddrinfo).
    pub fn resolver(mut self, resolver: Arc<dyn Resolve>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Bind the socket and build the client.
    pub async fn open(self) -> Result<HttpuClient, NetError> {
        let bind = self.bind.unwrap_or_else(|| "0.0.0.0:0".to_string());
        let config = self.config.unwrap_or_default();
        let socket = DeadlineSocket::bind(&bind, &config).await?;

        Ok(HttpuClient {
            socket: Arc::new(socket),
            exchange_lock: Mutex::new(()),
            resolver: self.resolver.unwrap_or_else(|| Arc::new(GaiResolver::new())),
            config,
        })
    }
}
