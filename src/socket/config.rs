//! HTTPU client configuration.

use std::time::Duration;

/// Socket and exchange tuning for an HTTPU client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpuConfig {
    /// Receive buffer per datagram; longer datagrams are truncated
    pub recv_buffer_size: usize,
    /// Pause after each copy of the request is written
    pub send_interval: Duration,
    /// Pause before retrying a read after a temporary error
    pub temporary_backoff: Duration,
    /// How far into the past the read deadline is moved on cancellation
    pub cancel_margin: Duration,
    /// Enable `SO_BROADCAST`
    pub broadcast: bool,
    /// IPv4 multicast TTL
    pub multicast_ttl: Option<u32>,
    /// IPv4 multicast loopback
    pub multicast_loop: Option<bool>,
}

impl Default for HttpuConfig {
    fn default() -> Self {
        Self {
            // Enough for typical discovery replies.
            recv_buffer_size: 2048,
            send_interval: Duration::from_millis(5),
            temporary_backoff: Duration::from_millis(10),
            cancel_margin: Duration::from_secs(1),
            broadcast: false,
            multicast_ttl: None,
            multicast_loop: None,
        }
    }
}

impl HttpuConfig {
    /// Create a new config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set receive buffer size.
    pub fn recv_buffer_size(mut self, size: usize) -> Self {
        self.recv_buffer_size = size;
        self
    }

    /// Set the pause between repeated sends.
    pub fn send_interval(mut self, interval: Duration) -> Self {
        self.send_interval = interval;
        self
    }

    /// Set the backoff after a temporary receive error.
    pub fn temporary_backoff(mut self, backoff: Duration) -> Self {
        self.temporary_backoff = backoff;
        self
    }

    /// Set the cancellation margin.
    pub fn cancel_margin(mut self, margin: Duration) -> Self {
        self.cancel_margin = margin;
        self
    }

    /// Enable or disable broadcast.
    pub fn broadcast(mut self, enable: bool) -> Self {
        self.broadcast = enable;
        self
    }

    /// Set multicast TTL.
    pub fn multicast_ttl(mut self, ttl: u32) -> Self {
        self.multicast_ttl = Some(ttl);
        self
    }

    /// Enable or disable multicast loopback.
    pub fn multicast_loop(mut self, enable: bool) -> Self {
        self.multicast_loop = Some(enable);
        self
    }
}
