use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum NetError {
    // Construction Errors
    #[error("Invalid listening address: {0}")]
    InvalidAddress(String),
    #[error("Failed to bind UDP socket on {addr}: {source}")]
    BindFailed {
        addr: String,
        #[source]
        source: Arc<io::Error>,
    },

    // Transmission Errors
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Address invalid: {0}")]
    AddressInvalid(String),
    #[error("Name not resolved")]
    NameNotResolved,
    #[error("Name not resolved for {domain}: {source}")]
    NameNotResolvedFor {
        domain: String,
        #[source]
        source: Arc<io::Error>,
    },
    #[error("Failed to send request to {addr}: {source}")]
    SendFailed {
        addr: SocketAddr,
        #[source]
        source: Arc<io::Error>,
    },
    #[error("httpu: wrote {written} bytes rather than full {expected} in request")]
    ShortWrite { written: usize, expected: usize },

    // Transport Errors
    #[error("Failed to receive response: {0}")]
    ReceiveFailed(#[source] Arc<io::Error>),
    #[error("Socket closed")]
    SocketClosed,

    // Response Errors
    #[error("Invalid HTTP response: {0}")]
    InvalidHttpResponse(String),
    #[error("Response headers truncated")]
    ResponseHeadersTruncated,
    #[error("Response headers too big")]
    ResponseHeadersTooBig,
    #[error("Content-Length mismatch: declared {declared}, available {available}")]
    ContentLengthMismatch { declared: usize, available: usize },
    #[error("Response headers multiple Content-Length")]
    ResponseHeadersMultipleContentLength,
    #[error("Unsupported transfer encoding: {0}")]
    UnsupportedTransferEncoding(String),
}

impl NetError {
    pub fn bind_failed(addr: impl Into<String>, source: io::Error) -> Self {
        NetError::BindFailed {
            addr: addr.into(),
            source: Arc::new(source),
        }
    }

    pub fn send_failed(addr: SocketAddr, source: io::Error) -> Self {
        NetError::SendFailed {
            addr,
            source: Arc::new(source),
        }
    }

    pub fn dns_failed(domain: impl Into<String>, source: io::Error) -> Self {
        NetError::NameNotResolvedFor {
            domain: domain.into(),
            source: Arc::new(source),
        }
    }

    /// Classify a receive-side io error. A closed socket maps to
    /// [`NetError::SocketClosed`]; everything else is a fatal receive error.
    pub fn from_receive(source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotConnected {
            NetError::SocketClosed
        } else {
            NetError::ReceiveFailed(Arc::new(source))
        }
    }

    /// True for errors raised while putting the request on the wire.
    pub fn is_transmission(&self) -> bool {
        matches!(
            self,
            NetError::InvalidRequest(_)
                | NetError::AddressInvalid(_)
                | NetError::NameNotResolved
                | NetError::NameNotResolvedFor { .. }
                | NetError::SendFailed { .. }
                | NetError::ShortWrite { .. }
        )
    }

    /// True for errors that only ever describe a single bad datagram.
    pub fn is_malformed_response(&self) -> bool {
        matches!(
            self,
            NetError::InvalidHttpResponse(_)
                | NetError::ResponseHeadersTruncated
                | NetError::ResponseHeadersTooBig
                | NetError::ContentLengthMismatch { .. }
                | NetError::ResponseHeadersMultipleContentLength
                | NetError::UnsupportedTransferEncoding(_)
        )
    }
}
