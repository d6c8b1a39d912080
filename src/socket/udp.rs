//! UDP socket with a movable read deadline.
//!
//! `tokio::net::UdpSocket` has no notion of a deadline. [`DeadlineSocket`]
//! keeps one in a `watch` channel so another task can move it while a read
//! is pending; the pending read wakes up and re-checks. Moving the deadline
//! into the past is how an exchange is cancelled, and [`close`] wakes a
//! pending read with an error.
//!
//! [`close`]: DeadlineSocket::close

use super::config::HttpuConfig;
use crate::base::context::IoResultExt;
use crate::base::neterror::NetError;
use std::io;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::net::UdpSocket;
use tokio::sync::watch;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, Default)]
struct SocketState {
    read_deadline: Option<Instant>,
    generation: u64,
    closed: bool,
}

/// A UDP socket whose reads honor a deadline that may change mid-read.
#[derive(Debug)]
pub struct DeadlineSocket {
    socket: Mutex<Option<Arc<UdpSocket>>>,
    local_addr: SocketAddr,
    state: watch::Sender<SocketState>,
    #[cfg(test)]
    faults: Mutex<Faults>,
}

/// Failures injected by unit tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct Faults {
    /// Write at most this many bytes per send.
    pub(crate) send_limit: Option<usize>,
    /// Errors returned by the next reads, in order.
    pub(crate) recv_errors: std::collections::VecDeque<io::ErrorKind>,
}

impl DeadlineSocket {
    /// Bind to `addr` (`host:port`) and apply the socket options of `config`.
    pub async fn bind(addr: &str, config: &HttpuConfig) -> Result<Self, NetError> {
        let socket = UdpSocket::bind(addr).await.bind_context(addr)?;
        let local_addr = socket.local_addr().bind_context(addr)?;

        if config.broadcast {
            socket.set_broadcast(true).bind_context(addr)?;
        }
        if local_addr.is_ipv4() {
            if let Some(ttl) = config.multicast_ttl {
                socket.set_multicast_ttl_v4(ttl).bind_context(addr)?;
            }
            if let Some(enable) = config.multicast_loop {
                socket.set_multicast_loop_v4(enable).bind_context(addr)?;
            }
        }

        tracing::debug!(%local_addr, "bound HTTPU socket");
        let (state, _) = watch::channel(SocketState::default());
        Ok(Self {
            socket: Mutex::new(Some(Arc::new(socket))),
            local_addr,
            state,
            #[cfg(test)]
            faults: Mutex::default(),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn read_deadline(&self) -> Option<Instant> {
        self.state.borrow().read_deadline
    }

    /// Set or clear the read deadline. Safe to call while a read is pending.
    pub fn set_read_deadline(&self, deadline: Option<Instant>) {
        self.state.send_modify(|state| state.read_deadline = deadline);
    }

    /// Open a new read window with `deadline` and return its generation.
    pub fn arm(&self, deadline: Option<Instant>) -> u64 {
        let mut generation = 0;
        self.state.send_modify(|state| {
            state.generation += 1;
            state.read_deadline = deadline;
            generation = state.generation;
        });
        generation
    }

    /// Move the deadline of window `generation` to `deadline`.
    ///
    /// No-op once a newer window has been armed; returns whether the
    /// deadline changed.
    pub fn expire(&self, generation: u64, deadline: Instant) -> bool {
        self.state.send_if_modified(|state| {
            if state.generation != generation {
                return false;
            }
            state.read_deadline = Some(deadline);
            true
        })
    }

    pub fn is_closed(&self) -> bool {
        self.state.borrow().closed
    }

    /// Release the socket and wake any pending read with an error.
    pub fn close(&self) -> Result<(), NetError> {
        let released = self
            .socket
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if released.is_none() {
            return Err(NetError::SocketClosed);
        }
        self.state.send_modify(|state| state.closed = true);
        tracing::debug!(local_addr = %self.local_addr, "closed HTTPU socket");
        Ok(())
    }

    fn handle(&self) -> io::Result<Arc<UdpSocket>> {
        self.socket
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or_else(closed_error)
    }

    pub async fn send_to(&self, buf: &[u8], target: SocketAddr) -> io::Result<usize> {
        let socket = self.handle()?;
        #[cfg(test)]
        let send_limit = self.faults().send_limit;
        #[cfg(test)]
        let buf = match send_limit {
            Some(limit) => &buf[..limit.min(buf.len())],
            None => buf,
        };
        let mut state = self.state.subscribe();
        tokio::select! {
            result = socket.send_to(buf, target) => result,
            _ = state.wait_for(|s| s.closed) => Err(closed_error()),
        }
    }

    /// Read one datagram.
    ///
    /// Fails with `TimedOut` once the read deadline has passed and with
    /// `NotConnected` once the socket is closed.
    pub async fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
        let socket = self.handle()?;
        #[cfg(test)]
        if let Some(kind) = self.next_recv_fault() {
            return Err(io::Error::new(kind, "injected receive fault"));
        }
        let mut state = self.state.subscribe();
        loop {
            let SocketState {
                read_deadline,
                closed,
                ..
            } = *state.borrow_and_update();
            if closed {
                return Err(closed_error());
            }
            if read_deadline.is_some_and(|deadline| deadline <= Instant::now()) {
                return Err(timeout_error());
            }

            tokio::select! {
                result = socket.recv_from(&mut *buf) => return result,
                _ = sleep_until(read_deadline) => return Err(timeout_error()),
                changed = state.changed() => {
                    if changed.is_err() {
                        return Err(closed_error());
                    }
                }
            }
        }
    }
}

#[cfg(test)]
impl DeadlineSocket {
    pub(crate) fn faults(&self) -> std::sync::MutexGuard<'_, Faults> {
        self.faults.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_recv_fault(&self) -> Option<io::ErrorKind> {
        self.faults().recv_errors.pop_front()
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

fn timeout_error() -> io::Error {
    io::Error::new(io::ErrorKind::TimedOut, "i/o deadline reached")
}

fn closed_error() -> io::Error {
    io::Error::new(io::ErrorKind::NotConnected, "use of closed socket")
}

/// The read hit its deadline.
pub fn is_timeout(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::TimedOut
}

/// Recoverable receive errors, worth a short pause and another read.
///
/// ICMP port-unreachable from an earlier send surfaces as a reset or
/// refusal on some platforms.
pub fn is_temporary(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::Interrupted
            | io::ErrorKind::WouldBlock
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionAborted
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    async fn bind_local() -> Arc<DeadlineSocket> {
        Arc::new(
            DeadlineSocket::bind("127.0.0.1:0", &HttpuConfig::default())
                .await
                .unwrap(),
        )
    }

    #[tokio::test]
    async fn test_bind_ephemeral() {
        let socket = bind_local().await;
        assert_ne!(socket.local_addr().port(), 0);
        assert!(socket.read_deadline().is_none());
        assert!(!socket.is_closed());
    }

    #[tokio::test]
    async fn test_bind_failure() {
        let err = DeadlineSocket::bind("not-an-address", &HttpuConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, NetError::BindFailed { .. }));
    }

    #[tokio::test]
    async fn test_send_and_receive() {
        let a = bind_local().await;
        let b = bind_local().await;

        let n = a.send_to(b"ping", b.local_addr()).await.unwrap();
        assert_eq!(n, 4);

        let mut buf = [0u8; 16];
        let (n, from) = b.recv_from(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"ping");
        assert_eq!(from, a.local_addr());
    }

    #[tokio::test]
    async fn test_past_deadline_times_out_immediately() {
        let socket = bind_local().await;
        socket.set_read_deadline(Some(Instant::now() - Duration::from_secs(1)));

        let mut buf = [0u8; 16];
        let err = socket.recv_from(&mut buf).await.unwrap_err();
        assert!(is_timeout(&err));
    }

    #[tokio::test]
    async fn test_deadline_moved_during_read() {
        let socket = bind_local().await;
        let reader = {
            let socket = socket.clone();
            tokio::spawn(async move {
                let mut buf = [0u8; 16];
                socket.recv_from(&mut buf).await
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        socket.set_read_deadline(Some(Instant::now() - Duration::from_secs(1)));

        let err = tokio::time::timeout(Duration::from_secs(1), reader)
            .await
            .expect("read should unblock")
            .unwrap()
            .unwrap_err();
        assert!(is_timeout(&err));
    }

    #[tokio::test]
    async fn test_close_wakes_reader() {
        let socket = bind_local().await;
        let reader = {
            let socket = socket.clone();
            tokio::spawn(async move {
                let mut buf = [0u8; 16];
                socket.recv_from(&mut buf).await
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        socket.close().unwrap();

        let err = tokio::time::timeout(Duration::from_secs(1), reader)
            .await
            .expect("read should unblock")
            .unwrap()
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotConnected);
        assert!(!is_timeout(&err));
        assert!(!is_temporary(&err));
    }

    #[tokio::test]
    async fn test_close_twice() {
        let socket = bind_local().await;
        socket.close().unwrap();
        assert!(socket.is_closed());
        assert!(matches!(socket.close(), Err(NetError::SocketClosed)));

        let err = socket
            .send_to(b"x", "127.0.0.1:9".parse().unwrap())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotConnected);
    }

    #[tokio::test]
    async fn test_expire_ignores_stale_generation() {
        let socket = bind_local().await;
        let first = socket.arm(None);
        let second = socket.arm(None);
        assert_ne!(first, second);

        let past = Instant::now() - Duration::from_secs(1);
        assert!(!socket.expire(first, past));
        assert!(socket.read_deadline().is_none());

        assert!(socket.expire(second, past));
        assert_eq!(socket.read_deadline(), Some(past));
    }

    #[tokio::test]
    async fn test_injected_faults() {
        let a = bind_local().await;
        let b = bind_local().await;
        a.faults().send_limit = Some(2);
        b.faults().recv_errors.push_back(io::ErrorKind::Interrupted);

        assert_eq!(a.send_to(b"ping", b.local_addr()).await.unwrap(), 2);

        let mut buf = [0u8; 16];
        let err = b.recv_from(&mut buf).await.unwrap_err();
        assert!(is_temporary(&err));

        let (n, _) = b.recv_from(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"pi");
    }

    #[test]
    fn test_error_classification() {
        let reset = io::Error::new(io::ErrorKind::ConnectionReset, "reset");
        assert!(is_temporary(&reset));
        assert!(!is_timeout(&reset));

        let denied = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        assert!(!is_temporary(&denied));
    }
}
