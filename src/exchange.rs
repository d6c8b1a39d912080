//! The HTTPU request/response exchange.
//!
//! One exchange serializes the request, resolves its destination, sends
//! `num_sends` copies, then reads replies until the read deadline passes.
//! Only failures to put the request on the wire are errors; a bad reply
//! just doesn't make it into the result.
//!
//! Cancellation is grafted onto the deadline: a watcher task waits for the
//! context to finish and then moves the socket's read deadline into the
//! past, which ends the read loop through its normal timeout path.

use crate::base::cancel::Context;
use crate::base::context::IoResultExt;
use crate::base::neterror::NetError;
use crate::dns::{Destination, Resolve};
use crate::http::headers::LOCAL_ADDRESS_HEADER;
use crate::http::request::{destination_host, serialize_request};
use crate::http::response::parse_response;
use crate::socket::config::HttpuConfig;
use crate::socket::udp::{is_temporary, is_timeout, DeadlineSocket};
use bytes::Bytes;
use http::header::{HeaderName, HeaderValue};
use http::{Request, Response};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::Instant;

pub(crate) struct Exchange<'a> {
    pub(crate) socket: &'a Arc<DeadlineSocket>,
    pub(crate) resolver: &'a dyn Resolve,
    pub(crate) config: &'a HttpuConfig,
}

impl Exchange<'_> {
    pub(crate) async fn run(
        &self,
        req: &Request<()>,
        ctx: &Context,
        num_sends: usize,
    ) -> Result<Vec<Response<Bytes>>, NetError> {
        let payload = serialize_request(req)?;
        let local_addr = self.socket.local_addr();
        let dest = Destination::parse(&destination_host(req)?)?
            .resolve(self.resolver, local_addr)
            .await?;

        // Without a deadline this clears any deadline left by a previous
        // exchange; the read loop then ends only on cancellation or close.
        let generation = self.socket.arm(ctx.deadline());
        let _watcher = DeadlineWatcher::spawn(
            self.socket.clone(),
            generation,
            ctx.clone(),
            self.config.cancel_margin,
        );

        // A finished context ends the send phase; the read loop below then
        // times out at once.
        for attempt in 1..=num_sends {
            if ctx.is_done() {
                tracing::debug!(%dest, attempt, num_sends, "context done, skipping remaining sends");
                break;
            }
            let written = self.socket.send_to(&payload, dest).await.send_context(dest)?;
            if written < payload.len() {
                return Err(NetError::ShortWrite {
                    written,
                    expected: payload.len(),
                });
            }
            tracing::debug!(%dest, attempt, num_sends, bytes = written, "sent HTTPU request");

            tokio::select! {
                _ = tokio::time::sleep(self.config.send_interval) => {}
                _ = ctx.done() => {}
            }
        }

        let local_ip = HeaderValue::try_from(local_addr.ip().to_string()).ok();
        let mut responses = Vec::new();
        let mut buf = vec![0u8; self.config.recv_buffer_size];
        loop {
            let (n, from) = match self.socket.recv_from(&mut buf).await {
                Ok(read) => read,
                Err(e) if is_timeout(&e) => break,
                Err(e) if is_temporary(&e) => {
                    tracing::warn!(error = %e, "temporary receive error, retrying");
                    tokio::time::sleep(self.config.temporary_backoff).await;
                    continue;
                }
                Err(e) => return Err(NetError::from_receive(e)),
            };
            tracing::trace!(%from, bytes = n, "received datagram");

            let mut response = match parse_response(&buf[..n], req.method()) {
                Ok(response) => response,
                Err(e) => {
                    tracing::debug!(%from, error = %e, "dropping unparseable response");
                    continue;
                }
            };
            if let Some(ip) = &local_ip {
                response
                    .headers_mut()
                    .append(HeaderName::from_static(LOCAL_ADDRESS_HEADER), ip.clone());
            }
            responses.push(response);
        }

        tracing::debug!(%dest, count = responses.len(), "HTTPU exchange complete");
        Ok(responses)
    }
}

/// Expires the read deadline when the exchange's context finishes.
///
/// Dropping the watcher stops the task; a watcher that loses that race is
/// still harmless because it only touches its own read window.
struct DeadlineWatcher {
    _done: oneshot::Sender<()>,
}

impl DeadlineWatcher {
    fn spawn(
        socket: Arc<DeadlineSocket>,
        generation: u64,
        ctx: Context,
        margin: Duration,
    ) -> Self {
        let (done_tx, done_rx) = oneshot::channel::<()>();
        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = done_rx => {}
                _ = ctx.done() => {
                    let now = Instant::now();
                    let past = now.checked_sub(margin).unwrap_or(now);
                    if socket.expire(generation, past) {
                        tracing::debug!("exchange context done, expiring read deadline");
                    }
                }
            }
        });
        Self { _done: done_tx }
    }
}
