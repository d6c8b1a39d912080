//! Fan-out over several HTTPU clients.
//!
//! Discovery usually has to cover every network interface. A
//! [`MultiClient`] holds one [`HttpuClient`] per local address, runs the
//! same exchange on all of them at once and concatenates the replies. The
//! `goupnp-local-address` header on each reply tells which interface heard
//! it.

use crate::base::neterror::NetError;
use crate::client::{Executing, HttpuClient, HttpuExecutor, Responses};
use futures::future::join_all;
use http::Request;
use std::time::Duration;

#[derive(Debug, Default)]
pub struct MultiClient {
    clients: Vec<HttpuClient>,
}

impl MultiClient {
    pub fn new(clients: Vec<HttpuClient>) -> Self {
        Self { clients }
    }

    /// Open one client per IP literal in `addresses`.
    pub async fn open_on_addresses<S: AsRef<str>>(addresses: &[S]) -> Result<Self, NetError> {
        let mut clients = Vec::with_capacity(addresses.len());
        for address in addresses {
            clients.push(HttpuClient::open_on_address(address.as_ref()).await?);
        }
        Ok(Self { clients })
    }

    pub fn clients(&self) -> &[HttpuClient] {
        &self.clients
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// Run [`HttpuClient::execute`] on every client concurrently.
    ///
    /// Replies are grouped by client, in client order. If any client fails
    /// to send, that error is returned and all replies are discarded.
    pub async fn execute(
        &self,
        req: &Request<()>,
        timeout: Duration,
        num_sends: usize,
    ) -> Result<Responses, NetError> {
        let results = join_all(
            self.clients
                .iter()
                .map(|client| client.execute(req, timeout, num_sends)),
        )
        .await;
        merge(results)
    }

    /// Run [`HttpuClient::execute_with_context`] on every client
    /// concurrently.
    pub async fn execute_with_context(
        &self,
        req: &Request<()>,
        num_sends: usize,
    ) -> Result<Responses, NetError> {
        let results = join_all(
            self.clients
                .iter()
                .map(|client| client.execute_with_context(req, num_sends)),
        )
        .await;
        merge(results)
    }

    /// Close every client, reporting the first failure.
    pub fn close(&self) -> Result<(), NetError> {
        let mut first_error = None;
        for client in &self.clients {
            if let Err(e) = client.close() {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

fn merge(results: Vec<Result<Responses, NetError>>) -> Result<Responses, NetError> {
    let mut all = Vec::new();
    for result in results {
        all.extend(result?);
    }
    Ok(all)
}

impl HttpuExecutor for MultiClient {
    fn execute<'a>(
        &'a self,
        req: &'a Request<()>,
        timeout: Duration,
        num_sends: usize,
    ) -> Executing<'a> {
        Box::pin(MultiClient::execute(self, req, timeout, num_sends))
    }

    fn execute_with_context<'a>(
        &'a self,
        req: &'a Request<()>,
        num_sends: usize,
    ) -> Executing<'a> {
        Box::pin(MultiClient::execute_with_context(self, req, num_sends))
    }
}
