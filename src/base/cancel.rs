//! Exchange deadlines and cancellation.
//!
//! A [`Context`] travels with an `http::Request` in its extensions and tells
//! the exchange engine when to stop listening for replies. It carries an
//! optional absolute deadline and an optional [`CancelToken`].
//!
//! A context with neither never finishes on its own: an exchange run under
//! it listens until the client is closed.

use http::Request;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

/// Cloneable cancellation handle.
///
/// All clones share one flag. Cancelling is idempotent.
#[derive(Clone, Debug)]
pub struct CancelToken {
    state: Arc<watch::Sender<bool>>,
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelToken {
    pub fn new() -> Self {
        let (state, _) = watch::channel(false);
        Self {
            state: Arc::new(state),
        }
    }

    /// Cancel every context holding this token.
    pub fn cancel(&self) {
        self.state.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.state.borrow()
    }

    /// Resolves once [`cancel`](Self::cancel) has been called on any clone.
    pub async fn cancelled(&self) {
        let mut rx = self.state.subscribe();
        // The sender is owned by `self`, so the channel cannot close here.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

/// Deadline and cancellation state of one exchange.
#[derive(Clone, Debug, Default)]
pub struct Context {
    deadline: Option<Instant>,
    cancel: Option<CancelToken>,
}

impl Context {
    /// A context that never expires and is never cancelled.
    pub fn background() -> Self {
        Self::default()
    }

    pub fn with_cancel(token: CancelToken) -> Self {
        Self {
            deadline: None,
            cancel: Some(token),
        }
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
            cancel: None,
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::background().child_with_timeout(timeout)
    }

    /// Attach a cancellation token, keeping the deadline.
    pub fn cancel_on(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Derive a context bounded by `timeout` from now.
    ///
    /// The child shares this context's token and keeps the earlier of the
    /// two deadlines.
    pub fn child_with_timeout(&self, timeout: Duration) -> Self {
        let bound = Instant::now().checked_add(timeout);
        let deadline = match (self.deadline, bound) {
            (Some(current), Some(bound)) => Some(current.min(bound)),
            (current, bound) => current.or(bound),
        };
        Self {
            deadline,
            cancel: self.cancel.clone(),
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn cancel_token(&self) -> Option<&CancelToken> {
        self.cancel.as_ref()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
    }

    /// True once cancelled or past the deadline.
    pub fn is_done(&self) -> bool {
        self.is_cancelled() || self.deadline.is_some_and(|d| d <= Instant::now())
    }

    /// Resolves when the context is cancelled or its deadline passes.
    /// Never resolves for a background context.
    pub async fn done(&self) {
        let cancelled = async {
            match &self.cancel {
                Some(token) => token.cancelled().await,
                None => std::future::pending().await,
            }
        };
        let expired = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending().await,
            }
        };
        tokio::select! {
            _ = cancelled => {}
            _ = expired => {}
        }
    }

    /// The context stored in `req`, or a background context.
    pub fn of<B>(req: &Request<B>) -> Self {
        req.extensions().get::<Context>().cloned().unwrap_or_default()
    }

    /// Store this context in `req`, replacing any previous one.
    pub fn attach<B>(self, req: &mut Request<B>) {
        req.extensions_mut().insert(self);
    }
}
