//! Request context carrying cancellation and deadline signals.
//!
//! A [`Context`] travels with every handler call. Middlewares and handlers
//! poll it with [`Context::err`] or await [`Context::done`] to stop work the
//! caller no longer wants.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use tripperware_core::{Context, Error};
//!
//! let root = Context::background();
//! let ctx = root.with_timeout(Duration::from_secs(30));
//! assert!(ctx.err().is_none());
//!
//! ctx.cancel();
//! assert_eq!(ctx.err(), Some(Error::Canceled));
//! assert!(root.err().is_none());
//! ```

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::Error;

/// Cancellation and deadline signal for a single request.
///
/// Clones share the same signal: cancelling any clone cancels them all.
/// Derived contexts ([`Context::with_cancel`], [`Context::with_deadline`])
/// are cancelled with their parent, but never cancel it.
#[derive(Debug, Clone, Default)]
pub struct Context {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl Context {
    /// A context that is never cancelled and has no deadline.
    #[must_use]
    pub fn background() -> Self {
        Self::default()
    }

    /// Derive a child context that can be cancelled on its own.
    #[must_use]
    pub fn with_cancel(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
        }
    }

    /// Derive a child context expiring at `deadline`.
    ///
    /// The parent deadline still applies if it is earlier.
    #[must_use]
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let deadline = self
            .deadline
            .map_or(deadline, |parent| parent.min(deadline));
        Self {
            token: self.token.child_token(),
            deadline: Some(deadline),
        }
    }

    /// Derive a child context expiring after `timeout`.
    #[must_use]
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Cancel this context and every context derived from it.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Deadline of this context, if any.
    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Why this context is done, or `None` while it is still live.
    ///
    /// Cancellation is reported before an expired deadline.
    #[must_use]
    pub fn err(&self) -> Option<Error> {
        if self.token.is_cancelled() {
            Some(Error::Canceled)
        } else if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            Some(Error::DeadlineExceeded)
        } else {
            None
        }
    }

    /// Returns `true` once the context is cancelled or expired.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.err().is_some()
    }

    /// Wait until the context is cancelled or its deadline passes.
    pub async fn done(&self) {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    () = self.token.cancelled() => {}
                    () = tokio::time::sleep_until(deadline) => {}
                }
            }
            None => self.token.cancelled().await,
        }
    }
}
