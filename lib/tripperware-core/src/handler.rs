//! The handler capability.
//!
//! - [`Handler`] - "given a context and a request, produce a response or an error"
//! - [`HandlerFn`] - adapts an async closure into a [`Handler`]
//!
//! Middlewares take a handler and return a handler with the same signature,
//! so callers never know how many stages sit between them and the innermost
//! handler.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::{Context, Result};

/// Core request-processing trait.
///
/// `Req` and [`Handler::Response`] are opaque to middlewares. Implementations
/// should respect the [`Context`] they receive and return promptly once it is
/// done.
pub trait Handler<Req>: Send + Sync {
    /// Response produced on success.
    type Response: Send;

    /// Process a request.
    ///
    /// # Errors
    ///
    /// Returns an error if the request could not be processed. Errors carrying
    /// a status code are classified by [`crate::Error::class`].
    fn call(
        &self,
        ctx: Context,
        request: Req,
    ) -> impl Future<Output = Result<Self::Response>> + Send;
}

impl<Req, H> Handler<Req> for &H
where
    H: Handler<Req>,
{
    type Response = H::Response;

    fn call(
        &self,
        ctx: Context,
        request: Req,
    ) -> impl Future<Output = Result<Self::Response>> + Send {
        (**self).call(ctx, request)
    }
}

impl<Req, H> Handler<Req> for Arc<H>
where
    H: Handler<Req>,
{
    type Response = H::Response;

    fn call(
        &self,
        ctx: Context,
        request: Req,
    ) -> impl Future<Output = Result<Self::Response>> + Send {
        (**self).call(ctx, request)
    }
}

// ============================================================================
// Closure Adapter
// ============================================================================

/// A [`Handler`] backed by an async closure.
///
/// Created with [`handler_fn`].
#[derive(Clone, Copy)]
pub struct HandlerFn<F> {
    f: F,
}

/// Turn an async closure into a [`Handler`].
///
/// # Example
///
/// ```
/// use tripperware_core::{Context, Error, Handler, handler_fn};
///
/// let handler = handler_fn(|_ctx: Context, query: String| async move {
///     if query.is_empty() {
///         Err(Error::http(400, "empty query"))
///     } else {
///         Ok(query.len())
///     }
/// });
/// # let _ = handler;
/// ```
pub fn handler_fn<F>(f: F) -> HandlerFn<F> {
    HandlerFn { f }
}

impl<F> fmt::Debug for HandlerFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerFn")
            .field("f", &format_args!("{}", std::any::type_name::<F>()))
            .finish()
    }
}

impl<F, Fut, Req, Resp> Handler<Req> for HandlerFn<F>
where
    F: Fn(Context, Req) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Resp>> + Send,
    Resp: Send,
{
    type Response = Resp;

    fn call(
        &self,
        ctx: Context,
        request: Req,
    ) -> impl Future<Output = Result<Self::Response>> + Send {
        (self.f)(ctx, request)
    }
}
