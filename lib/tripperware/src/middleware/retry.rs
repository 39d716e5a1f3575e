//! Retry middleware for tripperware handlers.
//!
//! [`RetryMiddleware`] re-issues a failed request to the inner handler until
//! it succeeds, fails with a client error (4xx), the caller's [`Context`] is
//! done, or the attempt budget runs out. Retries are issued back-to-back,
//! without backoff.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use tower::Layer;
use tracing::{Instrument, debug, debug_span, warn};

use super::RetryMetrics;
use crate::{Context, Handler, Result, RetryConfig};

/// Middleware that retries failed requests.
///
/// Retries:
/// - 5xx server errors
/// - errors without a status code
///
/// Client errors (4xx) are returned on first occurrence. When the budget is
/// exhausted the most recent failure is returned.
///
/// # Example
///
/// ```
/// use tripperware::middleware::RetryMiddleware;
/// use tripperware::{Context, Error, handler_fn};
///
/// let handler = RetryMiddleware::new(5).wrap(handler_fn(|_ctx: Context, _req: ()| async {
///     Err::<(), _>(Error::http(503, "Service Unavailable"))
/// }));
/// # let _ = handler;
/// ```
#[derive(Clone)]
pub struct RetryMiddleware {
    max_retries: u32,
    metrics: Option<Arc<dyn RetryMetrics>>,
}

impl fmt::Debug for RetryMiddleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryMiddleware")
            .field("max_retries", &self.max_retries)
            .field("metrics", &self.metrics.is_some())
            .finish()
    }
}

impl RetryMiddleware {
    /// Create a retry middleware making at most `max_retries` attempts.
    ///
    /// `max_retries` counts attempts, not extra retries: `5` means at most
    /// five calls to the inner handler. A value of `0` is raised to `1`.
    #[must_use]
    pub fn new(max_retries: u32) -> Self {
        if max_retries == 0 {
            warn!("max_retries is 0, falling back to a single attempt");
        }
        Self {
            max_retries: max_retries.max(1),
            metrics: None,
        }
    }

    /// Create a retry middleware from configuration.
    #[must_use]
    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(config.max_retries)
    }

    /// Report retries to the given sink.
    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<dyn RetryMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Maximum number of attempts per request.
    #[must_use]
    pub const fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Wrap a handler with retry behavior.
    #[must_use]
    pub fn wrap<H>(&self, inner: H) -> Retry<H> {
        self.layer(inner)
    }
}

impl<H> Layer<H> for RetryMiddleware {
    type Service = Retry<H>;

    fn layer(&self, inner: H) -> Self::Service {
        Retry {
            inner,
            max_retries: self.max_retries,
            metrics: self.metrics.clone(),
        }
    }
}

/// Handler that retries the inner handler.
///
/// Created by [`RetryMiddleware::wrap`].
#[derive(Clone)]
pub struct Retry<H> {
    inner: H,
    max_retries: u32,
    metrics: Option<Arc<dyn RetryMetrics>>,
}

impl<H: fmt::Debug> fmt::Debug for Retry<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Retry")
            .field("inner", &self.inner)
            .field("max_retries", &self.max_retries)
            .finish_non_exhaustive()
    }
}

impl<H> Retry<H> {
    /// The wrapped handler.
    #[must_use]
    pub fn get_ref(&self) -> &H {
        &self.inner
    }
}

impl<H, Req> Handler<Req> for Retry<H>
where
    H: Handler<Req>,
    Req: Clone + Send,
{
    type Response = H::Response;

    fn call(
        &self,
        ctx: Context,
        request: Req,
    ) -> impl Future<Output = Result<Self::Response>> + Send {
        let span = debug_span!("retry", max_retries = self.max_retries);

        async move {
            let mut tries = 0;
            let result = loop {
                // Checked before every attempt, the first one included.
                if let Some(err) = ctx.err() {
                    debug!(tries, error = %err, "context done, not retrying");
                    break Err(err);
                }

                tries += 1;
                match self.inner.call(ctx.clone(), request.clone()).await {
                    Ok(response) => break Ok(response),
                    Err(err) if !err.class().is_retriable() => break Err(err),
                    Err(err) => {
                        warn!(attempt = tries, error = %err, "error processing request");
                        if tries >= self.max_retries {
                            break Err(err);
                        }
                        if let Some(metrics) = &self.metrics {
                            metrics.record_retry();
                        }
                    }
                }
            };

            if let Some(metrics) = &self.metrics {
                metrics.observe_tries(tries);
            }
            result
        }
        .instrument(span)
    }
}
