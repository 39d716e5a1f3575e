//! Request logging middleware.
//!
//! This middleware logs request outcomes and durations using the `tracing` crate.

use std::future::Future;
use std::time::Instant;

use tower::Layer;
use tracing::{Instrument, debug, info, info_span, warn};

use crate::{Context, Handler, Result};

/// Middleware that adds request logging.
///
/// # Example
///
/// ```
/// use tripperware::middleware::{LoggingMiddleware, RetryMiddleware, ServiceBuilder};
/// use tripperware::{Context, Error, handler_fn};
///
/// let inner = handler_fn(|_ctx: Context, query: String| async move {
///     Ok::<_, Error>(query.len())
/// });
///
/// let handler = ServiceBuilder::new()
///     .layer(LoggingMiddleware::new())
///     .layer(RetryMiddleware::new(5))
///     .service(inner);
/// # let _ = handler;
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingMiddleware {
    level: LogLevel,
}

/// Log level for the logging middleware.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    /// Log at debug level (context details).
    Debug,
    /// Log at info level (summary only).
    #[default]
    Info,
}

impl LoggingMiddleware {
    /// Create a new logging middleware with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a logging middleware that logs at debug level.
    #[must_use]
    pub fn debug() -> Self {
        Self {
            level: LogLevel::Debug,
        }
    }

    /// Wrap a handler with request logging.
    #[must_use]
    pub fn wrap<H>(&self, inner: H) -> Logging<H> {
        self.layer(inner)
    }
}

impl<H> Layer<H> for LoggingMiddleware {
    type Service = Logging<H>;

    fn layer(&self, inner: H) -> Self::Service {
        Logging {
            inner,
            level: self.level,
        }
    }
}

/// Handler that logs requests and their outcome.
#[derive(Debug, Clone)]
pub struct Logging<H> {
    inner: H,
    level: LogLevel,
}

impl<H> Logging<H> {
    /// Create a new logging handler wrapping the given handler.
    pub fn new(inner: H) -> Self {
        Self {
            inner,
            level: LogLevel::Info,
        }
    }
}

impl<H, Req> Handler<Req> for Logging<H>
where
    H: Handler<Req>,
    Req: Send,
{
    type Response = H::Response;

    fn call(
        &self,
        ctx: Context,
        request: Req,
    ) -> impl Future<Output = Result<Self::Response>> + Send {
        let span = info_span!("tripperware_request");
        let level = self.level;

        async move {
            let start = Instant::now();

            match level {
                LogLevel::Debug => {
                    debug!(deadline = ?ctx.deadline(), "processing request");
                }
                LogLevel::Info => {
                    info!("processing request");
                }
            }

            let result = self.inner.call(ctx, request).await;

            // Saturating conversion to u64 (truncates after ~584 million years)
            let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

            match &result {
                Ok(_) => info!(elapsed_ms, "request completed"),
                Err(err) => warn!(error = %err, status = ?err.status(), elapsed_ms, "request failed"),
            }

            result
        }
        .instrument(span)
    }
}
