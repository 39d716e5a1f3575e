//! Middlewares for tripperware handlers.
//!
//! A middleware is a [`Layer`]: it takes an inner [`Handler`](crate::Handler)
//! and returns an outer handler with the same signature, so middlewares stack
//! freely. With [`ServiceBuilder`], the first layer added is the outermost
//! one and sees requests first.
//!
//! # Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `metrics` | [`RetryMiddlewareMetrics`] sink on the `metrics` facade (default) |
//!
//! # Available Middlewares
//!
//! - [`RetryMiddleware`] - Retries failed requests, never on client errors
//! - [`LoggingMiddleware`] - Logs request outcomes using `tracing`
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use tripperware::middleware::{
//!     LoggingMiddleware, RetryMiddleware, RetryMiddlewareMetrics, ServiceBuilder,
//! };
//! use tripperware::{Context, Error, handler_fn};
//!
//! let inner = handler_fn(|_ctx: Context, query: String| async move {
//!     Ok::<_, Error>(format!("result of {query}"))
//! });
//!
//! let handler = ServiceBuilder::new()
//!     .layer(LoggingMiddleware::new())
//!     .layer(RetryMiddleware::new(5).with_metrics(Arc::new(RetryMiddlewareMetrics::new())))
//!     .service(inner);
//! # let _ = handler;
//! ```

mod logging;
mod metrics;
mod retry;

pub use logging::{LogLevel, Logging, LoggingMiddleware};
#[cfg(feature = "metrics")]
pub use self::metrics::RetryMiddlewareMetrics;
pub use self::metrics::RetryMetrics;
pub use retry::{Retry, RetryMiddleware};

// Re-export tower types for composition
pub use tower::{Layer, ServiceBuilder};
