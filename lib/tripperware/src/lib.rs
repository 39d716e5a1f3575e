//! Composable middlewares for a query frontend request pipeline.
//!
//! Handlers process a request under a [`Context`]; middlewares wrap a
//! handler into another handler with the same contract. The main middleware
//! is [`RetryMiddleware`](middleware::RetryMiddleware).
//!
//! # Example
//!
//! ```
//! use tripperware::prelude::*;
//!
//! # async fn run() -> tripperware::Result<()> {
//! let handler = RetryMiddleware::new(5).wrap(handler_fn(|_ctx: Context, query: String| async move {
//!     if query.is_empty() {
//!         return Err(Error::http(400, "empty query"));
//!     }
//!     Ok(query.len())
//! }));
//!
//! let len = handler.call(Context::background(), "up".to_string()).await?;
//! assert_eq!(len, 2);
//! # Ok(())
//! # }
//! ```

mod config;
pub mod middleware;
pub mod prelude;

pub use config::{DEFAULT_MAX_RETRIES, RetryConfig, RetryConfigBuilder};

// Re-export tower for middleware composition
pub use tower;

// Re-export core types
pub use tripperware_core::{
    Context, Error, ErrorClass, Handler, HandlerFn, Result, StatusCode, handler_fn,
};
