//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types and functions
//! for easy glob importing:
//!
//! ```ignore
//! use tripperware::prelude::*;
//! ```

pub use crate::middleware::{LoggingMiddleware, RetryMetrics, RetryMiddleware, ServiceBuilder};
pub use crate::{
    Context, Error, ErrorClass, Handler, HandlerFn, Result, RetryConfig, handler_fn,
};
