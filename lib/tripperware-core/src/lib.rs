//! Core types and traits for tripperware middlewares.
//!
//! This crate provides the foundational types used by tripperware:
//! - [`Handler`] and [`HandlerFn`] - The request-processing capability
//! - [`Context`] - Cancellation and deadline signal for a request
//! - [`Error`] and [`Result`] - Error handling
//! - [`ErrorClass`] - Retry classification of an error
//! - [`StatusCode`] - HTTP status codes (re-exported from `http` crate)

mod context;
mod error;
mod handler;
pub mod prelude;

pub use context::Context;
pub use error::{Error, ErrorClass, Result};
pub use handler::{Handler, HandlerFn, handler_fn};

// Re-export http crate status codes
pub use http::StatusCode;
