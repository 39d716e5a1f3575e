//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types and functions
//! for easy glob importing:
//!
//! ```ignore
//! use tripperware_core::prelude::*;
//! ```

pub use crate::{Context, Error, ErrorClass, Handler, HandlerFn, Result, handler_fn};
