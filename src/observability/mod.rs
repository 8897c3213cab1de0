//! Observability module
//!
//! Structured logging for gallery builds.

pub mod logging;

pub use logging::{init_logging, verbosity_to_directive};
