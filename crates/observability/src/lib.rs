//! Tracing/logging setup shared by the voxgate binaries.

/// Tracing configuration (filters, output format).
pub mod tracing;

pub use self::tracing::{init, init_with, LogFormat};
