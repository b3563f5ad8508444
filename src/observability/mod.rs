//! Observability infrastructure.
//!
//! Provides:
//! - Structured logging via `tracing-subscriber`

pub mod tracing;
