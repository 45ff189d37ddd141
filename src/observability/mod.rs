//! Observability module providing structured logging.
//!
//! Log output format and level come from `[observability.logging]`.

#[cfg(feature = "server")]
mod tracing_init;

#[cfg(feature = "server")]
pub use tracing_init::*;
