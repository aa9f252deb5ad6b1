//! Logging capability consumed by the wrappers.

use std::fmt;
use std::sync::Arc;

/// Sink for the records wrappers emit.
///
/// Where records end up is owned by the caller.
pub trait Logger: Send + Sync {
    /// Record an informational message.
    fn info(&self, args: fmt::Arguments<'_>);

    /// Record an error.
    fn error(&self, args: fmt::Arguments<'_>);
}

/// Shared handle to a logger.
pub type SharedLogger = Arc<dyn Logger>;

/// Logger that forwards to `tracing` under the `cronwrap` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl TracingLogger {
    /// Create a shared tracing logger.
    pub fn shared() -> SharedLogger {
        Arc::new(Self)
    }
}

impl Logger for TracingLogger {
    fn info(&self, args: fmt::Arguments<'_>) {
        tracing::info!(target: "cronwrap", "{}", args);
    }

    fn error(&self, args: fmt::Arguments<'_>) {
        tracing::error!(target: "cronwrap", "{}", args);
    }
}
