//! Fault containment.

use async_trait::async_trait;
use cronwrap_core::{catch_fault, install_trace_hook, Job, JobWrapper, SharedJob, SharedLogger};
use std::sync::Arc;

/// Catches panics in the wrapped job and logs them at error level.
///
/// The wrapped job always returns normally. A panicking run produces exactly
/// one error record carrying the panic value and the stack trace; a normal
/// run logs nothing. There is no retry.
pub struct Recover {
    logger: SharedLogger,
}

impl Recover {
    /// Create the wrapper, reporting through `logger`.
    pub fn new(logger: SharedLogger) -> Self {
        Self { logger }
    }
}

impl JobWrapper for Recover {
    fn wrap(&self, job: SharedJob) -> SharedJob {
        install_trace_hook();
        Arc::new(RecoveringJob {
            inner: job,
            logger: self.logger.clone(),
        })
    }
}

struct RecoveringJob {
    inner: SharedJob,
    logger: SharedLogger,
}

#[async_trait]
impl Job for RecoveringJob {
    async fn run(&self) {
        if let Err(fault) = catch_fault(self.inner.as_ref()).await {
            self.logger.error(format_args!(
                "panic: job={} {}\n{}",
                self.inner.name(),
                fault.message,
                fault.trace
            ));
        }
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
