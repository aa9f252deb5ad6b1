//! Serialization of overlapping runs.

use async_trait::async_trait;
use cronwrap_core::{Job, JobWrapper, SharedJob, SharedLogger};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// Waits longer than this are reported at info level.
pub const DELAY_LOG_THRESHOLD: Duration = Duration::from_secs(60);

/// Delays a run until the previous run of the same job has finished.
///
/// Runs never overlap and none are dropped; they queue on a fair lock and
/// execute in the order they started waiting. If runs take longer than the
/// interval between invocations the queue grows without bound.
///
/// The wait is measured from the call to lock acquisition. A wait longer than
/// [`DELAY_LOG_THRESHOLD`] is logged with its duration.
pub struct DelayIfStillRunning {
    logger: SharedLogger,
}

impl DelayIfStillRunning {
    /// Create the wrapper, reporting through `logger`.
    pub fn new(logger: SharedLogger) -> Self {
        Self { logger }
    }
}

impl JobWrapper for DelayIfStillRunning {
    fn wrap(&self, job: SharedJob) -> SharedJob {
        Arc::new(SerializedJob {
            inner: job,
            lock: Mutex::new(()),
            logger: self.logger.clone(),
        })
    }
}

struct SerializedJob {
    inner: SharedJob,
    lock: Mutex<()>,
    logger: SharedLogger,
}

#[async_trait]
impl Job for SerializedJob {
    async fn run(&self) {
        let start = Instant::now();
        let _guard = self.lock.lock().await;

        let waited = start.elapsed();
        if waited > DELAY_LOG_THRESHOLD {
            self.logger.info(format_args!(
                "delay job={} duration={:?}",
                self.inner.name(),
                waited
            ));
        }
        debug!(job = self.inner.name(), ?waited, "Lock acquired");

        self.inner.run().await;
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
