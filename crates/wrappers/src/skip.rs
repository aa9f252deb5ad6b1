//! Skipping of overlapping runs.

use async_trait::async_trait;
use cronwrap_core::{Job, JobWrapper, SharedJob, SharedLogger};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Skips a run if the previous run of the same job is still in progress.
///
/// Skipped runs are not queued: the call returns immediately after logging
/// a "skip" record at info level. The running slot is given back when the
/// run ends, including when it panics.
pub struct SkipIfStillRunning {
    logger: SharedLogger,
}

impl SkipIfStillRunning {
    /// Create the wrapper, reporting through `logger`.
    pub fn new(logger: SharedLogger) -> Self {
        Self { logger }
    }
}

impl JobWrapper for SkipIfStillRunning {
    fn wrap(&self, job: SharedJob) -> SharedJob {
        Arc::new(ExclusiveJob {
            inner: job,
            slot: Semaphore::new(1),
            logger: self.logger.clone(),
        })
    }
}

struct ExclusiveJob {
    inner: SharedJob,
    /// One permit: present while idle, held while running.
    slot: Semaphore,
    logger: SharedLogger,
}

#[async_trait]
impl Job for ExclusiveJob {
    async fn run(&self) {
        let Ok(_running) = self.slot.try_acquire() else {
            self.logger.info(format_args!("skip job={}", self.inner.name()));
            return;
        };
        self.inner.run().await;
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recover::Recover;
    use crate::test_support::RecordingLogger;
    use cronwrap_core::{Chain, FnJob};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::time::sleep;

    /// Counts runs started and runs finished.
    #[derive(Default)]
    struct Runs {
        started: AtomicUsize,
        finished: AtomicUsize,
    }

    impl Runs {
        fn started(&self) -> usize {
            self.started.load(Ordering::SeqCst)
        }

        fn finished(&self) -> usize {
            self.finished.load(Ordering::SeqCst)
        }
    }

    fn counting_job(runs: &Arc<Runs>, work: Duration) -> SharedJob {
        let runs = runs.clone();
        FnJob::named("counted", move || {
            let runs = runs.clone();
            async move {
                runs.started.fetch_add(1, Ordering::SeqCst);
                sleep(work).await;
                runs.finished.fetch_add(1, Ordering::SeqCst);
            }
        })
        .shared()
    }

    fn fails_first_time(calls: &Arc<AtomicUsize>) -> SharedJob {
        let calls = calls.clone();
        FnJob::named("flaky", move || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    panic!("flaky first run");
                }
            }
        })
        .shared()
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_run_is_skipped() {
        let logger = RecordingLogger::shared();
        let runs = Arc::new(Runs::default());
        let job = SkipIfStillRunning::new(logger.clone())
            .wrap(counting_job(&runs, Duration::from_secs(10)));

        let first = tokio::spawn({
            let job = job.clone();
            async move { job.run().await }
        });
        sleep(Duration::from_millis(1)).await;

        // Returns straight away while the first run is still sleeping.
        job.run().await;
        assert_eq!(runs.started(), 1);
        assert_eq!(runs.finished(), 0);
        assert!(!first.is_finished());

        first.await.unwrap();

        let infos = logger.infos();
        assert_eq!(infos.len(), 1);
        assert!(infos[0].starts_with("skip"));
        assert_eq!(runs.started(), 1);
        assert_eq!(runs.finished(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sequential_runs_are_not_skipped() {
        let logger = RecordingLogger::shared();
        let runs = Arc::new(Runs::default());
        let job = SkipIfStillRunning::new(logger.clone())
            .wrap(counting_job(&runs, Duration::from_secs(1)));

        job.run().await;
        job.run().await;

        assert_eq!(runs.started(), 2);
        assert_eq!(runs.finished(), 2);
        assert!(logger.records().is_empty());
    }

    #[tokio::test]
    async fn test_slot_restored_after_panic() {
        let logger = RecordingLogger::shared();
        let calls = Arc::new(AtomicUsize::new(0));
        let job = SkipIfStillRunning::new(logger.clone()).wrap(fails_first_time(&calls));

        let faulted = tokio::spawn({
            let job = job.clone();
            async move { job.run().await }
        })
        .await;
        assert!(faulted.unwrap_err().is_panic());

        job.run().await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(logger.infos().is_empty());
    }

    #[tokio::test]
    async fn test_recover_outside_skip() {
        let logger = RecordingLogger::shared();
        let calls = Arc::new(AtomicUsize::new(0));
        let wrappers: Vec<Arc<dyn JobWrapper>> = vec![
            Arc::new(Recover::new(logger.clone())),
            Arc::new(SkipIfStillRunning::new(logger.clone())),
        ];
        let job = Chain::new(wrappers).then(fails_first_time(&calls));

        job.run().await;
        job.run().await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(logger.errors().len(), 1);
        assert!(logger.errors()[0].contains("flaky first run"));
        assert!(logger.infos().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_each_wrapped_job_has_its_own_slot() {
        let logger = RecordingLogger::shared();
        let runs = Arc::new(Runs::default());
        let skip = SkipIfStillRunning::new(logger.clone());
        let a = skip.wrap(counting_job(&runs, Duration::from_secs(5)));
        let b = skip.wrap(counting_job(&runs, Duration::from_secs(5)));

        tokio::join!(a.run(), b.run());

        assert_eq!(runs.finished(), 2);
        assert!(logger.records().is_empty());
    }
}
