//! Job abstraction - the unit of invocable work.

use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;

/// A unit of scheduled work.
///
/// A job is invoked repeatedly by a scheduler, possibly from several tasks at
/// once. Running it may panic; whether that panic reaches the caller depends
/// on the wrappers around it.
#[async_trait]
pub trait Job: Send + Sync {
    /// Run the job once.
    async fn run(&self);

    /// Label used in log records.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Shared handle to a job, as held by schedulers and wrappers.
pub type SharedJob = Arc<dyn Job>;

/// Job backed by an async closure.
pub struct FnJob<F> {
    name: String,
    func: F,
}

impl<F, Fut> FnJob<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    /// Wrap a closure as a job.
    pub fn new(func: F) -> Self {
        Self::named("fn-job", func)
    }

    /// Wrap a closure as a job with an explicit name.
    pub fn named(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }

    /// Convert into a shared job handle.
    pub fn shared(self) -> SharedJob {
        Arc::new(self)
    }
}

#[async_trait]
impl<F, Fut> Job for FnJob<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    async fn run(&self) {
        (self.func)().await
    }

    fn name(&self) -> &str {
        &self.name
    }
}
