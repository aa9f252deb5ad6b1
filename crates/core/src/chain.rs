//! Job wrappers and their ordered composition.

use crate::job::SharedJob;
use std::sync::Arc;
use tracing::debug;

/// Decorates a job with extra behavior.
///
/// Each call to [`wrap`](JobWrapper::wrap) produces an independent job; any
/// state the wrapper needs is allocated per call and never shared between
/// the jobs it wraps.
pub trait JobWrapper: Send + Sync {
    /// Wrap `job`, returning the decorated job.
    fn wrap(&self, job: SharedJob) -> SharedJob;
}

impl<F> JobWrapper for F
where
    F: Fn(SharedJob) -> SharedJob + Send + Sync,
{
    fn wrap(&self, job: SharedJob) -> SharedJob {
        self(job)
    }
}

/// An ordered sequence of wrappers applied to a job at registration.
///
/// The first wrapper is the outermost layer:
///
/// ```text
/// Chain::new(vec![m1, m2, m3]).then(job)  ==  m1(m2(m3(job)))
/// ```
#[derive(Clone, Default)]
pub struct Chain {
    wrappers: Vec<Arc<dyn JobWrapper>>,
}

impl Chain {
    /// Create a chain from wrappers, outermost first.
    pub fn new(wrappers: Vec<Arc<dyn JobWrapper>>) -> Self {
        Self { wrappers }
    }

    /// A chain with no wrappers.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Return a new chain with `wrapper` added as the innermost layer.
    pub fn append(&self, wrapper: Arc<dyn JobWrapper>) -> Self {
        let mut wrappers = self.wrappers.clone();
        wrappers.push(wrapper);
        Self { wrappers }
    }

    /// Number of wrappers.
    pub fn len(&self) -> usize {
        self.wrappers.len()
    }

    /// Whether the chain has no wrappers.
    pub fn is_empty(&self) -> bool {
        self.wrappers.is_empty()
    }

    /// Decorate `job` with every wrapper in the chain.
    ///
    /// An empty chain returns `job` itself.
    pub fn then(&self, job: SharedJob) -> SharedJob {
        debug!(job = job.name(), layers = self.wrappers.len(), "Wrapping job");
        self.wrappers
            .iter()
            .rev()
            .fold(job, |inner, wrapper| wrapper.wrap(inner))
    }
}

impl std::fmt::Debug for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chain")
            .field("wrappers", &self.wrappers.len())
            .finish()
    }
}
