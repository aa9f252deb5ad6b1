//! Fault capture - turns a panicking job run into a typed outcome.

use crate::job::Job;
use futures::FutureExt;
use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::{Cell, RefCell};
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Once;

/// A job run that ended in a panic.
#[derive(Debug, Clone, thiserror::Error)]
#[error("job panicked: {message}")]
pub struct JobFault {
    /// Panic payload rendered as text
    pub message: String,

    /// Stack trace captured where the panic was raised
    pub trace: String,
}

impl JobFault {
    fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let trace = LAST_TRACE
            .with(|slot| slot.borrow_mut().take())
            .map(|trace| trace.to_string())
            .unwrap_or_else(|| Backtrace::force_capture().to_string());

        Self {
            message: panic_message(payload.as_ref()),
            trace,
        }
    }
}

thread_local! {
    static LAST_TRACE: RefCell<Option<Backtrace>> = const { RefCell::new(None) };
    static CATCH_DEPTH: Cell<usize> = const { Cell::new(0) };
}

static TRACE_HOOK: Once = Once::new();

/// Marks the current thread as polling a job inside [`catch_fault`].
struct CatchRegion;

impl CatchRegion {
    fn enter() -> Self {
        CATCH_DEPTH.with(|depth| depth.set(depth.get() + 1));
        Self
    }
}

impl Drop for CatchRegion {
    fn drop(&mut self) {
        let _ = CATCH_DEPTH.try_with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

fn in_catch_region() -> bool {
    CATCH_DEPTH.try_with(|depth| depth.get() > 0).unwrap_or(false)
}

/// Install the panic hook that records a stack trace for [`catch_fault`].
///
/// Panics raised while a job is polled inside [`catch_fault`] are recorded
/// and not reported by the hook, since the caller reports them. Every other
/// panic goes to the hook that was installed before this one. Calling this
/// more than once is a no-op.
pub fn install_trace_hook() {
    TRACE_HOOK.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            if in_catch_region() {
                let _ = LAST_TRACE
                    .try_with(|slot| *slot.borrow_mut() = Some(Backtrace::force_capture()));
            } else {
                previous(info);
            }
        }));
    });
}

/// Run `job` once, returning `Err` if it panicked.
///
/// The panic is caught on the thread that polled the job, which is also the
/// thread the hook recorded the trace on. A fault that unwinds without
/// passing through the hook (`resume_unwind`) gets a trace of the catch site.
pub async fn catch_fault(job: &dyn Job) -> Result<(), JobFault> {
    install_trace_hook();
    let mut run = job.run();
    let tracked = futures::future::poll_fn(move |cx| {
        LAST_TRACE.with(|slot| slot.borrow_mut().take());
        let _region = CatchRegion::enter();
        run.as_mut().poll(cx)
    });
    AssertUnwindSafe(tracked)
        .catch_unwind()
        .await
        .map_err(JobFault::from_panic)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Box<dyn Any>".to_string()
    }
}
