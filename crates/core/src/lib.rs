//! cronwrap core abstractions.
//!
//! This crate defines the job contract, the wrapper contract and the chain
//! that composes wrappers around a job at registration time.

#![warn(missing_docs)]

mod chain;
mod fault;
mod job;
mod logger;

pub use chain::{Chain, JobWrapper};
pub use fault::{catch_fault, install_trace_hook, JobFault};
pub use job::{FnJob, Job, SharedJob};
pub use logger::{Logger, SharedLogger, TracingLogger};
