//! Job wrappers for cronwrap.
//!
//! This crate provides the overlap and fault policies a scheduler composes
//! into a [`Chain`](cronwrap_core::Chain) when it registers a job:
//!
//! - [`Recover`] contains panics and logs them.
//! - [`DelayIfStillRunning`] queues a run behind the previous one.
//! - [`SkipIfStillRunning`] drops a run while the previous one is active.

#![warn(missing_docs)]

pub mod config;
pub mod delay;
pub mod recover;
pub mod skip;

#[cfg(test)]
mod test_support;

pub use config::{ChainConfig, ConfigError, WrapperKind};
pub use delay::{DelayIfStillRunning, DELAY_LOG_THRESHOLD};
pub use recover::Recover;
pub use skip::SkipIfStillRunning;
