//! Declarative chain configuration.

use crate::{DelayIfStillRunning, Recover, SkipIfStillRunning};
use cronwrap_core::{Chain, JobWrapper, SharedLogger};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

/// Error type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur while loading a chain configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Wrapper name not recognised
    #[error("unknown wrapper: {0}")]
    UnknownWrapper(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// The wrappers a chain can be built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WrapperKind {
    /// [`Recover`]
    Recover,
    /// [`DelayIfStillRunning`]
    DelayIfStillRunning,
    /// [`SkipIfStillRunning`]
    SkipIfStillRunning,
}

impl WrapperKind {
    /// Every kind, in declaration order.
    pub const ALL: [WrapperKind; 3] = [
        WrapperKind::Recover,
        WrapperKind::DelayIfStillRunning,
        WrapperKind::SkipIfStillRunning,
    ];

    /// Kebab-case name, as used in config files and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            WrapperKind::Recover => "recover",
            WrapperKind::DelayIfStillRunning => "delay-if-still-running",
            WrapperKind::SkipIfStillRunning => "skip-if-still-running",
        }
    }

    /// Instantiate the wrapper, reporting through `logger`.
    pub fn wrapper(&self, logger: SharedLogger) -> Arc<dyn JobWrapper> {
        match self {
            WrapperKind::Recover => Arc::new(Recover::new(logger)),
            WrapperKind::DelayIfStillRunning => Arc::new(DelayIfStillRunning::new(logger)),
            WrapperKind::SkipIfStillRunning => Arc::new(SkipIfStillRunning::new(logger)),
        }
    }
}

impl fmt::Display for WrapperKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WrapperKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ConfigError::UnknownWrapper(wanted.to_string()))
    }
}

/// Chain description, outermost wrapper first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Wrappers to apply
    #[serde(default)]
    pub wrappers: Vec<WrapperKind>,
}

impl ChainConfig {
    /// Create a config from wrapper kinds.
    pub fn new(wrappers: Vec<WrapperKind>) -> Self {
        Self { wrappers }
    }

    /// Parse a JSON document such as `{"wrappers": ["recover"]}`.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON config file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = tokio::fs::read_to_string(path).await?;
        Self::from_json(&json)
    }

    /// Build the chain, every wrapper sharing `logger`.
    pub fn build(&self, logger: SharedLogger) -> Chain {
        Chain::new(
            self.wrappers
                .iter()
                .map(|kind| kind.wrapper(logger.clone()))
                .collect(),
        )
    }
}
