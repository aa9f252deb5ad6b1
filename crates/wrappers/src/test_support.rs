//! Test doubles shared by the wrapper tests.

use cronwrap_core::Logger;
use std::fmt;
use std::sync::{Arc, Mutex};
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Level {
    Info,
    Error,
}

/// Logger that keeps every record in memory.
#[derive(Default)]
pub(crate) struct RecordingLogger {
    records: Mutex<Vec<(Level, String)>>,
}

impl RecordingLogger {
    pub(crate) fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn records(&self) -> Vec<(Level, String)> {
        self.records.lock().unwrap().clone()
    }

    pub(crate) fn infos(&self) -> Vec<String> {
        self.at(Level::Info)
    }

    pub(crate) fn errors(&self) -> Vec<String> {
        self.at(Level::Error)
    }

    fn at(&self, level: Level) -> Vec<String> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, msg)| msg.clone())
            .collect()
    }
}

impl Logger for RecordingLogger {
    fn info(&self, args: fmt::Arguments<'_>) {
        self.records.lock().unwrap().push((Level::Info, args.to_string()));
    }

    fn error(&self, args: fmt::Arguments<'_>) {
        self.records.lock().unwrap().push((Level::Error, args.to_string()));
    }
}

/// Time span a job run covered.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Window {
    pub(crate) start: Instant,
    pub(crate) end: Instant,
}

/// Windows recorded by runs, in completion order.
#[derive(Default, Clone)]
pub(crate) struct WindowLog(Arc<Mutex<Vec<Window>>>);

impl WindowLog {
    pub(crate) fn push(&self, window: Window) {
        self.0.lock().unwrap().push(window);
    }

    pub(crate) fn snapshot(&self) -> Vec<Window> {
        self.0.lock().unwrap().clone()
    }
}
