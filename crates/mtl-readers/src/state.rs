//! Verbosity and shutdown flags shared by every reader.
use std::sync::atomic::{AtomicBool, Ordering};

use mtl_core::{Dataframe, SourceError};

#[derive(Debug)]
pub(crate) struct ReaderState {
    label: String,
    verbose: AtomicBool,
    closed: AtomicBool,
}

impl ReaderState {
    pub(crate) fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            verbose: AtomicBool::new(false),
            closed: AtomicBool::new(false),
        }
    }

    pub(crate) fn label(&self) -> &str {
        &self.label
    }

    pub(crate) fn set_verbose(&self, verbose: bool) {
        self.verbose.store(verbose, Ordering::Relaxed);
    }

    pub(crate) fn shut_down(&self) {
        self.closed.store(true, Ordering::Relaxed);
    }

    pub(crate) fn ensure_open(&self) -> Result<(), SourceError> {
        if self.closed.load(Ordering::Relaxed) {
            Err(SourceError::ShutDown(self.label.clone()))
        } else {
            Ok(())
        }
    }

    /// Log a finished query at `info` when verbose, `debug` otherwise
    pub(crate) fn log_query(&self, kind: &str, query: &str, frame: &Dataframe) {
        if self.verbose.load(Ordering::Relaxed) {
            tracing::info!(reader = %self.label, kind, query, rows = frame.len(), "query");
        } else {
            tracing::debug!(reader = %self.label, kind, query, rows = frame.len(), "query");
        }
    }
}
