//! In-memory source over a fixed dataframe.
use mtl_core::{Dataframe, Reader, SourceError};

use crate::filter::RowFilter;
use crate::state::ReaderState;

/// Same `col=value` filter syntax as [`crate::CsvReader`]
#[derive(Debug)]
pub struct MemoryReader {
    frame: Dataframe,
    state: ReaderState,
}

impl MemoryReader {
    pub fn new(frame: Dataframe) -> Self {
        Self {
            frame,
            state: ReaderState::new("memory"),
        }
    }

    pub fn named(mut self, label: impl Into<String>) -> Self {
        self.state = ReaderState::new(label);
        self
    }
}

impl Reader for MemoryReader {
    fn kind(&self) -> &'static str {
        "memory"
    }

    fn dataframe(&self, query: &str) -> Result<Dataframe, SourceError> {
        self.state.ensure_open()?;
        let frame = RowFilter::parse(self.state.label(), query)?.apply(self.state.label(), &self.frame)?;
        self.state.log_query(self.kind(), query, &frame);
        Ok(frame)
    }

    fn full_dataframe(&self) -> Result<Dataframe, SourceError> {
        self.dataframe("*")
    }

    fn set_verbose(&self, verbose: bool) {
        self.state.set_verbose(verbose);
    }

    fn shut_down(&self) -> Result<(), SourceError> {
        self.state.shut_down();
        Ok(())
    }
}
