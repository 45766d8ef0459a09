//! Source and formatter contracts
use std::path::Path;

use crate::data_model::Dataframe;
use crate::error::SourceError;

/// Uniform query contract over every source kind.
///
/// Executor and dataframe logic only ever talk to this trait; they never
/// branch on the concrete source behind it.
pub trait Reader: Send + Sync {
    /// Short source kind label (ex: "csv", "json")
    fn kind(&self) -> &'static str;

    /// Run `query` and return its rows
    fn dataframe(&self, query: &str) -> Result<Dataframe, SourceError>;

    /// Every row the source holds
    fn full_dataframe(&self) -> Result<Dataframe, SourceError>;

    /// Toggle query logging at `info` level
    fn set_verbose(&self, verbose: bool);

    /// Release the underlying connection or session
    fn shut_down(&self) -> Result<(), SourceError> {
        Ok(())
    }
}

/// Output formatter contract.
pub trait Formatter: Send + Sync {
    fn format_string(&self, text: &str) -> Result<String, SourceError>;

    /// Reformat a file in place
    fn format_file(&self, path: &Path) -> Result<(), SourceError> {
        let text = std::fs::read_to_string(path)?;
        let formatted = self.format_string(&text)?;
        std::fs::write(path, formatted)?;
        Ok(())
    }
}
