use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    /// Both join partners carry these columns and they are not the join key
    #[error("duplicate columns: {}", columns.join(", "))]
    DuplicateColumn { columns: Vec<String> },

    #[error("column '{0}' already exists")]
    ColumnExists(String),

    #[error("column '{0}' not found")]
    MissingColumn(String),
}
