use mtl_core::SourceError;
use mtl_frame::FrameError;
use mtl_out::RenderError;
use thiserror::Error;

/// Errors raised while executing a template
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("rows resolve to the same id '{0}'")]
    DuplicateRowId(String),

    #[error("row {row_id}: {source}")]
    Row {
        row_id: String,
        #[source]
        source: RenderError,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("override file {path}: {message}")]
    Override { path: String, message: String },

    #[error("config: {0}")]
    Config(String),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Frame(#[from] FrameError),
}
