//! Errors raised by sources and formatters
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("IO/{0}")]
    Io(#[from] std::io::Error),

    #[error("PARSE/{0}")]
    Parse(String),

    #[error("QUERY/{reader}: {message}")]
    Query { reader: String, message: String },

    #[error("READER/unknown reader '{0}'")]
    UnknownReader(String),

    #[error("READER/'{0}' has been shut down")]
    ShutDown(String),

    #[error("FORMAT/{0}")]
    Format(String),
}

impl SourceError {
    pub fn query(reader: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Query {
            reader: reader.into(),
            message: message.into(),
        }
    }
}
