use mtl_encode::EncodeError;
use thiserror::Error;

/// Errors raised while loading or compiling a mapping.
///
/// Every term-level failure carries the index of the triple pattern and the
/// position inside it, so nothing is skipped silently.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("failed to load mapping: {0}")]
    Load(String),

    #[error("triple {triple}: missing subject")]
    MissingSubject { triple: usize },

    #[error("triple {triple}, {position}: {source}")]
    Term {
        triple: usize,
        position: String,
        #[source]
        source: EncodeError,
    },

    #[error("invalid base directive: {0}")]
    InvalidBase(String),
}

impl CompileError {
    pub fn term(triple: usize, position: impl Into<String>, source: EncodeError) -> Self {
        CompileError::Term {
            triple,
            position: position.into(),
            source,
        }
    }
}
