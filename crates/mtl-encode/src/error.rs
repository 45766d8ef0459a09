use thiserror::Error;

/// Failures while parsing or encoding a term pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("unclosed reference at offset {offset} in '{pattern}'")]
    UnclosedReference { pattern: String, offset: usize },

    #[error("empty reference at offset {offset} in '{pattern}'")]
    EmptyReference { pattern: String, offset: usize },

    #[error("nested reference at offset {offset} in '{pattern}'")]
    NestedReference { pattern: String, offset: usize },

    #[error("unbalanced '}}' at offset {offset} in '{pattern}'")]
    StrayBrace { pattern: String, offset: usize },

    #[error("reference name '{0}' cannot be bound in a template path")]
    UnbindableName(String),

    #[error("relative IRI '{0}' with no base IRI configured")]
    RelativeIriWithoutBase(String),
}
