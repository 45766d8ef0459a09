//! Tree source: a JSON document queried with JSON pointers.
//!
//! A query is a JSON pointer (`/departments`) naming an array of objects or a
//! single object. `*` or an empty query uses the reader's default pointer.
//! Scalar fields are stringified, nested arrays and objects are kept as their
//! JSON text, and `null` stays null.

use mtl_core::{Dataframe, Reader, Row, SourceError};
use serde_json::Value;

use crate::state::ReaderState;

#[derive(Debug)]
pub struct JsonReader {
    document: Value,
    default_pointer: String,
    state: ReaderState,
}

impl JsonReader {
    pub fn open(path: &str) -> Result<Self, SourceError> {
        let text = std::fs::read_to_string(path)?;
        let document = serde_json::from_str(&text)
            .map_err(|e| SourceError::Parse(format!("{}: {}", path, e)))?;
        Ok(Self {
            document,
            default_pointer: String::new(),
            state: ReaderState::new(path),
        })
    }

    pub fn from_value(document: Value) -> Self {
        Self {
            document,
            default_pointer: String::new(),
            state: ReaderState::new("json"),
        }
    }

    /// Pointer used for `*`, empty queries and full dumps
    pub fn with_default_pointer(mut self, pointer: impl Into<String>) -> Self {
        self.default_pointer = pointer.into();
        self
    }

    fn rows_at(&self, pointer: &str) -> Result<Dataframe, SourceError> {
        let node = self.document.pointer(pointer).ok_or_else(|| {
            SourceError::query(self.state.label(), format!("no value at '{}'", pointer))
        })?;

        match node {
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    object_row(item).ok_or_else(|| {
                        SourceError::query(
                            self.state.label(),
                            format!("item {} under '{}' is not an object", i, pointer),
                        )
                    })
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Dataframe::new),
            other => object_row(other)
                .map(|row| Dataframe::new(vec![row]))
                .ok_or_else(|| {
                    SourceError::query(
                        self.state.label(),
                        format!("'{}' is neither an object nor an array", pointer),
                    )
                }),
        }
    }
}

fn object_row(value: &Value) -> Option<Row> {
    value.as_object().map(|object| {
        object
            .iter()
            .map(|(key, value)| {
                let cell = match value {
                    Value::Null => None,
                    Value::String(s) => Some(s.clone()),
                    other => Some(other.to_string()),
                };
                (key.clone(), cell)
            })
            .collect()
    })
}

impl Reader for JsonReader {
    fn kind(&self) -> &'static str {
        "json"
    }

    fn dataframe(&self, query: &str) -> Result<Dataframe, SourceError> {
        self.state.ensure_open()?;
        let query = query.trim();
        let pointer = if query.is_empty() || query == "*" {
            self.default_pointer.as_str()
        } else {
            query
        };
        let frame = self.rows_at(pointer)?;
        self.state.log_query(self.kind(), pointer, &frame);
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
