//! Reader configuration and construction.
//!
//! ```yaml
//! readers:
//!   people: { kind: csv, path: data/people.csv }
//!   departments: { kind: json, path: data/departments.json, pointer: /departments }
//!   inline:
//!     kind: memory
//!     rows:
//!       - { id: "1", name: "Ann" }
//! ```

use mtl_core::{Dataframe, Reader, Row, SourceError};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::csv::CsvReader;
use crate::json::JsonReader;
use crate::memory::MemoryReader;

/// One configured source, tagged by `kind`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ReaderConfig {
    Csv {
        path: PathBuf,
    },
    Json {
        path: PathBuf,
        #[serde(default)]
        pointer: Option<String>,
    },
    Memory {
        #[serde(default)]
        rows: Vec<Row>,
    },
}

impl ReaderConfig {
    /// Build the reader; relative paths resolve against `root`
    pub fn build(&self, name: &str, root: &Path) -> Result<Arc<dyn Reader>, SourceError> {
        let reader: Arc<dyn Reader> = match self {
            ReaderConfig::Csv { path } => Arc::new(CsvReader::open(&resolve(root, path))?),
            ReaderConfig::Json { path, pointer } => {
                let reader = JsonReader::open(&resolve(root, path))?;
                match pointer {
                    Some(pointer) => Arc::new(reader.with_default_pointer(pointer.clone())),
                    None => Arc::new(reader),
                }
            }
            ReaderConfig::Memory { rows } => {
                Arc::new(MemoryReader::new(Dataframe::new(rows.clone())).named(name))
            }
        };
        tracing::info!(reader = name, kind = reader.kind(), "reader ready");
        Ok(reader)
    }
}

fn resolve(root: &Path, path: &Path) -> String {
    if path.is_absolute() {
        path.to_string_lossy().to_string()
    } else {
        root.join(path).to_string_lossy().to_string()
    }
}

/// Named readers for one run
#[derive(Default)]
pub struct ReaderSet {
    readers: BTreeMap<String, Arc<dyn Reader>>,
}

impl ReaderSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_configs(
        configs: &BTreeMap<String, ReaderConfig>,
        root: &Path,
    ) -> Result<Self, SourceError> {
        let mut set = Self::new();
        for (name, config) in configs {
            set.insert(name.clone(), config.build(name, root)?);
        }
        Ok(set)
    }

    pub fn insert(&mut self, name: impl Into<String>, reader: Arc<dyn Reader>) {
        self.readers.insert(name.into(), reader);
    }

    pub fn get(&self, name: &str) -> Result<&Arc<dyn Reader>, SourceError> {
        self.readers
            .get(name)
            .ok_or_else(|| SourceError::UnknownReader(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.readers.keys().map(String::as_str)
    }

    pub fn set_verbose(&self, verbose: bool) {
        for reader in self.readers.values() {
            reader.set_verbose(verbose);
        }
    }

    /// Shut every reader down, reporting the first failure
    pub fn shut_down(&self) -> Result<(), SourceError> {
        let mut first_error = None;
        for (name, reader) in &self.readers {
            if let Err(e) = reader.shut_down() {
                tracing::warn!(reader = %name, error = %e, "shutdown failed");
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    pub fn into_map(self) -> BTreeMap<String, Arc<dyn Reader>> {
        self.readers
    }
}
