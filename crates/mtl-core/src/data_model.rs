//! Data Model: Row, Dataframe, RowId, Artifact, ExecutionResult
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;

/// Field consulted for an explicit row identity.
pub const ID_FIELD: &str = "id";

/// One result of a source query: variable name → nullable value.
pub type Row = BTreeMap<String, Option<String>>;

/// Finite, ordered sequence of rows.
///
/// Operations never mutate a frame in place; every transformation returns a
/// new frame so the rows handed out by a reader stay untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dataframe {
    rows: Vec<Row>,
}

impl Dataframe {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a frame from `(column, value)` literals. Mostly useful in tests.
    pub fn from_pairs<'a, I, R>(rows: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = (&'a str, Option<&'a str>)>,
    {
        let rows = rows
            .into_iter()
            .map(|r| {
                r.into_iter()
                    .map(|(k, v)| (k.to_string(), v.map(str::to_string)))
                    .collect()
            })
            .collect();
        Self { rows }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter()
    }

    /// Union of column names over every row, sorted.
    ///
    /// Rows may be heterogeneous (tree sources rarely agree on a schema), so
    /// the column set is the union rather than the first row's keys.
    pub fn columns(&self) -> BTreeSet<String> {
        self.rows
            .iter()
            .flat_map(|r| r.keys().cloned())
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.rows.iter().any(|r| r.contains_key(name))
    }
}

impl FromIterator<Row> for Dataframe {
    fn from_iter<T: IntoIterator<Item = Row>>(iter: T) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Dataframe {
    type Item = Row;
    type IntoIter = std::vec::IntoIter<Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

/// Deterministic label for one row's output artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RowId {
    /// Taken from the row's `id` field.
    Explicit(String),
    /// Zero-based counter over the rows lacking an `id`.
    Synthetic(usize),
}

impl RowId {
    /// Assign identities to `rows` in source order.
    ///
    /// The synthetic counter only advances on rows without an `id`, so the
    /// assignment depends on source position alone and can be computed before
    /// any row is dispatched to a worker.
    pub fn assign(rows: &[Row]) -> Vec<RowId> {
        let mut counter = 0usize;
        rows.iter()
            .map(|row| match row.get(ID_FIELD) {
                Some(Some(id)) => RowId::Explicit(id.clone()),
                _ => {
                    let id = RowId::Synthetic(counter);
                    counter += 1;
                    id
                }
            })
            .collect()
    }

    /// Suffix spliced into output names: `-<id>` or `-T-id-<n>`.
    pub fn suffix(&self) -> String {
        match self {
            RowId::Explicit(id) => format!("-{}", id),
            RowId::Synthetic(n) => format!("-T-id-{}", n),
        }
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.suffix())
    }
}

/// One materialized output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub content: String,
    /// `blake3:<hex>` over the content bytes
    pub hash: String,
    /// Destination when the artifact was written to disk
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl Artifact {
    pub fn new(content: String) -> Self {
        let hash = format!("blake3:{}", blake3::hash(content.as_bytes()));
        Self {
            content,
            hash,
            path: None,
        }
    }

    pub fn written_to(mut self, path: PathBuf) -> Self {
        self.path = Some(path);
        self
    }
}

/// Per-row artifacts keyed by RowId, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowArtifacts {
    entries: Vec<(RowId, Artifact)>,
}

impl RowArtifacts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, id: RowId, artifact: Artifact) {
        self.entries.push((id, artifact));
    }

    pub fn get(&self, id: &RowId) -> Option<&Artifact> {
        self.entries.iter().find(|(k, _)| k == id).map(|(_, a)| a)
    }

    pub fn ids(&self) -> impl Iterator<Item = &RowId> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RowId, &Artifact)> {
        self.entries.iter().map(|(k, a)| (k, a))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(RowId, Artifact)> for RowArtifacts {
    fn from_iter<T: IntoIterator<Item = (RowId, Artifact)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Outcome of one execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionResult {
    Single(Artifact),
    PerRow(RowArtifacts),
}

impl ExecutionResult {
    pub fn as_single(&self) -> Option<&Artifact> {
        match self {
            ExecutionResult::Single(a) => Some(a),
            ExecutionResult::PerRow(_) => None,
        }
    }

    pub fn as_per_row(&self) -> Option<&RowArtifacts> {
        match self {
            ExecutionResult::PerRow(rows) => Some(rows),
            ExecutionResult::Single(_) => None,
        }
    }
}
