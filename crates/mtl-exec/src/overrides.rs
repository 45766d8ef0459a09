//! Static override maps bound under `map`.
//!
//! Two file formats are accepted:
//! - `key:value` lines (blank lines and `#` comments skipped)
//! - a two-row CSV: header row of keys, one row of values
//!
//! When several files are loaded, later files override earlier ones.

use std::collections::BTreeMap;
use std::path::Path;

use mtl_readers::parse_records;

use crate::error::ExecError;

/// Merged static bindings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideMap {
    entries: BTreeMap<String, String>,
}

impl OverrideMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every file in order
    pub fn load_all<P: AsRef<Path>>(paths: &[P]) -> Result<Self, ExecError> {
        let mut map = Self::new();
        for path in paths {
            map.merge(Self::load(path.as_ref())?);
        }
        Ok(map)
    }

    /// `.csv` files are read as two-row CSV, anything else as `key:value`
    pub fn load(path: &Path) -> Result<Self, ExecError> {
        let display = path.display().to_string();
        let text = std::fs::read_to_string(path).map_err(|e| ExecError::Override {
            path: display.clone(),
            message: e.to_string(),
        })?;

        let is_csv = path
            .extension()
            .and_then(|e| e.to_str())
            .map_or(false, |e| e.eq_ignore_ascii_case("csv"));
        let parsed = if is_csv {
            parse_two_row_csv(&text)
        } else {
            parse_key_values(&text)
        };
        let entries = parsed.map_err(|message| ExecError::Override {
            path: display.clone(),
            message,
        })?;

        tracing::debug!(path = %path.display(), entries = entries.len(), "loaded overrides");
        Ok(Self { entries })
    }

    /// Entries of `other` replace entries with the same key
    pub fn merge(&mut self, other: OverrideMap) {
        self.entries.extend(other.entries);
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> BTreeMap<String, String> {
        self.entries
    }
}

/// `key:value` per line, split at the first `:`
pub fn parse_key_values(text: &str) -> Result<BTreeMap<String, String>, String> {
    let mut entries = BTreeMap::new();
    for (number, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (key, value) = line
            .split_once(':')
            .ok_or_else(|| format!("line {}: expected 'key:value'", number + 1))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(format!("line {}: empty key", number + 1));
        }
        entries.insert(key.to_string(), value.trim().to_string());
    }
    Ok(entries)
}

/// Header row of keys and exactly one row of values
pub fn parse_two_row_csv(text: &str) -> Result<BTreeMap<String, String>, String> {
    let records = parse_records(text).map_err(|e| e.to_string())?;
    let (keys, values) = match records.as_slice() {
        [keys, values] => (keys, values),
        other => return Err(format!("expected 2 rows, found {}", other.len())),
    };
    if keys.len() != values.len() {
        return Err(format!(
            "{} keys but {} values",
            keys.len(),
            values.len()
        ));
    }

    Ok(keys
        .iter()
        .zip(values)
        .map(|(k, v)| {
            (
                k.clone().into_value().unwrap_or_default().trim().to_string(),
                v.clone().into_value().unwrap_or_default(),
            )
        })
        .collect())
}
