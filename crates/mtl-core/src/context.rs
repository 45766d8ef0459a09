//! Binding snapshots handed to one template evaluation.
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

use crate::data_model::Row;

/// Reserved name of the current row in parametric mode.
pub const CURRENT_ROW: &str = "row";
/// Reserved name of the static override map.
pub const STATIC_MAP: &str = "map";
/// Reserved name listing the readers visible to the template.
pub const READERS: &str = "readers";

/// What happens when a reference is absent from the row in use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnresolvedPolicy {
    /// Abort the row (and with it the run).
    #[default]
    Fail,
    /// Resolve to nothing and carry on.
    Lenient,
}

impl std::str::FromStr for UnresolvedPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fail" => Ok(Self::Fail),
            "lenient" => Ok(Self::Lenient),
            other => Err(format!("unknown unresolved-reference policy '{}'", other)),
        }
    }
}

/// Static bindings shared by every evaluation of one run.
///
/// A per-row snapshot is built by overlaying the current row on a copy of
/// these bindings, so nothing from a previous row can leak into the next one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings {
    statics: BTreeMap<String, String>,
    readers: Vec<String>,
}

impl Bindings {
    pub fn new(statics: BTreeMap<String, String>, readers: Vec<String>) -> Self {
        Self { statics, readers }
    }

    pub fn statics(&self) -> &BTreeMap<String, String> {
        &self.statics
    }

    pub fn reader_names(&self) -> &[String] {
        &self.readers
    }

    /// Snapshot without a current row (single-shot mode).
    pub fn snapshot(&self) -> Value {
        let mut root = Map::new();
        root.insert(STATIC_MAP.to_string(), json!(self.statics));
        root.insert(READERS.to_string(), json!(self.readers));
        Value::Object(root)
    }

    /// Snapshot with `row` bound under [`CURRENT_ROW`].
    pub fn snapshot_with_row(&self, row: &Row) -> Value {
        let mut snapshot = self.snapshot();
        if let Value::Object(root) = &mut snapshot {
            root.insert(CURRENT_ROW.to_string(), json!(row));
        }
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_replaces_row() {
        let mut statics = BTreeMap::new();
        statics.insert("lang".to_string(), "en".to_string());
        let bindings = Bindings::new(statics, vec!["people".to_string()]);

        let first: Row = [("a".to_string(), Some("1".to_string()))].into_iter().collect();
        let second: Row = [("b".to_string(), Some("2".to_string()))].into_iter().collect();

        let _ = bindings.snapshot_with_row(&first);
        let snap = bindings.snapshot_with_row(&second);

        assert_eq!(snap["row"]["b"], "2");
        assert!(snap["row"].get("a").is_none());
        assert_eq!(snap["map"]["lang"], "en");
        assert_eq!(snap["readers"][0], "people");
    }

    #[test]
    fn test_policy_parse() {
        assert_eq!("LENIENT".parse::<UnresolvedPolicy>(), Ok(UnresolvedPolicy::Lenient));
        assert_eq!(UnresolvedPolicy::default(), UnresolvedPolicy::Fail);
        assert!("maybe".parse::<UnresolvedPolicy>().is_err());
    }
}
