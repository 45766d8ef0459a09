//! Run configuration loaded from YAML.
//!
//! ```yaml
//! base_iri: "http://ex.org/"
//! policy: fail            # or lenient
//! libraries: [rdf, string, frame]
//! readers:
//!   people: { kind: csv, path: data/people.csv }
//! overrides: [overrides/base.properties]
//! parametric: { reader: people, query: "*" }
//! output: out/people.nq
//! parallel: false
//! ```
//!
//! The base IRI can be overridden with `MTL_BASE_IRI`.

use mtl_core::UnresolvedPolicy;
use mtl_out::LIBRARIES;
use mtl_readers::ReaderConfig;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::error::ExecError;

/// Environment variable overriding [`RunConfig::base_iri`]
pub const BASE_IRI_ENV: &str = "MTL_BASE_IRI";

/// Which reader and query feed a parametric run
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RowQuery {
    pub reader: String,
    #[serde(default = "select_all")]
    pub query: String,
}

fn select_all() -> String {
    "*".to_string()
}

impl RowQuery {
    pub fn new(reader: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            reader: reader.into(),
            query: query.into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub base_iri: Option<String>,
    #[serde(default)]
    pub prefixes: BTreeMap<String, String>,
    #[serde(default)]
    pub policy: UnresolvedPolicy,
    #[serde(default = "default_libraries")]
    pub libraries: Vec<String>,
    #[serde(default)]
    pub readers: BTreeMap<String, ReaderConfig>,
    #[serde(default)]
    pub overrides: Vec<PathBuf>,
    #[serde(default)]
    pub parametric: Option<RowQuery>,
    #[serde(default)]
    pub output: Option<PathBuf>,
    #[serde(default)]
    pub parallel: bool,
    #[serde(default)]
    pub verbose: bool,
    /// Normalize every artifact through the N-Quads formatter
    #[serde(default)]
    pub format: bool,
}

fn default_libraries() -> Vec<String> {
    LIBRARIES.iter().map(|l| l.to_string()).collect()
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            base_iri: None,
            prefixes: BTreeMap::new(),
            policy: UnresolvedPolicy::default(),
            libraries: default_libraries(),
            readers: BTreeMap::new(),
            overrides: Vec::new(),
            parametric: None,
            output: None,
            parallel: false,
            verbose: false,
            format: false,
        }
    }
}

impl RunConfig {
    /// Load a configuration from a YAML file
    pub fn load(path: &str) -> Result<Self, ExecError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ExecError::Config(format!("failed to read {}: {}", path, e)))?;
        Self::from_yaml(&content)
    }

    /// Parse a configuration from YAML content
    pub fn from_yaml(yaml: &str) -> Result<Self, ExecError> {
        serde_yaml::from_str(yaml).map_err(|e| ExecError::Config(e.to_string()))
    }

    /// Apply `MTL_BASE_IRI` from the process environment
    pub fn apply_env(self) -> Self {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Apply environment overrides read through `lookup`
    pub fn apply_env_with<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base) = lookup(BASE_IRI_ENV).filter(|b| !b.trim().is_empty()) {
            tracing::debug!(base = %base, "base IRI taken from {}", BASE_IRI_ENV);
            self.base_iri = Some(base);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RunConfig::from_yaml("{}").unwrap();
        assert_eq!(config.policy, UnresolvedPolicy::Fail);
        assert_eq!(config.libraries, vec!["rdf", "string", "frame"]);
        assert!(config.parametric.is_none());
        assert!(!config.parallel);
    }

    #[test]
    fn test_full_config() {
        let yaml = r#"
base_iri: "http://ex.org/"
policy: lenient
libraries: [rdf]
readers:
  people: { kind: csv, path: people.csv }
overrides: [a.properties, b.csv]
parametric: { reader: people }
output: out/people.nq
parallel: true
"#;
        let config = RunConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.policy, UnresolvedPolicy::Lenient);
        assert_eq!(config.parametric, Some(RowQuery::new("people", "*")));
        assert_eq!(config.overrides.len(), 2);
        assert!(config.readers.contains_key("people"));
        assert!(config.parallel);
    }

    #[test]
    fn test_env_override() {
        let config = RunConfig::from_yaml("base_iri: \"http://a.org/\"").unwrap();
        let config = config.apply_env_with(|key| {
            (key == BASE_IRI_ENV).then(|| "http://b.org/".to_string())
        });
        assert_eq!(config.base_iri.as_deref(), Some("http://b.org/"));

        let config = config.apply_env_with(|_| Some("  ".to_string()));
        assert_eq!(config.base_iri.as_deref(), Some("http://b.org/"));
    }

    #[test]
    fn test_unknown_policy_is_rejected() {
        assert!(matches!(
            RunConfig::from_yaml("policy: maybe"),
            Err(ExecError::Config(_))
        ));
    }
}
