//! Template loading for MTL-OUT.
//!
//! A template library is a YAML file of named templates:
//!
//! ```yaml
//! version: "1.0"
//! templates:
//!   people:
//!     description: One foaf:Person per row
//!     template: |
//!       <http://ex.org/people/{{row.id}}> a <http://xmlns.com/foaf/0.1/Person> .
//! ```
//!
//! Any other file is read as a single template named `default`.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::RenderError;

/// Name given to a template loaded from a plain file
pub const DEFAULT_TEMPLATE: &str = "default";

/// Named templates
#[derive(Debug, Clone, Deserialize)]
pub struct TemplateLibrary {
    #[serde(default = "default_version")]
    pub version: String,
    pub templates: BTreeMap<String, TemplateDef>,
}

/// A single template definition
#[derive(Debug, Clone, Deserialize)]
pub struct TemplateDef {
    #[serde(default)]
    pub description: String,
    pub template: String,
}

fn default_version() -> String {
    "1.0".to_string()
}

impl TemplateLibrary {
    /// One template under [`DEFAULT_TEMPLATE`]
    pub fn single(source: impl Into<String>) -> Self {
        let mut templates = BTreeMap::new();
        templates.insert(
            DEFAULT_TEMPLATE.to_string(),
            TemplateDef {
                description: String::new(),
                template: source.into(),
            },
        );
        Self {
            version: default_version(),
            templates,
        }
    }

    /// Load a `.yaml`/`.yml` library, or any other file as a single template
    pub fn load(path: &str) -> Result<Self, RenderError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| RenderError::Template(format!("failed to read {}: {}", path, e)))?;

        let is_yaml = Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .map_or(false, |e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));

        if is_yaml {
            Self::from_yaml(&content)
        } else {
            Ok(Self::single(content))
        }
    }

    /// Parse a library from YAML content
    pub fn from_yaml(yaml: &str) -> Result<Self, RenderError> {
        serde_yaml::from_str(yaml).map_err(|e| RenderError::Template(e.to_string()))
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.templates.get(name).map(|t| t.template.as_str())
    }

    /// Template to use when none is named: `default`, else the only one
    pub fn primary(&self) -> Option<&str> {
        self.get(DEFAULT_TEMPLATE).or_else(|| {
            if self.templates.len() == 1 {
                self.templates.values().next().map(|t| t.template.as_str())
            } else {
                None
            }
        })
    }

    pub fn names(&self) -> Vec<&str> {
        self.templates.keys().map(String::as_str).collect()
    }
}
