//! Mapping specification loading.
//!
//! Mapping files are YAML:
//!
//! ```yaml
//! prologue: "@base <http://ex.org/> ."
//! prefixes:
//!   ex: "http://ex.org/ns#"
//! triples:
//!   - subject: "people/{id}"
//!     predicate: a
//!     object: { value: "ex:Person", type: iri }
//!   - subject: "people/{id}"
//!     predicate: "ex:name"
//!     object: { value: "{name}", language: en }
//! ```
//!
//! A term may be a bare string (its pattern) or a map with `value`, `type`,
//! `datatype` and `language`.

use mtl_encode::{TermPattern, TermType};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::error::CompileError;

/// `rdf:type`, what the `a` predicate shorthand stands for
pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

/// Top-level mapping file structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MappingSpec {
    /// Free-form header; may carry a `@base <...>` directive
    #[serde(default)]
    pub prologue: Option<String>,
    #[serde(default)]
    pub prefixes: BTreeMap<String, String>,
    #[serde(default)]
    pub triples: Vec<TriplePattern>,
}

/// One statement pattern
#[derive(Debug, Clone, Deserialize)]
pub struct TriplePattern {
    #[serde(default)]
    pub subject: Option<TermSpec>,
    pub predicate: TermSpec,
    pub object: TermSpec,
    #[serde(default)]
    pub graph: Option<TermSpec>,
}

/// A term as written in the mapping file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "TermSpecRepr")]
pub struct TermSpec {
    pub value: String,
    pub term_type: Option<TermType>,
    pub datatype: Option<String>,
    pub language: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TermSpecRepr {
    Short(String),
    Full {
        value: String,
        #[serde(default, rename = "type")]
        term_type: Option<TermType>,
        #[serde(default)]
        datatype: Option<String>,
        #[serde(default)]
        language: Option<String>,
    },
}

impl From<TermSpecRepr> for TermSpec {
    fn from(repr: TermSpecRepr) -> Self {
        match repr {
            TermSpecRepr::Short(value) => TermSpec::new(value),
            TermSpecRepr::Full {
                value,
                term_type,
                datatype,
                language,
            } => TermSpec {
                value,
                term_type,
                datatype,
                language,
            },
        }
    }
}

/// Position of a term inside a triple pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Subject,
    Predicate,
    Object,
    Graph,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Position::Subject => "subject",
            Position::Predicate => "predicate",
            Position::Object => "object",
            Position::Graph => "graph",
        })
    }
}

impl TermSpec {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            term_type: None,
            datatype: None,
            language: None,
        }
    }

    pub fn iri(value: impl Into<String>) -> Self {
        Self::new(value).with_type(TermType::Iri)
    }

    pub fn literal(value: impl Into<String>) -> Self {
        Self::new(value).with_type(TermType::Literal)
    }

    pub fn blank(value: impl Into<String>) -> Self {
        Self::new(value).with_type(TermType::BlankNode)
    }

    pub fn with_type(mut self, term_type: TermType) -> Self {
        self.term_type = Some(term_type);
        self
    }

    pub fn with_datatype(mut self, datatype: impl Into<String>) -> Self {
        self.datatype = Some(datatype.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Resolve defaults for `position`: objects are literals unless typed
    /// otherwise, every other position is an IRI; the `a` predicate stands
    /// for `rdf:type`.
    pub fn to_pattern(&self, position: Position) -> TermPattern {
        let term_type = self.term_type.unwrap_or(match position {
            Position::Object => TermType::Literal,
            Position::Subject | Position::Predicate | Position::Graph => TermType::Iri,
        });
        let value = if position == Position::Predicate && self.value == "a" {
            RDF_TYPE.to_string()
        } else {
            self.value.clone()
        };

        TermPattern {
            pattern: value,
            term_type,
            datatype: self.datatype.clone(),
            language: self.language.clone(),
        }
    }
}

impl TriplePattern {
    pub fn new(subject: TermSpec, predicate: TermSpec, object: TermSpec) -> Self {
        Self {
            subject: Some(subject),
            predicate,
            object,
            graph: None,
        }
    }

    pub fn in_graph(mut self, graph: TermSpec) -> Self {
        self.graph = Some(graph);
        self
    }
}

impl MappingSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prologue(mut self, prologue: impl Into<String>) -> Self {
        self.prologue = Some(prologue.into());
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>, namespace: impl Into<String>) -> Self {
        self.prefixes.insert(prefix.into(), namespace.into());
        self
    }

    pub fn with_triple(mut self, triple: TriplePattern) -> Self {
        self.triples.push(triple);
        self
    }

    /// Load a mapping from a YAML file
    pub fn load(path: &str) -> Result<Self, CompileError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CompileError::Load(format!("failed to read {}: {}", path, e)))?;
        Self::from_yaml(&content)
    }

    /// Parse a mapping from YAML content
    pub fn from_yaml(yaml: &str) -> Result<Self, CompileError> {
        serde_yaml::from_str(yaml).map_err(|e| CompileError::Load(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_and_full_terms() {
        let yaml = r#"
prefixes:
  ex: "http://ex.org/ns#"
triples:
  - subject: "people/{id}"
    predicate: a
    object: { value: "ex:Person", type: iri }
  - subject: "people/{id}"
    predicate: "ex:age"
    object: { value: "{age}", datatype: "xsd:integer" }
    graph: "graphs/{dept}"
"#;
        let spec = MappingSpec::from_yaml(yaml).unwrap();
        assert_eq!(spec.triples.len(), 2);
        assert_eq!(spec.prefixes["ex"], "http://ex.org/ns#");

        let first = &spec.triples[0];
        assert_eq!(first.subject, Some(TermSpec::new("people/{id}")));
        assert_eq!(first.object.term_type, Some(TermType::Iri));
        assert_eq!(first.predicate.to_pattern(Position::Predicate).pattern, RDF_TYPE);

        let second = &spec.triples[1];
        assert_eq!(second.object.datatype.as_deref(), Some("xsd:integer"));
        assert!(second.graph.is_some());
    }

    #[test]
    fn test_position_defaults() {
        let term = TermSpec::new("{x}");
        assert_eq!(term.to_pattern(Position::Object).term_type, TermType::Literal);
        assert_eq!(term.to_pattern(Position::Subject).term_type, TermType::Iri);
        assert_eq!(term.to_pattern(Position::Graph).term_type, TermType::Iri);
        assert_eq!(
            TermSpec::blank("{x}").to_pattern(Position::Subject).term_type,
            TermType::BlankNode
        );
    }

    #[test]
    fn test_missing_subject_parses() {
        let yaml = r#"
triples:
  - predicate: "http://ex.org/p"
    object: "x"
"#;
        let spec = MappingSpec::from_yaml(yaml).unwrap();
        assert!(spec.triples[0].subject.is_none());
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(matches!(
            MappingSpec::from_yaml("triples: [ {"),
            Err(CompileError::Load(_))
        ));
    }
}
