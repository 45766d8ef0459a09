//! Term encoding: term pattern → template expression.
//!
//! Every reference is rewritten through [`hash`] and bound as a path into the
//! current row, every literal run becomes a quoted string argument, and characters
//! that may not appear raw inside an argument (`#`, `"`, `\`) are replaced by
//! a `sym` sentinel call. The resulting expression calls the routines named in
//! [`crate::runtime`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::datatype::XSD;
use crate::error::EncodeError;
use crate::iri::{expand_curie, is_absolute_iri};
use crate::reference::{hash, segments, Segment};
use crate::runtime;

/// Patterns starting with this prefix are emitted verbatim inside `<...>`.
pub const VERBATIM_PREFIX: &str = "data:";

/// Path segments the template engine would read as literals or keywords.
const RESERVED_PATHS: &[&str] = &["this", "true", "false", "null", "else"];

/// Kind of RDF term a pattern produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TermType {
    #[serde(alias = "IRI", alias = "uri")]
    Iri,
    #[serde(alias = "Literal")]
    Literal,
    #[serde(alias = "BlankNode", alias = "blank_node", alias = "bnode")]
    BlankNode,
}

/// One output term before compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermPattern {
    pub pattern: String,
    pub term_type: TermType,
    pub datatype: Option<String>,
    pub language: Option<String>,
}

impl TermPattern {
    pub fn new(pattern: impl Into<String>, term_type: TermType) -> Self {
        Self {
            pattern: pattern.into(),
            term_type,
            datatype: None,
            language: None,
        }
    }

    pub fn with_datatype(mut self, datatype: impl Into<String>) -> Self {
        self.datatype = Some(datatype.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }
}

/// Base IRI and prefix table threaded through every encode call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderConfig {
    pub base_iri: Option<String>,
    pub prefixes: BTreeMap<String, String>,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        let mut prefixes = BTreeMap::new();
        prefixes.insert("xsd".to_string(), XSD.to_string());
        prefixes.insert(
            "rdf".to_string(),
            "http://www.w3.org/1999/02/22-rdf-syntax-ns#".to_string(),
        );
        prefixes.insert(
            "rdfs".to_string(),
            "http://www.w3.org/2000/01/rdf-schema#".to_string(),
        );
        Self {
            base_iri: None,
            prefixes,
        }
    }
}

impl EncoderConfig {
    pub fn new(base_iri: Option<&str>) -> Self {
        Self {
            base_iri: base_iri.map(str::to_string),
            ..Self::default()
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>, namespace: impl Into<String>) -> Self {
        self.prefixes.insert(prefix.into(), namespace.into());
        self
    }

    pub fn with_prefixes(mut self, prefixes: &BTreeMap<String, String>) -> Self {
        self.prefixes
            .extend(prefixes.iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }
}

/// Encode one term pattern into a template expression.
pub fn encode_term(term: &TermPattern, config: &EncoderConfig) -> Result<String, EncodeError> {
    let pattern = match term.term_type {
        TermType::Iri => expand_curie(&term.pattern, &config.prefixes),
        TermType::Literal | TermType::BlankNode => term.pattern.clone(),
    };
    let segs = segments(&pattern)?;
    let has_refs = segs.iter().any(|s| matches!(s, Segment::Reference(_)));

    if pattern.starts_with(VERBATIM_PREFIX) {
        return verbatim(&segs);
    }

    match term.term_type {
        TermType::Iri => encode_iri_term(&segs, has_refs, config),
        TermType::Literal => {
            let value = value_expr(&segs, false)?;
            if let Some(datatype) = &term.datatype {
                let datatype = expand_curie(datatype, &config.prefixes);
                let datatype = value_expr(&segments(&datatype)?, false)?;
                Ok(call(runtime::TYPED_LITERAL, &[value, datatype]))
            } else if let Some(language) = &term.language {
                let language = value_expr(&segments(language)?, false)?;
                Ok(call(runtime::LANG_LITERAL, &[value, language]))
            } else {
                Ok(call(runtime::LITERAL, &[value]))
            }
        }
        TermType::BlankNode => Ok(call(runtime::BNODE, &[value_expr(&segs, false)?])),
    }
}

fn encode_iri_term(
    segs: &[Segment],
    has_refs: bool,
    config: &EncoderConfig,
) -> Result<String, EncodeError> {
    let base = config.base_iri.as_deref();

    if !has_refs {
        let text = plain_text(segs);
        if is_absolute_iri(&text) {
            if text.contains(|c: char| matches!(c, '{' | '}' | '\\')) {
                return Ok(call(runtime::IRI, &[value_expr(segs, false)?]));
            }
            return Ok(format!("<{}>", text));
        }
        let base = base.ok_or_else(|| EncodeError::RelativeIriWithoutBase(text.clone()))?;
        let joined = Segment::Text(format!("{}{}", base, text));
        return Ok(call(runtime::IRI_ENCODED, &[value_expr(&[joined], false)?]));
    }

    // A lone reference is a whole IRI taken from the row: absoluteness is
    // judged on the raw value, so it is not percent-encoded.
    let value = match segs {
        [Segment::Reference(name)] => reference_path(name)?,
        _ => {
            if let (None, Some(Segment::Text(head))) = (base, segs.first()) {
                if !is_absolute_iri(head) {
                    return Err(EncodeError::RelativeIriWithoutBase(plain_text(segs)));
                }
            }
            value_expr(segs, true)?
        }
    };
    match base {
        Some(base) => {
            let base = value_expr(&[Segment::Text(base.to_string())], false)?;
            Ok(call(runtime::IRI, &[value, base]))
        }
        None => Ok(call(runtime::IRI, &[value])),
    }
}

fn verbatim(segs: &[Segment]) -> Result<String, EncodeError> {
    let mut out = String::from("<");
    for seg in segs {
        match seg {
            Segment::Text(t) => out.push_str(&t.replace("{{", "\\{{")),
            Segment::Reference(name) => {
                out.push_str("{{");
                out.push_str(&reference_path(name)?);
                out.push_str("}}");
            }
        }
    }
    out.push('>');
    Ok(out)
}

fn plain_text(segs: &[Segment]) -> String {
    segs.iter()
        .filter_map(|s| match s {
            Segment::Text(t) => Some(t.as_str()),
            Segment::Reference(_) => None,
        })
        .collect()
}

fn call(function: &str, args: &[String]) -> String {
    format!("{{{{{} {}}}}}", function, args.join(" "))
}

/// Argument expression producing the pattern's string value.
fn value_expr(segs: &[Segment], encode_refs: bool) -> Result<String, EncodeError> {
    let mut pieces = Vec::new();
    for seg in segs {
        match seg {
            Segment::Text(t) => pieces.extend(text_pieces(t)),
            Segment::Reference(name) => {
                let path = reference_path(name)?;
                if encode_refs {
                    pieces.push(format!("({} {})", runtime::ENCODE_URI, path));
                } else {
                    pieces.push(path);
                }
            }
        }
    }

    Ok(match pieces.len() {
        0 => "\"\"".to_string(),
        1 => pieces.remove(0),
        _ => format!("({} {})", runtime::CONCAT, pieces.join(" ")),
    })
}

/// Quoted runs of text, with sentinel calls in place of unsafe characters.
fn text_pieces(text: &str) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut run = String::new();
    for c in text.chars() {
        match runtime::sentinel_name(c) {
            Some(name) => {
                if !run.is_empty() {
                    pieces.push(format!("\"{}\"", std::mem::take(&mut run)));
                }
                pieces.push(format!("({} \"{}\")", runtime::SYM, name));
            }
            None => run.push(c),
        }
    }
    if !run.is_empty() {
        pieces.push(format!("\"{}\"", run));
    }
    pieces
}

/// Template path binding the hashed form of `name` inside the current row.
pub fn reference_path(name: &str) -> Result<String, EncodeError> {
    let hashed = hash(name);
    if hashed.contains(|c: char| matches!(c, '[' | ']' | '{' | '}')) {
        return Err(EncodeError::UnbindableName(name.to_string()));
    }

    let mut chars = hashed.chars();
    let simple = chars
        .next()
        .map_or(false, |c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if simple && !RESERVED_PATHS.contains(&hashed.as_str()) {
        Ok(format!("{}.{}", runtime::ROW_SCOPE, hashed))
    } else {
        Ok(format!("{}.[{}]", runtime::ROW_SCOPE, hashed))
    }
}

/// Escape a value for use between N-Triples literal quotes.
pub fn escape_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> EncoderConfig {
        EncoderConfig::new(Some("http://ex.org/")).with_prefix("ex", "http://ex.org/")
    }

    #[test]
    fn test_absolute_iri_without_references_is_unchanged() {
        for iri in ["http://ex.org/a", "urn:x:y", "http://ex.org/doc#section"] {
            let term = TermPattern::new(iri, TermType::Iri);
            assert_eq!(encode_term(&term, &config()).unwrap(), format!("<{}>", iri));
        }
    }

    #[test]
    fn test_prefixed_constant_expands() {
        let term = TermPattern::new("ex:name", TermType::Iri);
        assert_eq!(encode_term(&term, &config()).unwrap(), "<http://ex.org/name>");
    }

    #[test]
    fn test_iri_with_reference() {
        let term = TermPattern::new("http://ex.org/{id}", TermType::Iri);
        assert_eq!(
            encode_term(&term, &config()).unwrap(),
            r#"{{iri (concat "http://ex.org/" (encode_uri row.id)) "http://ex.org/"}}"#
        );

        let term = TermPattern::new("urn:people:${person-1}", TermType::Iri);
        assert_eq!(
            encode_term(&term, &EncoderConfig::default()).unwrap(),
            r#"{{iri (concat "urn:people:" (encode_uri row.personzb))}}"#
        );
    }

    #[test]
    fn test_lone_reference_is_not_encoded() {
        let term = TermPattern::new("{homepage}", TermType::Iri);
        assert_eq!(
            encode_term(&term, &config()).unwrap(),
            r#"{{iri row.homepage "http://ex.org/"}}"#
        );
        assert_eq!(
            encode_term(&term, &EncoderConfig::default()).unwrap(),
            "{{iri row.homepage}}"
        );
    }

    #[test]
    fn test_relative_template_without_base_fails() {
        let term = TermPattern::new("people/{id}", TermType::Iri);
        assert_eq!(
            encode_term(&term, &EncoderConfig::default()),
            Err(EncodeError::RelativeIriWithoutBase("people/".to_string()))
        );

        let term = TermPattern::new("{scheme}://ex.org/{id}", TermType::Iri);
        assert!(encode_term(&term, &EncoderConfig::default()).is_ok());
    }

    #[test]
    fn test_relative_iri_without_reference() {
        let term = TermPattern::new("about", TermType::Iri);
        assert_eq!(
            encode_term(&term, &config()).unwrap(),
            r#"{{iri_encoded "http://ex.org/about"}}"#
        );
        assert_eq!(
            encode_term(&term, &EncoderConfig::default()),
            Err(EncodeError::RelativeIriWithoutBase("about".to_string()))
        );
    }

    #[test]
    fn test_hash_sign_becomes_sentinel() {
        let term = TermPattern::new("http://ex.org/doc#{section}", TermType::Iri);
        assert_eq!(
            encode_term(&term, &config()).unwrap(),
            r#"{{iri (concat "http://ex.org/doc" (sym "hash") (encode_uri row.section)) "http://ex.org/"}}"#
        );
    }

    #[test]
    fn test_literals() {
        let plain = TermPattern::new("{first-name} {last name}", TermType::Literal);
        assert_eq!(
            encode_term(&plain, &config()).unwrap(),
            r#"{{literal (concat row.firstzname " " row.[last name])}}"#
        );

        let tagged = TermPattern::new("{label}", TermType::Literal).with_language("en");
        assert_eq!(
            encode_term(&tagged, &config()).unwrap(),
            r#"{{lang_literal row.label "en"}}"#
        );

        let typed = TermPattern::new("{age}", TermType::Literal).with_datatype("xsd:integer");
        assert_eq!(
            encode_term(&typed, &config()).unwrap(),
            r#"{{typed_literal row.age (concat "http://www.w3.org/2001/XMLSchema" (sym "hash") "integer")}}"#
        );
    }

    #[test]
    fn test_quotes_in_constant_literal() {
        let term = TermPattern::new("say \"hi\"", TermType::Literal);
        assert_eq!(
            encode_term(&term, &config()).unwrap(),
            r#"{{literal (concat "say " (sym "quote") "hi" (sym "quote"))}}"#
        );
    }

    #[test]
    fn test_blank_node_and_reserved_path() {
        let term = TermPattern::new("{id}", TermType::BlankNode);
        assert_eq!(encode_term(&term, &config()).unwrap(), "{{bnode row.id}}");

        let term = TermPattern::new("{this}", TermType::Literal);
        assert_eq!(encode_term(&term, &config()).unwrap(), "{{literal row.[this]}}");
    }

    #[test]
    fn test_verbatim_prefix() {
        let term = TermPattern::new("data:{payload}", TermType::Iri);
        assert_eq!(encode_term(&term, &config()).unwrap(), "<data:{{row.payload}}>");
    }

    #[test]
    fn test_malformed_pattern_fails() {
        let term = TermPattern::new("http://ex.org/{id", TermType::Iri);
        assert!(matches!(
            encode_term(&term, &config()),
            Err(EncodeError::UnclosedReference { .. })
        ));
    }

    #[test]
    fn test_escape_literal() {
        assert_eq!(escape_literal("a\"b\\c\nd"), "a\\\"b\\\\c\\nd");
    }
}
