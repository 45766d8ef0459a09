//! Mapping → template compilation.
//!
//! Each triple pattern becomes one output statement. A statement that reads
//! any reference is wrapped in a guard so that it is only emitted when every
//! reference it reads is bound to a non-null value:
//!
//! ```text
//! {{#if (bound row.id row.name)}}<subject> <predicate> "object" .
//! {{/if~}}
//! ```

use lazy_static::lazy_static;
use mtl_encode::{
    dedup_references, encode_term, is_absolute_iri, parse_references, reference_path, runtime,
    EncoderConfig, TermPattern,
};
use regex::Regex;

use crate::error::CompileError;
use crate::spec::{MappingSpec, Position, TermSpec};

lazy_static! {
    static ref BASE_DIRECTIVE: Regex = Regex::new(r"(?i)(?:^|\s)@?base\s*<([^>]*)>").unwrap();
}

/// Template source produced from one mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledTemplate {
    pub source: String,
    pub base_iri: Option<String>,
    pub triple_count: usize,
}

impl CompiledTemplate {
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

/// Base IRI declared by a `@base <...>` (or `BASE <...>`) directive.
pub fn extract_base(prologue: &str) -> Option<String> {
    BASE_DIRECTIVE
        .captures(prologue)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
}

/// Compile `spec` into a template.
///
/// The base IRI comes from the prologue's base directive when present,
/// otherwise from `default_base`.
pub fn compile(
    spec: &MappingSpec,
    default_base: Option<&str>,
) -> Result<CompiledTemplate, CompileError> {
    let base = match spec.prologue.as_deref().and_then(extract_base) {
        Some(base) if !is_absolute_iri(&base) => return Err(CompileError::InvalidBase(base)),
        Some(base) => Some(base),
        None => default_base.map(str::to_string),
    };
    let config = EncoderConfig::new(base.as_deref()).with_prefixes(&spec.prefixes);

    tracing::info!(
        triples = spec.triples.len(),
        base = base.as_deref().unwrap_or("-"),
        "compiling mapping"
    );

    let mut source = format!(
        "{{{{!-- mtl: {} statement(s), base <{}> --}}}}",
        spec.triples.len(),
        base.as_deref().unwrap_or("")
    );

    for (index, triple) in spec.triples.iter().enumerate() {
        let subject = triple
            .subject
            .as_ref()
            .ok_or(CompileError::MissingSubject { triple: index })?;

        let mut terms = vec![
            (subject, Position::Subject),
            (&triple.predicate, Position::Predicate),
            (&triple.object, Position::Object),
        ];
        if let Some(graph) = &triple.graph {
            terms.push((graph, Position::Graph));
        }

        let mut encoded = Vec::with_capacity(terms.len());
        let mut references = Vec::new();
        for (term, position) in terms {
            let pattern = term.to_pattern(position);
            encoded.push(
                encode_term(&pattern, &config)
                    .map_err(|e| CompileError::term(index, position.to_string(), e))?,
            );
            references.extend(term_references(term, &pattern, index, position)?);
        }

        let statement = format!("{} .\n", encoded.join(" "));
        let references = dedup_references(&references);
        if references.is_empty() {
            source.push_str(&statement);
        } else {
            let guard = references
                .iter()
                .map(|name| reference_path(name))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| CompileError::term(index, "guard", e))?;
            source.push_str(&format!(
                "{{{{#if ({} {})}}}}{}{{{{/if~}}}}\n",
                runtime::BOUND,
                guard.join(" "),
                statement
            ));
        }

        tracing::debug!(triple = index, references = references.len(), "compiled statement");
    }

    tracing::info!(triples = spec.triples.len(), bytes = source.len(), "mapping compiled");

    Ok(CompiledTemplate {
        source,
        base_iri: base,
        triple_count: spec.triples.len(),
    })
}

/// References read by one term, its datatype and language patterns included.
fn term_references(
    term: &TermSpec,
    pattern: &TermPattern,
    triple: usize,
    position: Position,
) -> Result<Vec<String>, CompileError> {
    let mut names = parse_references(&pattern.pattern)
        .map_err(|e| CompileError::term(triple, position.to_string(), e))?;
    if let Some(datatype) = &term.datatype {
        names.extend(
            parse_references(datatype)
                .map_err(|e| CompileError::term(triple, format!("{} datatype", position), e))?,
        );
    }
    if let Some(language) = &term.language {
        names.extend(
            parse_references(language)
                .map_err(|e| CompileError::term(triple, format!("{} language", position), e))?,
        );
    }
    Ok(names)
}
