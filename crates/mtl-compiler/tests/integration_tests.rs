//! Integration tests for mtl-compiler with real mapping files.
//!
//! Compiled templates are rendered through mtl-out against rows bound the
//! way the executor binds them: column names hashed, row under `row`.

use mtl_compiler::{compile, compile_file, MappingSpec, TermSpec, TriplePattern};
use mtl_core::{Bindings, Dataframe, UnresolvedPolicy};
use mtl_out::{FunctionRegistry, ReaderMap, TemplateRenderer};

/// Path to the people mapping relative to the workspace root
const PEOPLE_MAPPING: &str = "testing/fixtures/mappings/people.yaml";

/// Get the absolute path to a fixture
fn fixture_path(relative: &str) -> String {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap();
    let workspace_root = std::path::Path::new(&manifest_dir).parent().unwrap().parent().unwrap();
    workspace_root.join(relative).to_string_lossy().to_string()
}

fn render_rows(template: &str, frame: &Dataframe, policy: UnresolvedPolicy) -> Vec<String> {
    let mut renderer = TemplateRenderer::new(&FunctionRegistry::standard(), ReaderMap::new(), policy);
    renderer.register_template("main", template).unwrap();

    let hashed = mtl_frame::hash_columns(frame).unwrap();
    let bindings = Bindings::default();
    hashed
        .iter()
        .map(|row| renderer.render("main", &bindings.snapshot_with_row(row)).unwrap())
        .collect()
}

#[test]
fn test_end_to_end_subject() {
    let spec = MappingSpec::new().with_triple(TriplePattern::new(
        TermSpec::new("http://ex.org/{id}"),
        TermSpec::new("http://ex.org/p"),
        TermSpec::iri("http://ex.org/o"),
    ));
    let compiled = compile(&spec, Some("http://ex.org/")).unwrap();

    let frame = Dataframe::from_pairs(vec![vec![("id", Some("7"))]]);
    let out = render_rows(&compiled.source, &frame, UnresolvedPolicy::Fail);
    assert_eq!(out[0], "<http://ex.org/7> <http://ex.org/p> <http://ex.org/o> .\n");
}

#[test]
fn test_people_mapping_first_row() {
    let compiled = compile_file(&fixture_path(PEOPLE_MAPPING), None).unwrap();
    assert_eq!(compiled.base_iri.as_deref(), Some("http://ex.org/"));
    assert_eq!(compiled.triple_count, 5);

    let frame = Dataframe::from_pairs(vec![vec![
        ("id", Some("1")),
        ("name", Some("Ann Smith")),
        ("nick", Some("annie")),
        ("age", Some("34")),
        ("dept-code", Some("eng")),
    ]]);
    let out = render_rows(&compiled.source, &frame, UnresolvedPolicy::Fail);
    let lines: Vec<&str> = out[0].lines().collect();

    assert_eq!(
        lines,
        vec![
            "<http://ex.org/people/1> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://xmlns.com/foaf/0.1/Person> .",
            "<http://ex.org/people/1> <http://xmlns.com/foaf/0.1/name> \"Ann Smith\" .",
            "<http://ex.org/people/1> <http://xmlns.com/foaf/0.1/nick> \"annie\"@en .",
            "<http://ex.org/people/1> <http://ex.org/ns#age> \"34\"^^<http://www.w3.org/2001/XMLSchema#integer> .",
            "<http://ex.org/people/1> <http://ex.org/ns#department> <http://ex.org/departments/eng> <http://ex.org/graphs/hr> .",
        ]
    );
}

#[test]
fn test_null_values_skip_statements() {
    let compiled = compile_file(&fixture_path(PEOPLE_MAPPING), None).unwrap();
    let frame = Dataframe::from_pairs(vec![vec![
        ("id", Some("3")),
        ("name", Some("Cleo")),
        ("nick", None),
        ("age", None),
        ("dept-code", Some("eng")),
    ]]);
    let out = render_rows(&compiled.source, &frame, UnresolvedPolicy::Fail);

    assert_eq!(out[0].lines().count(), 3);
    assert!(!out[0].contains("nick"));
    assert!(!out[0].contains("age"));
}

#[test]
fn test_absent_column_follows_policy() {
    let compiled = compile_file(&fixture_path(PEOPLE_MAPPING), None).unwrap();
    let frame = Dataframe::from_pairs(vec![vec![("id", Some("9")), ("name", Some("Dan"))]]);

    let lenient = render_rows(&compiled.source, &frame, UnresolvedPolicy::Lenient);
    assert_eq!(lenient[0].lines().count(), 2);

    let mut renderer = TemplateRenderer::new(
        &FunctionRegistry::standard(),
        ReaderMap::new(),
        UnresolvedPolicy::Fail,
    );
    renderer.register_template("main", &compiled.source).unwrap();
    let row = mtl_frame::hash_columns(&frame).unwrap().rows()[0].clone();
    assert!(renderer
        .render("main", &Bindings::default().snapshot_with_row(&row))
        .is_err());
}

#[test]
fn test_special_characters_are_escaped() {
    let spec = MappingSpec::new().with_triple(TriplePattern::new(
        TermSpec::new("items/{code}"),
        TermSpec::new("http://ex.org/label"),
        TermSpec::new("{label}"),
    ));
    let compiled = compile(&spec, Some("http://ex.org/")).unwrap();
    let frame = Dataframe::from_pairs(vec![vec![
        ("code", Some("a b/c#d")),
        ("label", Some("say \"hi\"\n")),
    ]]);
    let out = render_rows(&compiled.source, &frame, UnresolvedPolicy::Fail);
    assert_eq!(
        out[0],
        "<http://ex.org/items/a%20b/c#d> <http://ex.org/label> \"say \\\"hi\\\"\\n\" .\n"
    );
}

#[test]
fn test_iri_column_keeps_absolute_values() {
    let spec = MappingSpec::new().with_triple(TriplePattern::new(
        TermSpec::new("people/{id}"),
        TermSpec::new("http://xmlns.com/foaf/0.1/homepage"),
        TermSpec::iri("{homepage}"),
    ));
    let compiled = compile(&spec, Some("http://ex.org/")).unwrap();

    let frame = Dataframe::from_pairs(vec![
        vec![("id", Some("1")), ("homepage", Some("http://other.org/x"))],
        vec![("id", Some("2")), ("homepage", Some("pages/2"))],
    ]);
    let out = render_rows(&compiled.source, &frame, UnresolvedPolicy::Fail);
    assert_eq!(
        out[0],
        "<http://ex.org/people/1> <http://xmlns.com/foaf/0.1/homepage> <http://other.org/x> .\n"
    );
    assert_eq!(
        out[1],
        "<http://ex.org/people/2> <http://xmlns.com/foaf/0.1/homepage> <http://ex.org/pages/2> .\n"
    );
}
