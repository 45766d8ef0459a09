//! Integration tests for mtl-readers against the fixture sources.

use mtl_core::Reader;
use mtl_readers::{CsvReader, JsonReader, ReaderConfig, ReaderSet};
use std::collections::BTreeMap;
use std::path::PathBuf;

fn workspace_root() -> PathBuf {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap();
    std::path::Path::new(&manifest_dir)
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .to_path_buf()
}

fn fixture_path(relative: &str) -> String {
    workspace_root().join(relative).to_string_lossy().to_string()
}

#[test]
fn test_people_csv() {
    let reader = CsvReader::open(&fixture_path("testing/fixtures/data/people.csv")).unwrap();
    let frame = reader.full_dataframe().unwrap();
    assert_eq!(frame.len(), 3);

    let bob = &frame.rows()[1];
    assert_eq!(bob["name"].as_deref(), Some("Bob \"the builder\" Jones"));
    assert_eq!(bob["nick"], None);
    assert_eq!(frame.rows()[2]["age"], None);
    assert!(frame.has_column("dept-code"));

    let eng = reader.dataframe("dept-code=eng").unwrap();
    assert_eq!(eng.len(), 2);
}

#[test]
fn test_departments_json() {
    let reader = JsonReader::open(&fixture_path("testing/fixtures/data/departments.json"))
        .unwrap()
        .with_default_pointer("/departments");
    let frame = reader.full_dataframe().unwrap();
    assert_eq!(frame.len(), 2);
    assert_eq!(frame.rows()[0]["floor"].as_deref(), Some("3"));
    assert_eq!(frame.rows()[1]["floor"], None);
}

#[test]
fn test_reader_set_from_yaml() {
    let yaml = r#"
people: { kind: csv, path: testing/fixtures/data/people.csv }
departments: { kind: json, path: testing/fixtures/data/departments.json, pointer: /departments }
"#;
    let configs: BTreeMap<String, ReaderConfig> = serde_yaml::from_str(yaml).unwrap();
    let set = ReaderSet::from_configs(&configs, &workspace_root()).unwrap();
    set.set_verbose(true);

    assert_eq!(set.get("people").unwrap().kind(), "csv");
    assert_eq!(set.get("departments").unwrap().dataframe("*").unwrap().len(), 2);
    set.shut_down().unwrap();
}
