//! MTL-COMPILER: declarative triple mappings to MTL templates
//!
//! A [`MappingSpec`] lists triple patterns whose terms reference row columns.
//! [`compile`] turns it into template source that the `mtl-out` renderer
//! evaluates against one row at a time, emitting N-Triples (or N-Quads when a
//! pattern names a graph).
//!
//! # Example
//!
//! ```
//! use mtl_compiler::{compile, MappingSpec};
//!
//! let spec = MappingSpec::from_yaml(r#"
//! triples:
//!   - subject: "people/{id}"
//!     predicate: "http://xmlns.com/foaf/0.1/name"
//!     object: "{name}"
//! "#).unwrap();
//!
//! let compiled = compile(&spec, Some("http://ex.org/")).unwrap();
//! assert_eq!(compiled.triple_count, 1);
//! assert!(compiled.source.contains("(bound row.id row.name)"));
//! ```

pub mod compiler;
pub mod error;
pub mod spec;

pub use compiler::{compile, extract_base, CompiledTemplate};
pub use error::CompileError;
pub use spec::{MappingSpec, Position, TermSpec, TriplePattern, RDF_TYPE};

/// Load a mapping file and compile it in one step.
pub fn compile_file(path: &str, default_base: Option<&str>) -> Result<CompiledTemplate, CompileError> {
    let spec = MappingSpec::load(path)?;
    compile(&spec, default_base)
}
