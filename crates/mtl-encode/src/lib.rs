//! MTL-ENCODE: reference parsing and term encoding
//!
//! Turns term patterns such as `http://ex.org/${id}` into template
//! expressions that resolve safely at evaluation time, and provides the
//! runtime routines those expressions call (percent-encoding, datatype
//! canonicalisation, language tag validation, blank node labels).
//!
//! # Example
//!
//! ```
//! use mtl_encode::{encode_term, EncoderConfig, TermPattern, TermType};
//!
//! let config = EncoderConfig::new(Some("http://ex.org/"));
//! let term = TermPattern::new("http://ex.org/{id}", TermType::Iri);
//! let expr = encode_term(&term, &config).unwrap();
//! assert_eq!(expr, r#"{{iri (concat "http://ex.org/" (encode_uri row.id)) "http://ex.org/"}}"#);
//! ```

pub mod datatype;
pub mod error;
pub mod iri;
pub mod language;
pub mod reference;
pub mod runtime;
pub mod term;

pub use datatype::transform_datatype;
pub use error::EncodeError;
pub use iri::{
    blank_node_id, encode_iri, encode_uri_component, expand_curie, is_absolute_iri, resolve_iri,
};
pub use language::{is_valid_language_tag, language_suffix};
pub use reference::{dedup_references, hash, normalize_references, parse_references, Segment};
pub use term::{
    encode_term, escape_literal, reference_path, EncoderConfig, TermPattern, TermType,
};
