//! IRI handling: absolute checks, prefixed names and percent-encoding.
//!
//! Segment encoding keeps RFC 3986 unreserved characters and encodes the
//! rest, then restores `;` which mapping authors use as a path parameter
//! separator. The fragment is encoded as one unit, `/` included.

use lazy_static::lazy_static;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use regex::Regex;
use std::collections::BTreeMap;

use crate::error::EncodeError;

/// Characters left untouched inside one path segment.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Characters left untouched inside a blank node label.
const BNODE_LABEL: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_');

lazy_static! {
    /// `ALPHA (ALPHA | DIGIT | '+' | '.' | '-')* ':'`
    static ref SCHEME: Regex = Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*:").unwrap();

    /// Scheme plus optional authority, split from the rest of an IRI
    static ref SCHEME_AUTHORITY: Regex =
        Regex::new(r"^([A-Za-z][A-Za-z0-9+.\-]*:(?://[^/?#]*)?)(.*)$").unwrap();

    /// `prefix:local` where the local part does not start with `//`
    static ref CURIE: Regex = Regex::new(r"^([A-Za-z][A-Za-z0-9_.\-]*)?:(.*)$").unwrap();
}

/// True if `iri` starts with a URI scheme.
pub fn is_absolute_iri(iri: &str) -> bool {
    SCHEME.is_match(iri)
}

/// Expand `prefix:local` through `prefixes`; anything else is returned as is.
pub fn expand_curie(pattern: &str, prefixes: &BTreeMap<String, String>) -> String {
    if let Some(caps) = CURIE.captures(pattern) {
        let prefix = caps.get(1).map_or("", |m| m.as_str());
        let local = caps.get(2).map_or("", |m| m.as_str());
        if !local.starts_with("//") {
            if let Some(ns) = prefixes.get(prefix) {
                return format!("{}{}", ns, local);
            }
        }
    }
    pattern.to_string()
}

fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT)
        .to_string()
        .replace("%3B", ";")
}

/// Percent-encode a URI component path by path segment.
///
/// ```
/// assert_eq!(mtl_encode::encode_uri_component("a b*c"), "a%20b%2Ac");
/// ```
pub fn encode_uri_component(value: &str) -> String {
    let (path, fragment) = match value.split_once('#') {
        Some((path, fragment)) => (path, Some(fragment)),
        None => (value, None),
    };

    let encoded = path
        .split('/')
        .map(encode_segment)
        .collect::<Vec<_>>()
        .join("/");

    match fragment {
        Some(fragment) => format!(
            "{}#{}",
            encoded,
            utf8_percent_encode(fragment, SEGMENT)
        ),
        None => encoded,
    }
}

/// Percent-encode everything after the scheme and authority of `iri`.
pub fn encode_iri(iri: &str) -> String {
    match SCHEME_AUTHORITY.captures(iri) {
        Some(caps) => {
            let head = caps.get(1).map_or("", |m| m.as_str());
            let rest = caps.get(2).map_or("", |m| m.as_str());
            format!("{}{}", head, encode_uri_component(rest))
        }
        None => encode_uri_component(iri),
    }
}

/// Resolve `value` against `base` unless it is already absolute.
pub fn resolve_iri(value: &str, base: Option<&str>) -> Result<String, EncodeError> {
    if is_absolute_iri(value) {
        return Ok(value.to_string());
    }
    match base {
        Some(base) if !base.is_empty() => Ok(format!("{}{}", base, value)),
        _ => Err(EncodeError::RelativeIriWithoutBase(value.to_string())),
    }
}

/// Blank node label with disallowed characters percent-encoded.
pub fn blank_node_id(value: &str) -> String {
    utf8_percent_encode(value, BNODE_LABEL).to_string()
}
