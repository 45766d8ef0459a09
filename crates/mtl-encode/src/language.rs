//! Language tags (BCP 47 as profiled by the RDF `LANGTAG` production).
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref LANGTAG: Regex = Regex::new(r"^[a-zA-Z]{1,8}(-[a-zA-Z0-9]{1,8})*$").unwrap();
}

pub fn is_valid_language_tag(tag: &str) -> bool {
    LANGTAG.is_match(tag)
}

/// `@tag` for a valid tag; `None` drops the tag and leaves the literal plain.
pub fn language_suffix(tag: &str) -> Option<String> {
    let tag = tag.trim();
    if is_valid_language_tag(tag) {
        Some(format!("@{}", tag))
    } else {
        tracing::debug!(tag, "dropping invalid language tag");
        None
    }
}
