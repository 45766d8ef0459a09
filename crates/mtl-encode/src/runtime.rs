//! Names of the runtime routines that encoded expressions call.
//!
//! The template layer registers a function under each of these names; the
//! encoder only ever emits calls to them.

/// Name the current row is bound under, with its column names hashed.
pub const ROW_SCOPE: &str = "row";

/// Concatenate the string form of every argument; null renders empty.
pub const CONCAT: &str = "concat";
/// Sentinel character by name, see [`sentinel`].
pub const SYM: &str = "sym";
/// Percent-encode one reference value placed inside an IRI.
pub const ENCODE_URI: &str = "encode_uri";
/// `<iri>`, resolved against an optional base.
pub const IRI: &str = "iri";
/// `<iri>` percent-encoded after its scheme and authority.
pub const IRI_ENCODED: &str = "iri_encoded";
/// `"value"`
pub const LITERAL: &str = "literal";
/// `"value"^^<datatype>` with the datatype transform applied.
pub const TYPED_LITERAL: &str = "typed_literal";
/// `"value"@tag`, or `"value"` when the tag is invalid.
pub const LANG_LITERAL: &str = "lang_literal";
/// `_:label`
pub const BNODE: &str = "bnode";
/// True when every argument is bound to a non-null value.
pub const BOUND: &str = "bound";
/// `hash` of one name.
pub const HASH: &str = "hash";

/// Sentinel names for characters that may not appear raw in an expression.
pub const SENTINELS: &[(&str, char)] = &[("hash", '#'), ("quote", '"'), ("backslash", '\\')];

/// Character behind a sentinel name.
pub fn sentinel(name: &str) -> Option<char> {
    SENTINELS.iter().find(|(n, _)| *n == name).map(|(_, c)| *c)
}

/// Sentinel name for a character that must be escaped.
pub fn sentinel_name(c: char) -> Option<&'static str> {
    SENTINELS.iter().find(|(_, ch)| *ch == c).map(|(n, _)| *n)
}
