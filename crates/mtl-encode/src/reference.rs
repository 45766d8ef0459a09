//! Reference syntax inside term patterns.
//!
//! Canonical references are written `${name}`. The legacy `{name}` form is
//! accepted on input and normalized to the canonical one. A backslash escapes
//! a literal `{`, `}` or `\`.

use crate::error::EncodeError;

/// A parsed piece of a term pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Reference(String),
}

/// Split `pattern` into text and reference segments.
///
/// Adjacent text is merged, so two references are never separated by an
/// empty text segment.
pub fn segments(pattern: &str) -> Result<Vec<Segment>, EncodeError> {
    let chars: Vec<(usize, char)> = pattern.char_indices().collect();
    let mut out = Vec::new();
    let mut text = String::new();
    let mut i = 0;

    while i < chars.len() {
        let (offset, c) = chars[i];
        match c {
            '\\' if matches!(chars.get(i + 1), Some((_, '{' | '}' | '\\'))) => {
                text.push(chars[i + 1].1);
                i += 2;
            }
            '$' if matches!(chars.get(i + 1), Some((_, '{'))) => {
                let (name, next) = read_name(pattern, &chars, i + 2, offset)?;
                flush(&mut text, &mut out);
                out.push(Segment::Reference(name));
                i = next;
            }
            '{' => {
                let (name, next) = read_name(pattern, &chars, i + 1, offset)?;
                flush(&mut text, &mut out);
                out.push(Segment::Reference(name));
                i = next;
            }
            '}' => {
                return Err(EncodeError::StrayBrace {
                    pattern: pattern.to_string(),
                    offset,
                })
            }
            _ => {
                text.push(c);
                i += 1;
            }
        }
    }

    flush(&mut text, &mut out);
    Ok(out)
}

fn flush(text: &mut String, out: &mut Vec<Segment>) {
    if !text.is_empty() {
        out.push(Segment::Text(std::mem::take(text)));
    }
}

/// Read a reference name starting at `start`, up to the closing brace.
/// Returns the name and the index just past the brace.
fn read_name(
    pattern: &str,
    chars: &[(usize, char)],
    start: usize,
    open_offset: usize,
) -> Result<(String, usize), EncodeError> {
    let mut name = String::new();
    let mut i = start;
    loop {
        match chars.get(i) {
            None => {
                return Err(EncodeError::UnclosedReference {
                    pattern: pattern.to_string(),
                    offset: open_offset,
                })
            }
            Some((_, '}')) => break,
            Some((offset, '{')) => {
                return Err(EncodeError::NestedReference {
                    pattern: pattern.to_string(),
                    offset: *offset,
                })
            }
            Some((_, c)) => name.push(*c),
        }
        i += 1;
    }

    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(EncodeError::EmptyReference {
            pattern: pattern.to_string(),
            offset: open_offset,
        });
    }
    Ok((name, i + 1))
}

/// Rewrite legacy `{name}` references into canonical `${name}`.
pub fn normalize_references(pattern: &str) -> Result<String, EncodeError> {
    let mut out = String::with_capacity(pattern.len() + 4);
    for segment in segments(pattern)? {
        match segment {
            Segment::Text(t) => {
                for c in t.chars() {
                    if matches!(c, '{' | '}' | '\\') {
                        out.push('\\');
                    }
                    out.push(c);
                }
            }
            Segment::Reference(name) => {
                out.push_str("${");
                out.push_str(&name);
                out.push('}');
            }
        }
    }
    Ok(out)
}

/// Reference names in first-occurrence order, duplicates retained.
pub fn parse_references(pattern: &str) -> Result<Vec<String>, EncodeError> {
    Ok(segments(pattern)?
        .into_iter()
        .filter_map(|s| match s {
            Segment::Reference(name) => Some(name),
            Segment::Text(_) => None,
        })
        .collect())
}

/// Drop repeated names, keeping the first occurrence.
pub fn dedup_references(names: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        if !out.contains(name) {
            out.push(name.clone());
        }
    }
    out
}

/// Map a column name onto a name usable as a template identifier.
///
/// Digits become `a`..`j`, `-` becomes `z`, everything else is kept.
pub fn hash(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '0'..='9' => (b'a' + (c as u8 - b'0')) as char,
            '-' => 'z',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keeps_duplicates() {
        let refs = parse_references("${a}-${b}-${a}").unwrap();
        assert_eq!(refs, vec!["a", "b", "a"]);
        assert_eq!(dedup_references(&refs), vec!["a", "b"]);
    }

    #[test]
    fn test_legacy_form_normalizes() {
        assert_eq!(
            normalize_references("http://ex.org/{id}/{name}").unwrap(),
            "http://ex.org/${id}/${name}"
        );
        assert_eq!(parse_references("{id}").unwrap(), vec!["id"]);
    }

    #[test]
    fn test_dollar_without_brace_is_text() {
        let segs = segments("cost: $5").unwrap();
        assert_eq!(segs, vec![Segment::Text("cost: $5".to_string())]);
    }

    #[test]
    fn test_escaped_braces_are_text() {
        let segs = segments(r"a\{b\}").unwrap();
        assert_eq!(segs, vec![Segment::Text("a{b}".to_string())]);
        assert_eq!(normalize_references(r"a\{b\}").unwrap(), r"a\{b\}");
    }

    #[test]
    fn test_malformed_references() {
        assert!(matches!(
            parse_references("http://ex.org/${id"),
            Err(EncodeError::UnclosedReference { offset: 14, .. })
        ));
        assert!(matches!(
            parse_references("${}"),
            Err(EncodeError::EmptyReference { .. })
        ));
        assert!(matches!(
            parse_references("${a{b}}"),
            Err(EncodeError::NestedReference { .. })
        ));
        assert!(matches!(
            parse_references("a}b"),
            Err(EncodeError::StrayBrace { offset: 1, .. })
        ));
    }

    #[test]
    fn test_hash_mapping() {
        assert_eq!(hash("col-1"), "colzb");
        assert_eq!(hash("0123456789"), "abcdefghij");
        assert_eq!(hash("name"), "name");
        assert_eq!(hash("first name"), "first name");
    }

    #[test]
    fn test_hash_is_letters_only_for_column_alphabet() {
        let inputs = ["x-9", "2024-01-01", "A-b-C", "id42", "---"];
        for input in inputs {
            let hashed = hash(input);
            assert_eq!(hashed, hash(input));
            assert!(hashed.chars().all(|c| c.is_ascii_alphabetic()), "{}", hashed);
        }
    }
}
