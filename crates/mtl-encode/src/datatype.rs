//! Canonical lexical forms for typed literals.
//!
//! Datatypes are matched on their local name (`...#double`, `xsd:double`),
//! so both full XSD IRIs and prefixed forms select the same transform.
//! Values that do not parse are passed through unchanged.

/// XML Schema namespace
pub const XSD: &str = "http://www.w3.org/2001/XMLSchema#";

/// Apply the datatype transform table to a literal value.
pub fn transform_datatype(value: &str, datatype: &str) -> String {
    match local_name(datatype) {
        "decimal" => transform_or_keep(value, datatype, |v| {
            v.trim().parse::<f64>().ok().map(canonical_double)
        }),
        "integer" => transform_or_keep(value, datatype, canonical_integer),
        "double" => transform_or_keep(value, datatype, |v| {
            v.trim().parse::<f64>().ok().map(scientific_double)
        }),
        "boolean" => canonical_boolean(value).to_string(),
        "dateTime" => value.replacen(' ', "T", 1),
        // date, time, hexBinary and anything unknown keep their lexical form
        _ => value.to_string(),
    }
}

fn transform_or_keep<F>(value: &str, datatype: &str, f: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    match f(value) {
        Some(v) => v,
        None => {
            tracing::warn!(value, datatype, "value does not parse for datatype, kept as is");
            value.to_string()
        }
    }
}

fn local_name(datatype: &str) -> &str {
    datatype
        .rsplit(|c| c == '#' || c == ':' || c == '/')
        .next()
        .unwrap_or(datatype)
}

fn canonical_boolean(value: &str) -> &'static str {
    match value {
        "t" | "true" | "TRUE" | "1" => "true",
        _ => "false",
    }
}

fn canonical_integer(value: &str) -> Option<String> {
    let v = value.trim();
    if let Ok(i) = v.parse::<i128>() {
        return Some(i.to_string());
    }
    match v.parse::<f64>() {
        Ok(f) if f.is_finite() && f.fract() == 0.0 => Some(format!("{:.0}", f)),
        _ => None,
    }
}

/// Plain notation inside `[1e-3, 1e7)`, scientific outside, always with a
/// fractional digit (`3` → `3.0`, `1e7` → `1.0E7`).
pub fn canonical_double(d: f64) -> String {
    if let Some(special) = non_finite(d) {
        return special.to_string();
    }
    let abs = d.abs();
    if d == 0.0 || (1e-3..1e7).contains(&abs) {
        let s = format!("{}", d);
        if s.contains('.') {
            s
        } else {
            format!("{}.0", s)
        }
    } else {
        scientific_double(d)
    }
}

/// Shortest round-tripping mantissa with at least one fractional digit.
pub fn scientific_double(d: f64) -> String {
    if let Some(special) = non_finite(d) {
        return special.to_string();
    }
    let s = format!("{:E}", d);
    match s.split_once('E') {
        Some((mantissa, exponent)) if !mantissa.contains('.') => {
            format!("{}.0E{}", mantissa, exponent)
        }
        _ => s,
    }
}

fn non_finite(d: f64) -> Option<&'static str> {
    if d.is_nan() {
        Some("NaN")
    } else if d.is_infinite() {
        Some(if d > 0.0 { "INF" } else { "-INF" })
    } else {
        None
    }
}
