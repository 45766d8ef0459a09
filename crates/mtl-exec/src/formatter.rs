//! Line-based statement formatter.
use mtl_core::{Formatter, SourceError};

/// Normalizes N-Triples / N-Quads text: trims every statement, drops blank
/// lines and `#` comments, removes duplicates and (by default) sorts.
#[derive(Debug, Clone, Copy)]
pub struct NQuadsFormatter {
    sort: bool,
}

impl Default for NQuadsFormatter {
    fn default() -> Self {
        Self { sort: true }
    }
}

impl NQuadsFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep first-seen order instead of sorting
    pub fn preserving_order() -> Self {
        Self { sort: false }
    }
}

impl Formatter for NQuadsFormatter {
    fn format_string(&self, text: &str) -> Result<String, SourceError> {
        let mut lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .collect();

        if self.sort {
            lines.sort_unstable();
            lines.dedup();
        } else {
            let mut seen = std::collections::HashSet::new();
            lines.retain(|l| seen.insert(*l));
        }

        if let Some(bad) = lines.iter().find(|l| !l.ends_with('.')) {
            return Err(SourceError::Format(format!("unterminated statement: {}", bad)));
        }

        let mut out = lines.join("\n");
        if !out.is_empty() {
            out.push('\n');
        }
        Ok(out)
    }
}
