//! Row filter query language for tabular readers.
//!
//! `col=value&other=value` keeps the rows where every named column equals the
//! given value. `*` or an empty query keeps every row. `col=` matches an
//! empty string, never a null.

use mtl_core::{Dataframe, Row, SourceError};

/// Parsed filter: `(column, value)` pairs, all of which must match.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RowFilter {
    conditions: Vec<(String, String)>,
}

impl RowFilter {
    pub fn parse(reader: &str, query: &str) -> Result<Self, SourceError> {
        let query = query.trim();
        if query.is_empty() || query == "*" {
            return Ok(Self::default());
        }

        let conditions = query
            .split('&')
            .map(|term| {
                term.split_once('=')
                    .map(|(c, v)| (c.trim().to_string(), v.trim().to_string()))
                    .filter(|(c, _)| !c.is_empty())
                    .ok_or_else(|| {
                        SourceError::query(reader, format!("expected 'column=value', got '{}'", term))
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { conditions })
    }

    pub fn is_all(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn matches(&self, row: &Row) -> bool {
        self.conditions
            .iter()
            .all(|(column, value)| matches!(row.get(column), Some(Some(v)) if v == value))
    }

    /// Rows of `frame` matching every condition. Naming a column the frame
    /// does not have is an error rather than an empty result.
    pub fn apply(&self, reader: &str, frame: &Dataframe) -> Result<Dataframe, SourceError> {
        if self.is_all() {
            return Ok(frame.clone());
        }
        for (column, _) in &self.conditions {
            if !frame.is_empty() && !frame.has_column(column) {
                return Err(SourceError::query(reader, format!("unknown column '{}'", column)));
            }
        }
        Ok(frame.iter().filter(|row| self.matches(row)).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> Dataframe {
        Dataframe::from_pairs(vec![
            vec![("id", Some("1")), ("dept", Some("eng"))],
            vec![("id", Some("2")), ("dept", Some("ops"))],
            vec![("id", Some("3")), ("dept", None)],
        ])
    }

    #[test]
    fn test_select_all() {
        for q in ["", "*", "  * "] {
            let filter = RowFilter::parse("t", q).unwrap();
            assert!(filter.is_all());
            assert_eq!(filter.apply("t", &frame()).unwrap().len(), 3);
        }
    }

    #[test]
    fn test_conditions() {
        let filter = RowFilter::parse("t", "dept=eng").unwrap();
        assert_eq!(filter.apply("t", &frame()).unwrap().len(), 1);

        let filter = RowFilter::parse("t", "dept=eng&id=2").unwrap();
        assert!(filter.apply("t", &frame()).unwrap().is_empty());

        // null never equals the empty string
        let filter = RowFilter::parse("t", "dept=").unwrap();
        assert!(filter.apply("t", &frame()).unwrap().is_empty());
    }

    #[test]
    fn test_bad_queries() {
        assert!(RowFilter::parse("t", "dept").is_err());
        assert!(RowFilter::parse("t", "=x").is_err());
        let filter = RowFilter::parse("t", "nope=1").unwrap();
        assert!(matches!(
            filter.apply("t", &frame()),
            Err(SourceError::Query { .. })
        ));
    }
}
