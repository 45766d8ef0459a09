//! Inner and left joins on a single key column.
//!
//! Null keys never match. The only column both partners may share is the join
//! key itself, and only when both sides name it identically; any other
//! overlap is reported as [`FrameError::DuplicateColumn`].

use std::collections::HashMap;

use mtl_core::{Dataframe, Row};

use crate::error::FrameError;

fn check_collisions(
    left: &Dataframe,
    right: &Dataframe,
    left_key: &str,
    right_key: &str,
) -> Result<(), FrameError> {
    let left_cols = left.columns();
    let right_cols = right.columns();
    let columns: Vec<String> = left_cols
        .intersection(&right_cols)
        .filter(|c| !(left_key == right_key && c.as_str() == left_key))
        .cloned()
        .collect();

    if columns.is_empty() {
        Ok(())
    } else {
        Err(FrameError::DuplicateColumn { columns })
    }
}

fn index_by_key<'a>(frame: &'a Dataframe, key: &str) -> HashMap<&'a str, Vec<&'a Row>> {
    let mut index: HashMap<&str, Vec<&Row>> = HashMap::new();
    for row in frame.iter() {
        if let Some(Some(value)) = row.get(key) {
            index.entry(value.as_str()).or_default().push(row);
        }
    }
    index
}

/// Left fields, then right fields not already present.
fn merge(left: &Row, right: &Row) -> Row {
    let mut out = left.clone();
    for (column, value) in right {
        out.entry(column.clone()).or_insert_with(|| value.clone());
    }
    out
}

/// Rows from both frames whose keys match; unmatched rows on either side are
/// dropped.
pub fn inner_join(
    left: &Dataframe,
    right: &Dataframe,
    left_key: &str,
    right_key: &str,
) -> Result<Dataframe, FrameError> {
    if left.is_empty() || right.is_empty() {
        return Ok(Dataframe::empty());
    }
    check_collisions(left, right, left_key, right_key)?;

    let index = index_by_key(left, left_key);
    let mut rows = Vec::new();
    for r in right.iter() {
        let Some(Some(key)) = r.get(right_key) else {
            continue;
        };
        if let Some(matches) = index.get(key.as_str()) {
            rows.extend(matches.iter().map(|l| merge(l, r)));
        }
    }

    tracing::debug!(
        left = left.len(),
        right = right.len(),
        out = rows.len(),
        "inner join"
    );
    Ok(Dataframe::new(rows))
}

/// Every left row, fanned out over its matches; right columns are null when
/// nothing matches.
pub fn left_join(
    left: &Dataframe,
    right: &Dataframe,
    left_key: &str,
    right_key: &str,
) -> Result<Dataframe, FrameError> {
    if left.is_empty() {
        return Ok(Dataframe::empty());
    }
    check_collisions(left, right, left_key, right_key)?;

    let right_cols = right.columns();
    let index = index_by_key(right, right_key);
    let mut rows = Vec::with_capacity(left.len());

    for l in left.iter() {
        let matches = match l.get(left_key) {
            Some(Some(key)) => index.get(key.as_str()),
            _ => None,
        };
        match matches {
            Some(matches) => rows.extend(matches.iter().map(|r| merge(l, r))),
            None => {
                let mut out = l.clone();
                for column in &right_cols {
                    out.entry(column.clone()).or_insert(None);
                }
                rows.push(out);
            }
        }
    }

    tracing::debug!(
        left = left.len(),
        right = right.len(),
        out = rows.len(),
        "left join"
    );
    Ok(Dataframe::new(rows))
}
