//! Column reshaping and row deduplication.
use std::collections::{BTreeMap, HashSet};

use mtl_core::{Dataframe, Row};

use crate::error::FrameError;

/// Rename `old` to `new` in every row carrying it.
pub fn rename_column(frame: &Dataframe, old: &str, new: &str) -> Result<Dataframe, FrameError> {
    if frame.has_column(new) {
        return Err(FrameError::ColumnExists(new.to_string()));
    }
    if !frame.has_column(old) {
        return Err(FrameError::MissingColumn(old.to_string()));
    }

    Ok(frame
        .iter()
        .map(|row| {
            let mut out = row.clone();
            if let Some(value) = out.remove(old) {
                out.insert(new.to_string(), value);
            }
            out
        })
        .collect())
}

/// Structural dedup; the first occurrence wins and order is preserved.
pub fn remove_duplicate_rows(frame: &Dataframe) -> Dataframe {
    let mut seen: HashSet<&Row> = HashSet::with_capacity(frame.len());
    frame
        .iter()
        .filter(|row| seen.insert(*row))
        .cloned()
        .collect()
}

/// Rewrite every column name through [`mtl_encode::hash`].
///
/// Two columns collapsing onto the same hashed name (`a1` and `ab`) would
/// silently overwrite each other, so that case is reported instead.
pub fn hash_columns(frame: &Dataframe) -> Result<Dataframe, FrameError> {
    let mut hashed_names: BTreeMap<String, String> = BTreeMap::new();
    for column in frame.columns() {
        let hashed = mtl_encode::hash(&column);
        if let Some(previous) = hashed_names.insert(hashed, column.clone()) {
            return Err(FrameError::DuplicateColumn {
                columns: vec![previous, column],
            });
        }
    }

    Ok(frame
        .iter()
        .map(|row| {
            row.iter()
                .map(|(k, v)| (mtl_encode::hash(k), v.clone()))
                .collect::<Row>()
        })
        .collect())
}

/// Like [`hash_columns`], but columns whose hashed names collide are left out
/// instead of failing the whole frame.
///
/// The second value maps every ambiguous hashed name to the source columns
/// that produce it, so a caller can still fail when one of them is used.
pub fn hash_columns_unambiguous(
    frame: &Dataframe,
) -> (Dataframe, BTreeMap<String, Vec<String>>) {
    let mut sources: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for column in frame.columns() {
        sources.entry(mtl_encode::hash(&column)).or_default().push(column);
    }
    let ambiguous: BTreeMap<String, Vec<String>> =
        sources.into_iter().filter(|(_, cols)| cols.len() > 1).collect();

    let hashed = frame
        .iter()
        .map(|row| {
            row.iter()
                .map(|(k, v)| (mtl_encode::hash(k), v.clone()))
                .filter(|(k, _)| !ambiguous.contains_key(k))
                .collect::<Row>()
        })
        .collect();
    (hashed, ambiguous)
}

/// Keep only `columns`, in every row.
pub fn select_columns(frame: &Dataframe, columns: &[&str]) -> Dataframe {
    frame
        .iter()
        .map(|row| {
            row.iter()
                .filter(|(k, _)| columns.contains(&k.as_str()))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect::<Row>()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rename_column() {
        let frame = Dataframe::from_pairs(vec![vec![("a", Some("1")), ("b", Some("2"))]]);
        let renamed = rename_column(&frame, "a", "c").unwrap();
        assert_eq!(
            renamed,
            Dataframe::from_pairs(vec![vec![("c", Some("1")), ("b", Some("2"))]])
        );
        // source frame untouched
        assert!(frame.has_column("a"));
    }

    #[test]
    fn test_rename_onto_existing_column_fails() {
        let frame = Dataframe::from_pairs(vec![vec![("a", Some("1")), ("b", Some("2"))]]);
        assert_eq!(
            rename_column(&frame, "a", "b"),
            Err(FrameError::ColumnExists("b".to_string()))
        );
        assert_eq!(
            rename_column(&frame, "zz", "c"),
            Err(FrameError::MissingColumn("zz".to_string()))
        );
    }

    #[test]
    fn test_remove_duplicate_rows_keeps_first() {
        let frame = Dataframe::from_pairs(vec![
            vec![("a", Some("1"))],
            vec![("a", Some("2"))],
            vec![("a", Some("1"))],
            vec![("a", None)],
            vec![("a", None)],
        ]);
        let deduped = remove_duplicate_rows(&frame);
        assert_eq!(
            deduped,
            Dataframe::from_pairs(vec![
                vec![("a", Some("1"))],
                vec![("a", Some("2"))],
                vec![("a", None)],
            ])
        );
    }

    #[test]
    fn test_hash_columns() {
        let frame = Dataframe::from_pairs(vec![vec![("col-1", Some("x")), ("name", None)]]);
        let hashed = hash_columns(&frame).unwrap();
        assert_eq!(
            hashed,
            Dataframe::from_pairs(vec![vec![("colzb", Some("x")), ("name", None)]])
        );
    }

    #[test]
    fn test_hash_columns_collision() {
        let frame = Dataframe::from_pairs(vec![vec![("a1", Some("x")), ("ab", Some("y"))]]);
        assert!(matches!(
            hash_columns(&frame),
            Err(FrameError::DuplicateColumn { .. })
        ));
    }

    #[test]
    fn test_hash_columns_unambiguous_drops_collisions() {
        let frame = Dataframe::from_pairs(vec![vec![
            ("a1", Some("x")),
            ("ab", Some("y")),
            ("name", Some("z")),
        ]]);
        let (hashed, ambiguous) = hash_columns_unambiguous(&frame);
        assert_eq!(hashed, Dataframe::from_pairs(vec![vec![("name", Some("z"))]]));
        assert_eq!(ambiguous["ab"], vec!["a1".to_string(), "ab".to_string()]);
    }

    #[test]
    fn test_select_columns() {
        let frame = Dataframe::from_pairs(vec![vec![("a", Some("1")), ("b", Some("2"))]]);
        assert_eq!(
            select_columns(&frame, &["b"]),
            Dataframe::from_pairs(vec![vec![("b", Some("2"))]])
        );
    }
}
