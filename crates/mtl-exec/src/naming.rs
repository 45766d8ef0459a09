//! Per-row output naming.
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use mtl_core::RowId;

use crate::error::ExecError;

/// Splice the row's suffix before the file name's final `.`, or append it
/// when the name has none. Directories are left alone.
pub fn splice_row_id(path: &Path, row_id: &RowId) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let spliced = match file_name.rfind('.') {
        Some(dot) => format!("{}{}{}", &file_name[..dot], row_id.suffix(), &file_name[dot..]),
        None => format!("{}{}", file_name, row_id.suffix()),
    };
    path.with_file_name(spliced)
}

/// Two ids that print the same suffix would write the same artifact name, so
/// uniqueness is checked on suffixes rather than on the ids themselves.
///
/// Explicit ids end up in file names and must not contain path separators.
pub fn check_unique(ids: &[RowId]) -> Result<(), ExecError> {
    let mut seen = HashSet::with_capacity(ids.len());
    for id in ids {
        if let RowId::Explicit(value) = id {
            if value.contains(['/', '\\', '\0']) {
                return Err(ExecError::InvalidArgument(format!(
                    "row id {:?} cannot be used in a file name",
                    value
                )));
            }
        }
        let suffix = id.suffix();
        if !seen.insert(suffix) {
            return Err(ExecError::DuplicateRowId(id.suffix()));
        }
    }
    Ok(())
}
