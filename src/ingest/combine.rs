//! Combine a flat directory of per-model objects into `models.json`.

use std::path::{Path, PathBuf};

use aidb_search::{ConsolidatedIndex, INDEX_FILE_NAME, ModelRecord};
use walkdir::WalkDir;

use crate::error::{CatalogError, Result};

/// Outcome of [`combine_directory`].
#[derive(Debug, Clone, PartialEq)]
pub struct CombineReport {
    /// Path of the written index.
    pub index_path: PathBuf,
    /// Records listed in the index.
    pub combined: usize,
    /// Files that could not be read or decoded.
    pub skipped: Vec<PathBuf>,
}

/// Whether `path` is a per-model object (a `.json` file other than the index).
pub(crate) fn is_model_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "json")
        && path.file_name().is_some_and(|name| name != INDEX_FILE_NAME)
}

/// Read every `*.json` file directly inside `dir` (except `models.json`),
/// sort the records into index order and write `dir/models.json`.
///
/// Unreadable files and files that are not a canonical record are skipped
/// with a warning.
///
/// # Errors
///
/// Fails if `dir` cannot be listed, holds no model files at all, or the
/// index cannot be written.
pub fn combine_directory(dir: &Path) -> Result<CombineReport> {
    let mut records: Vec<ModelRecord> = Vec::new();
    let mut skipped = Vec::new();
    let mut candidates = 0usize;

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(std::io::Error::from)?;
        let path = entry.path();
        if !entry.file_type().is_file() || !is_model_file(path) {
            continue;
        }
        candidates += 1;

        let decoded = std::fs::read(path)
            .map_err(CatalogError::from)
            .and_then(|bytes| {
                serde_json::from_slice::<ModelRecord>(&bytes)
                    .map_err(|e| CatalogError::Parse(e.to_string()))
            });
        match decoded {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping file");
                skipped.push(path.to_path_buf());
            }
        }
    }

    if candidates == 0 {
        return Err(CatalogError::EmptyCatalog(dir.to_path_buf()));
    }

    let index = ConsolidatedIndex::from_records(records);
    let index_path = dir.join(INDEX_FILE_NAME);
    std::fs::write(&index_path, index.to_json_pretty()?)?;
    tracing::info!(
        path = %index_path.display(),
        combined = index.len(),
        skipped = skipped.len(),
        "combined model files"
    );

    Ok(CombineReport {
        index_path,
        combined: index.len(),
        skipped,
    })
}
