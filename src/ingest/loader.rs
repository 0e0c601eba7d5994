//! Load a persisted catalog back from disk and check it.

use std::fmt;
use std::path::{Path, PathBuf};

use aidb_search::index::is_sorted;
use aidb_search::{INDEX_FILE_NAME, ModelRecord};
use walkdir::WalkDir;

use super::combine::is_model_file;
use super::validate::validate_record;
use crate::error::{CatalogError, Result};

/// A file under the catalog root that is not a valid canonical record.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedFile {
    pub path: PathBuf,
    pub reason: String,
}

impl fmt::Display for RejectedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.reason)
    }
}

/// Every per-model object found under a catalog root.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedCatalog {
    /// Valid records, in path order.
    pub records: Vec<ModelRecord>,
    pub rejected: Vec<RejectedFile>,
}

/// Recursively load every per-model object under `dir`.
///
/// Files that fail to decode or validate are listed in
/// [`LoadedCatalog::rejected`] instead of failing the load.
///
/// # Errors
///
/// Fails only if the directory tree cannot be walked.
pub fn load_catalog(dir: &Path) -> Result<LoadedCatalog> {
    let mut catalog = LoadedCatalog::default();

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(std::io::Error::from)?;
        let path = entry.path();
        if !entry.file_type().is_file() || !is_model_file(path) {
            continue;
        }

        match load_record(path) {
            Ok(record) => catalog.records.push(record),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "rejected model file");
                catalog.rejected.push(RejectedFile {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                });
            }
        }
    }

    tracing::debug!(
        loaded = catalog.records.len(),
        rejected = catalog.rejected.len(),
        "loaded catalog"
    );
    Ok(catalog)
}

fn load_record(path: &Path) -> Result<ModelRecord> {
    let bytes = std::fs::read(path)?;
    let record: ModelRecord =
        serde_json::from_slice(&bytes).map_err(|e| CatalogError::Parse(e.to_string()))?;
    validate_record(&record)?;
    Ok(record)
}

/// Result of [`verify_catalog`].
#[derive(Debug, Clone, PartialEq)]
pub struct VerifyReport {
    pub catalog: LoadedCatalog,
    /// Number of entries in `models.json`, `None` if it is absent.
    pub index_len: Option<usize>,
    /// Whether `models.json` is in `(provider_id, id)` order.
    pub index_sorted: bool,
}

impl VerifyReport {
    /// A catalog passes when every object is valid and a sorted index exists.
    pub fn passed(&self) -> bool {
        self.catalog.rejected.is_empty() && self.index_len.is_some() && self.index_sorted
    }
}

/// Load the catalog under `dir` and check its consolidated index.
///
/// # Errors
///
/// Fails if the tree cannot be walked or `models.json` exists but is not
/// an array of canonical records.
pub fn verify_catalog(dir: &Path) -> Result<VerifyReport> {
    let catalog = load_catalog(dir)?;
    let index_path = dir.join(INDEX_FILE_NAME);

    let (index_len, index_sorted) = if index_path.is_file() {
        let bytes = std::fs::read(&index_path)?;
        // Decode without re-sorting so the on-disk order is what gets checked.
        let records: Vec<ModelRecord> = serde_json::from_slice(&bytes)
            .map_err(|e| CatalogError::Parse(format!("{}: {e}", index_path.display())))?;
        (Some(records.len()), is_sorted(&records))
    } else {
        (None, false)
    };

    Ok(VerifyReport {
        catalog,
        index_len,
        index_sorted,
    })
}
