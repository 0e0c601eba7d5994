//! Catalog writer: per-model objects plus the consolidated index.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use aidb_search::{ConsolidatedIndex, INDEX_FILE_NAME, ModelRecord};

use crate::error::{CatalogError, Result};
use crate::ingest::validate::ValidationError;

/// Make a model id safe to use as a file name.
///
/// Replaces `/`, `%` and `:` with `_`. Applying it twice gives the same
/// result as applying it once.
pub fn sanitize_id(id: &str) -> String {
    id.chars()
        .map(|c| match c {
            '/' | '%' | ':' => '_',
            other => other,
        })
        .collect()
}

/// Where per-model objects are placed under the output root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// `{root}/{provider_id}/{sanitized_id}.json`
    Nested,
    /// `{root}/{sanitized_id}.json`
    Flat,
}

/// Writes one catalog snapshot.
///
/// Records are written as they arrive; [`CatalogWriter::finish`] writes the
/// sorted consolidated index covering every record written successfully.
#[derive(Debug)]
pub struct CatalogWriter {
    root: PathBuf,
    layout: Layout,
    records: Vec<ModelRecord>,
    seen: HashSet<(String, String)>,
    /// Relative object path → id that claimed it.
    files: HashMap<PathBuf, String>,
}

impl CatalogWriter {
    /// Create the output root (and parents) and start an empty snapshot.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the directory cannot be created.
    pub fn create(root: impl Into<PathBuf>, layout: Layout) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            layout,
            records: Vec::new(),
            seen: HashSet::new(),
            files: HashMap::new(),
        })
    }

    /// Output root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of records written so far.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if nothing has been written yet.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Path of the object for `record`, relative to the root.
    pub fn object_path(&self, record: &ModelRecord) -> PathBuf {
        let file = format!("{}.json", sanitize_id(&record.id));
        match self.layout {
            Layout::Nested => Path::new(&record.provider_id).join(file),
            Layout::Flat => PathBuf::from(file),
        }
    }

    /// Write the per-model object for `record` and stage it for the index.
    ///
    /// On error nothing is staged, so the index never lists an object that
    /// was not written.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::Duplicate`] if `(provider_id, id)` was already written
    /// - [`ValidationError::FileNameCollision`] if another id sanitizes to the
    ///   same path, or the object would land on the index file
    /// - an I/O or encode error if the object cannot be written
    pub fn write_record(&mut self, record: ModelRecord) -> Result<PathBuf> {
        let key = (record.provider_id.clone(), record.id.clone());
        if self.seen.contains(&key) {
            return Err(ValidationError::Duplicate {
                provider_id: key.0,
                id: key.1,
            }
            .into());
        }

        let relative = self.object_path(&record);
        if relative == Path::new(INDEX_FILE_NAME) {
            return Err(ValidationError::FileNameCollision {
                file: INDEX_FILE_NAME.to_owned(),
                id: record.id,
                existing: "the consolidated index".to_owned(),
            }
            .into());
        }
        if let Some(existing) = self.files.get(&relative) {
            return Err(ValidationError::FileNameCollision {
                file: relative.display().to_string(),
                id: record.id,
                existing: existing.clone(),
            }
            .into());
        }

        let path = self.root.join(&relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&record)
            .map_err(|e| CatalogError::Parse(format!("encode {}: {e}", record.id)))?;
        std::fs::write(&path, json)?;
        tracing::debug!(path = %path.display(), "wrote model object");

        self.seen.insert(key);
        self.files.insert(relative, record.id.clone());
        self.records.push(record);
        Ok(path)
    }

    /// Sort the staged records and write `models.json` at the root.
    ///
    /// Returns the index path.
    ///
    /// # Errors
    ///
    /// Returns an error if the index cannot be encoded or written. This is
    /// fatal for the run.
    pub fn finish(self) -> Result<PathBuf> {
        let index = ConsolidatedIndex::from_records(self.records);
        let path = self.root.join(INDEX_FILE_NAME);
        std::fs::write(&path, index.to_json_pretty()?)?;
        tracing::info!(path = %path.display(), records = index.len(), "wrote consolidated index");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aidb_search::{Limit, Modalities};

    fn record(provider_id: &str, id: &str) -> ModelRecord {
        ModelRecord {
            id: id.into(),
            name: id.into(),
            provider: provider_id.into(),
            provider_id: provider_id.into(),
            capabilities: Default::default(),
            attachment: false,
            temperature: true,
            knowledge: None,
            modalities: Modalities::default(),
            cost: Default::default(),
            limit: Limit {
                context: 4096,
                output: 1024,
            },
            size: None,
        }
    }

    #[test]
    fn sanitize_replaces_separators() {
        assert_eq!(sanitize_id("a/b%c:d"), "a_b_c_d");
        assert_eq!(sanitize_id("gpt-4o"), "gpt-4o");
    }

    #[test]
    fn sanitize_is_idempotent() {
        for id in ["a/b%c:d", "openai/gpt-4o:free", "plain", "__"] {
            let once = sanitize_id(id);
            assert_eq!(sanitize_id(&once), once);
        }
    }

    #[test]
    fn nested_layout_uses_provider_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut writer = CatalogWriter::create(dir.path(), Layout::Nested).expect("writer");
        let path = writer
            .write_record(record("openrouter", "openai/gpt-4o"))
            .expect("write");
        assert_eq!(path, dir.path().join("openrouter").join("openai_gpt-4o.json"));
        assert!(path.exists());
    }

    #[test]
    fn flat_layout_writes_at_root() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut writer = CatalogWriter::create(dir.path(), Layout::Flat).expect("writer");
        let path = writer.write_record(record("ollama", "llama3")).expect("write");
        assert_eq!(path, dir.path().join("llama3.json"));
    }

    #[test]
    fn object_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut writer = CatalogWriter::create(dir.path(), Layout::Nested).expect("writer");
        let original = record("openai", "gpt-4o");
        let path = writer.write_record(original.clone()).expect("write");
        let text = std::fs::read_to_string(path).expect("read");
        assert!(text.contains("\n  \"id\": \"gpt-4o\""));
        let decoded: ModelRecord = serde_json::from_str(&text).expect("decode");
        assert_eq!(decoded, original);
    }

    #[test]
    fn duplicate_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut writer = CatalogWriter::create(dir.path(), Layout::Nested).expect("writer");
        writer.write_record(record("openai", "gpt-4o")).expect("first");
        let err = writer.write_record(record("openai", "gpt-4o")).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::Rejected(ValidationError::Duplicate { .. })
        ));
        assert_eq!(writer.len(), 1);
    }

    #[test]
    fn sanitized_collision_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut writer = CatalogWriter::create(dir.path(), Layout::Nested).expect("writer");
        writer.write_record(record("openrouter", "a/b")).expect("first");
        let err = writer.write_record(record("openrouter", "a:b")).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::Rejected(ValidationError::FileNameCollision { .. })
        ));
        // Same sanitized name under another provider is a different file.
        writer.write_record(record("other", "a:b")).expect("other provider");
        assert_eq!(writer.len(), 2);
    }

    #[test]
    fn flat_object_cannot_shadow_the_index() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut writer = CatalogWriter::create(dir.path(), Layout::Flat).expect("writer");
        let err = writer.write_record(record("ollama", "models")).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::Rejected(ValidationError::FileNameCollision { ref file, .. })
                if file == "models.json"
        ));
        assert!(writer.is_empty());
        assert!(!dir.path().join("models.json").exists());

        // Nested objects live under the provider directory.
        let mut nested = CatalogWriter::create(dir.path(), Layout::Nested).expect("writer");
        nested.write_record(record("ollama", "models")).expect("nested");
    }

    #[test]
    fn finish_writes_sorted_index() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut writer = CatalogWriter::create(dir.path(), Layout::Nested).expect("writer");
        writer.write_record(record("openai", "gpt-4o-mini")).expect("write");
        writer.write_record(record("anthropic", "claude-3")).expect("write");
        writer.write_record(record("openai", "gpt-4o")).expect("write");
        let path = writer.finish().expect("finish");
        assert_eq!(path, dir.path().join("models.json"));

        let bytes = std::fs::read(path).expect("read");
        let index = ConsolidatedIndex::from_json(&bytes).expect("decode");
        let keys: Vec<(&str, &str)> = index.records().iter().map(|r| r.sort_key()).collect();
        assert_eq!(
            keys,
            vec![
                ("anthropic", "claude-3"),
                ("openai", "gpt-4o"),
                ("openai", "gpt-4o-mini"),
            ]
        );
    }

    #[test]
    fn finish_on_empty_writes_empty_array() {
        let dir = tempfile::tempdir().expect("tempdir");
        let writer = CatalogWriter::create(dir.path(), Layout::Nested).expect("writer");
        let path = writer.finish().expect("finish");
        let text = std::fs::read_to_string(path).expect("read");
        assert_eq!(text.trim(), "[]");
    }
}
