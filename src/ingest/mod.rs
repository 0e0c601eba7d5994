//! Offline ingestion: upstream feed → canonical records → persisted catalog.
//!
//! A run is sequential and single-writer. A record that fails to build or
//! write is logged, listed in the [`IngestReport`] and skipped; only a
//! failure to fetch the feed or to write the consolidated index aborts the
//! run.

pub mod builder;
pub mod combine;
pub mod loader;
pub mod ollama;
pub mod upstream;
pub mod validate;
pub mod writer;

use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::IngestConfig;
use crate::error::{CatalogError, Result};
use crate::http::build_client;

pub use builder::build_record;
pub use combine::{CombineReport, combine_directory};
pub use loader::{LoadedCatalog, RejectedFile, VerifyReport, load_catalog, verify_catalog};
pub use ollama::{OllamaScraper, run_ollama};
pub use upstream::{UpstreamFeed, UpstreamProvider, fetch_feed};
pub use validate::ValidationError;
pub use writer::{CatalogWriter, Layout, sanitize_id};

/// One record that was skipped during a run.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordFailure {
    pub provider_id: String,
    /// Model id, or the model key when no id could be read.
    pub model_id: String,
    pub reason: String,
}

impl fmt::Display for RecordFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}: {}", self.provider_id, self.model_id, self.reason)
    }
}

/// Outcome of an ingestion run.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestReport {
    /// Records written and listed in the index.
    pub written: usize,
    /// Records skipped, in the order they were encountered.
    pub failures: Vec<RecordFailure>,
    /// Path of the consolidated index.
    pub index_path: PathBuf,
}

impl IngestReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Build every record of `feed` and hand it to `writer`.
///
/// Returns the per-record failures; the writer holds the successes.
pub fn build_catalog(feed: &UpstreamFeed, writer: &mut CatalogWriter) -> Vec<RecordFailure> {
    let mut failures = Vec::new();

    for (key, value) in feed.entries() {
        let provider = match UpstreamProvider::from_value(key, value) {
            Ok(provider) => provider,
            Err(e) => {
                tracing::warn!(provider = key, error = %e, "skipping provider");
                failures.push(RecordFailure {
                    provider_id: key.to_owned(),
                    model_id: String::new(),
                    reason: e.to_string(),
                });
                continue;
            }
        };

        for (model_key, model) in provider.models() {
            let outcome = build_record(&provider, model_key, model)
                .map_err(CatalogError::from)
                .and_then(|record| writer.write_record(record));
            if let Err(e) = outcome {
                let model_id = model
                    .get("id")
                    .and_then(|v| v.as_str())
                    .unwrap_or(model_key)
                    .to_owned();
                tracing::warn!(
                    provider = %provider.id,
                    model = %model_id,
                    error = %e,
                    "skipping record"
                );
                failures.push(RecordFailure {
                    provider_id: provider.id.clone(),
                    model_id,
                    reason: e.to_string(),
                });
            }
        }
    }

    failures
}

/// Run a full ingestion: fetch the feed, write every valid record under
/// `out_dir` in the nested layout, then write the consolidated index.
///
/// # Errors
///
/// Fails if the feed cannot be fetched or decoded, the output directory
/// cannot be created, or the index cannot be written.
pub async fn run_ingest(config: &IngestConfig, out_dir: &Path) -> Result<IngestReport> {
    let client = build_client(config.timeout_seconds, config.user_agent.as_deref())?;
    let feed = fetch_feed(&client, &config.feed_url).await?;

    let mut writer = CatalogWriter::create(out_dir, Layout::Nested)?;
    let failures = build_catalog(&feed, &mut writer);
    let written = writer.len();
    let index_path = writer.finish()?;

    tracing::info!(
        written,
        failed = failures.len(),
        index = %index_path.display(),
        "ingestion finished"
    );
    Ok(IngestReport {
        written,
        failures,
        index_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_catalog_isolates_failures() {
        let feed = UpstreamFeed::from_json(
            r#"{
                "openai": {
                    "name": "OpenAI",
                    "models": {
                        "gpt-4o": {"id": "gpt-4o", "name": "GPT-4o", "limit": {"context": 128000, "output": 16384}},
                        "broken": {"id": "broken", "name": "Broken"}
                    }
                },
                "weird": "not a provider"
            }"#,
        )
        .expect("feed");
        let dir = tempfile::tempdir().expect("tempdir");
        let mut writer = CatalogWriter::create(dir.path(), Layout::Nested).expect("writer");

        let failures = build_catalog(&feed, &mut writer);

        assert_eq!(writer.len(), 1);
        assert_eq!(failures.len(), 2);
        let broken = failures
            .iter()
            .find(|f| f.model_id == "broken")
            .expect("broken listed");
        assert_eq!(broken.provider_id, "openai");
        assert!(broken.reason.contains("limit"));
        assert!(failures.iter().any(|f| f.provider_id == "weird"));
    }

    #[test]
    fn failure_display() {
        let failure = RecordFailure {
            provider_id: "openai".into(),
            model_id: "gpt-4o".into(),
            reason: "missing field `name`".into(),
        };
        assert_eq!(failure.to_string(), "openai/gpt-4o: missing field `name`");
    }
}
