//! Ollama library scraper.
//!
//! The Ollama library has no machine-readable catalog, so records are
//! scraped from its HTML: the search page lists model ids and each model
//! page carries a description, parameter-size badges and a table of
//! variants with their context windows. Records are written in the flat
//! layout and combined into `models.json` afterwards.

use std::collections::BTreeSet;
use std::path::Path;

use aidb_search::{Capability, Cost, Limit, Modalities, Modality, ModelRecord};
use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::combine::combine_directory;
use super::validate::validate_record;
use super::writer::{CatalogWriter, Layout};
use super::{IngestReport, RecordFailure};
use crate::config::IngestConfig;
use crate::error::{CatalogError, Result};
use crate::http::build_client;

/// Provider id and display name of every scraped record.
pub const OLLAMA_PROVIDER: &str = "ollama";

/// Description keyword → capability.
const CAPABILITY_KEYWORDS: &[(&str, Capability)] = &[
    ("vision", Capability::Vision),
    ("multimodal", Capability::Vision),
    ("tool use", Capability::Tools),
    ("function calling", Capability::Tools),
    ("reasoning", Capability::Reasoning),
    ("logic", Capability::Reasoning),
    ("embedding", Capability::Embedding),
    ("embeddings", Capability::Embedding),
];

/// Description keyword → extra input modality.
const MODALITY_KEYWORDS: &[(&str, Modality)] = &[
    ("image", Modality::Image),
    ("audio", Modality::Audio),
    ("video", Modality::Video),
    ("pdf", Modality::Pdf),
];

/// Parse a context size such as `8K` (8192) or `4096`.
///
/// Returns 0 when the text cannot be parsed.
pub fn parse_context_size(text: &str) -> u64 {
    let text = text.trim().to_lowercase();
    if text.contains('k') {
        match text.replace('k', "").trim().parse::<f64>() {
            Ok(n) if n.is_finite() && n > 0.0 => (n * 1024.0) as u64,
            _ => 0,
        }
    } else {
        text.parse::<u64>().unwrap_or(0)
    }
}

/// Parse a parameter count such as `7b`, `1.5b` or `500m` into billions.
///
/// A bare number is taken as billions. Returns 0.0 when the text cannot be
/// parsed.
pub fn parse_param_count(text: &str) -> f64 {
    let text = text.trim().to_lowercase();
    let (number, scale) = if text.contains('b') {
        (text.replace('b', ""), 1.0)
    } else if text.contains('m') {
        (text.replace('m', ""), 1.0 / 1000.0)
    } else {
        (text, 1.0)
    };
    match number.trim().parse::<f64>() {
        Ok(n) if n.is_finite() => n * scale,
        _ => 0.0,
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| CatalogError::Parse(format!("invalid selector `{css}`: {e:?}")))
}

/// Text of an element with each text node trimmed and the pieces joined
/// without separators, lower-cased.
fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .collect::<String>()
        .to_lowercase()
}

/// Extract the sorted, de-duplicated model ids linked from the search page.
pub fn parse_library_listing(html: &str) -> Result<Vec<String>> {
    let document = Html::parse_document(html);
    let link_sel = selector(r#"a[href^="/library/"]"#)?;

    let ids: BTreeSet<String> = document
        .select(&link_sel)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| href.rsplit('/').next())
        .filter(|id| !id.is_empty())
        .map(str::to_owned)
        .collect();

    tracing::debug!(count = ids.len(), "parsed library listing");
    Ok(ids.into_iter().collect())
}

/// Build the record for `model_id` from its library page.
pub fn parse_model_page(model_id: &str, html: &str) -> Result<ModelRecord> {
    let document = Html::parse_document(html);
    let prose_sel = selector("div.prose")?;
    let h1_sel = selector("h1")?;
    let size_sel = selector("span[x-test-size]")?;
    let row_sel = selector("div.hidden.group")?;
    let cell_sel = selector("p.text-neutral-500")?;

    let description = document
        .select(&prose_sel)
        .next()
        .map(element_text)
        .unwrap_or_default();

    let name = document
        .select(&h1_sel)
        .next()
        .map(element_text)
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| model_id.to_owned());

    let mut sizes: Vec<f64> = document
        .select(&size_sel)
        .filter(|span| {
            let class = span.value().attr("class").unwrap_or_default();
            class.contains("bg-[#ddf4ff]") && class.contains("text-blue-600")
        })
        .map(|span| parse_param_count(&span.text().collect::<String>()))
        .filter(|n| *n > 0.0)
        .collect();
    sizes.sort_by(f64::total_cmp);
    sizes.dedup();

    // Desktop rows only; the mobile layout repeats the same data.
    let context = document
        .select(&row_sel)
        .filter(|row| row.value().classes().any(|c| c == "sm:grid-cols-12"))
        .filter_map(|row| row.select(&cell_sel).nth(1))
        .map(|cell| parse_context_size(&cell.text().collect::<String>()))
        .max()
        .unwrap_or(0);

    // Scraped lists are sorted by wire name.
    let mut capabilities: Vec<Capability> = CAPABILITY_KEYWORDS
        .iter()
        .filter(|(keyword, _)| description.contains(keyword))
        .map(|(_, capability)| *capability)
        .collect();
    capabilities.sort_by_key(Capability::as_str);
    capabilities.dedup();
    let vision = capabilities.contains(&Capability::Vision);

    let mut input = vec![Modality::Text];
    if vision {
        input.push(Modality::Image);
    }
    input.extend(
        MODALITY_KEYWORDS
            .iter()
            .filter(|(keyword, _)| description.contains(keyword))
            .map(|(_, modality)| *modality),
    );
    input.sort_by_key(Modality::as_str);
    input.dedup();

    Ok(ModelRecord {
        id: model_id.to_owned(),
        name,
        provider: OLLAMA_PROVIDER.to_owned(),
        provider_id: OLLAMA_PROVIDER.to_owned(),
        capabilities,
        attachment: vision,
        temperature: false,
        knowledge: None,
        modalities: Modalities {
            input,
            output: vec![Modality::Text],
        },
        cost: Cost::default(),
        limit: Limit { context, output: 0 },
        size: Some(sizes),
    })
}

/// HTTP front end for the Ollama library site.
#[derive(Debug, Clone)]
pub struct OllamaScraper {
    client: reqwest::Client,
    base_url: Url,
}

impl OllamaScraper {
    /// # Errors
    ///
    /// Returns [`CatalogError::Config`] if `base_url` is not a valid URL.
    pub fn new(client: reqwest::Client, base_url: &str) -> Result<Self> {
        let mut base_url = Url::parse(base_url)
            .map_err(|e| CatalogError::Config(format!("ollama base url: {e}")))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self { client, base_url })
    }

    async fn get_html(&self, relative: &str) -> Result<String> {
        let url = self
            .base_url
            .join(relative)
            .map_err(|e| CatalogError::Config(format!("ollama url for `{relative}`: {e}")))?;
        tracing::debug!(%url, "fetching ollama page");
        let response = self
            .client
            .get(url.clone())
            .header("Accept", "text/html,application/xhtml+xml")
            .send()
            .await
            .map_err(|e| CatalogError::Fetch(format!("{url}: {e}")))?
            .error_for_status()
            .map_err(|e| CatalogError::Fetch(format!("{url}: {e}")))?;
        response
            .text()
            .await
            .map_err(|e| CatalogError::Fetch(format!("{url}: failed to read body: {e}")))
    }

    /// Fetch the search page and list the model ids it links to.
    ///
    /// # Errors
    ///
    /// Fails if the page cannot be fetched or links to no models.
    pub async fn list_models(&self) -> Result<Vec<String>> {
        let html = self.get_html("search").await?;
        let ids = parse_library_listing(&html)?;
        if ids.is_empty() {
            return Err(CatalogError::Parse("search page lists no models".into()));
        }
        Ok(ids)
    }

    /// Fetch and parse one model page.
    pub async fn fetch_model(&self, model_id: &str) -> Result<ModelRecord> {
        let html = self.get_html(&format!("library/{model_id}")).await?;
        parse_model_page(model_id, &html)
    }
}

/// Scrape the whole library into `out_dir` (flat layout) and combine the
/// result into `out_dir/models.json`.
///
/// # Errors
///
/// Fails if the search page cannot be fetched or the combine step fails.
/// Individual model pages that fail are listed in the report.
pub async fn run_ollama(config: &IngestConfig, out_dir: &Path) -> Result<IngestReport> {
    let client = build_client(config.timeout_seconds, config.user_agent.as_deref())?;
    let library = OllamaScraper::new(client, &config.ollama_base_url)?;

    let ids = library.list_models().await?;
    tracing::info!(count = ids.len(), "scraping ollama library");

    let mut writer = CatalogWriter::create(out_dir, Layout::Flat)?;
    let mut failures = Vec::new();

    for id in &ids {
        let outcome = match library.fetch_model(id).await {
            Ok(record) => validate_record(&record)
                .map_err(CatalogError::from)
                .and_then(|()| writer.write_record(record)),
            Err(e) => Err(e),
        };
        match outcome {
            Ok(path) => tracing::debug!(model = %id, path = %path.display(), "scraped model"),
            Err(e) => {
                tracing::warn!(model = %id, error = %e, "skipping model");
                failures.push(RecordFailure {
                    provider_id: OLLAMA_PROVIDER.to_owned(),
                    model_id: id.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    let written = writer.len();
    let combined = combine_directory(out_dir)?;
    tracing::info!(
        written,
        failed = failures.len(),
        indexed = combined.combined,
        "ollama scrape finished"
    );
    Ok(IngestReport {
        written,
        failures,
        index_path: combined.index_path,
    })
}
