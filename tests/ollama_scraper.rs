//! Ollama library scrape against mock HTML pages.

use aidb::CatalogError;
use aidb::config::IngestConfig;
use aidb::ingest::run_ollama;
use aidb_search::{Capability, ModelRecord};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SEARCH_PAGE: &str = r#"<!DOCTYPE html><html><body>
<ul>
  <li><a href="/library/qwen2.5">qwen2.5</a></li>
  <li><a href="/library/llama3.2-vision">llama3.2-vision</a></li>
  <li><a href="/library/qwen2.5">qwen2.5 (again)</a></li>
  <li><a href="/library/gone">gone</a></li>
</ul>
</body></html>"#;

const QWEN_PAGE: &str = r#"<!DOCTYPE html><html><body>
<h1>qwen2.5</h1>
<div class="prose">Qwen2.5 models support tool use and strong logic.</div>
<span x-test-size class="px-2 bg-[#ddf4ff] text-blue-600">0.5b</span>
<span x-test-size class="px-2 bg-[#ddf4ff] text-blue-600">72b</span>
<div class="hidden group px-4 py-3 sm:grid sm:grid-cols-12 text-[13px]">
  <p class="text-neutral-500">398MB</p><p class="text-neutral-500">32K</p><p class="text-neutral-500">Text</p>
</div>
<div class="hidden group px-4 py-3 sm:grid sm:grid-cols-12 text-[13px]">
  <p class="text-neutral-500">47GB</p><p class="text-neutral-500">128K</p><p class="text-neutral-500">Text</p>
</div>
</body></html>"#;

const VISION_PAGE: &str = r#"<!DOCTYPE html><html><body>
<h1>Llama3.2-Vision</h1>
<div class="prose">Instruction-tuned image reasoning models with vision support.</div>
<span x-test-size class="px-2 bg-[#ddf4ff] text-blue-600">11b</span>
<div class="hidden group px-4 py-3 sm:grid sm:grid-cols-12 text-[13px]">
  <p class="text-neutral-500">7.9GB</p><p class="text-neutral-500">128K</p><p class="text-neutral-500">Text, Image</p>
</div>
</body></html>"#;

async fn mock_library() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SEARCH_PAGE))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/library/qwen2.5"))
        .respond_with(ResponseTemplate::new(200).set_body_string(QWEN_PAGE))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/library/llama3.2-vision"))
        .respond_with(ResponseTemplate::new(200).set_body_string(VISION_PAGE))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/library/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    server
}

fn config_for(server: &MockServer) -> IngestConfig {
    IngestConfig {
        ollama_base_url: server.uri(),
        timeout_seconds: 5,
        ..IngestConfig::default()
    }
}

#[tokio::test]
async fn scrapes_library_into_flat_catalog() {
    let server = mock_library().await;
    let out = tempfile::tempdir().expect("tempdir");

    let report = run_ollama(&config_for(&server), out.path())
        .await
        .expect("scrape");

    assert_eq!(report.written, 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].model_id, "gone");
    assert_eq!(report.failures[0].provider_id, "ollama");

    assert!(out.path().join("qwen2.5.json").is_file());
    assert!(out.path().join("llama3.2-vision.json").is_file());

    let bytes = std::fs::read(&report.index_path).expect("read index");
    let records: Vec<ModelRecord> = serde_json::from_slice(&bytes).expect("decode");
    let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["llama3.2-vision", "qwen2.5"]);

    let qwen = &records[1];
    assert_eq!(qwen.size.as_deref(), Some(&[0.5, 72.0][..]));
    assert_eq!(qwen.limit.context, 128 * 1024);
    assert!(qwen.has_capability(Capability::Tools));
    assert!(qwen.has_capability(Capability::Reasoning));
    assert!(!qwen.attachment);

    let vision = &records[0];
    assert_eq!(vision.name, "llama3.2-vision");
    assert!(vision.has_capability(Capability::Vision));
    assert!(vision.has_capability(Capability::Reasoning));
    assert!(vision.attachment);
}

#[tokio::test]
async fn search_page_failure_is_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let out = tempfile::tempdir().expect("tempdir");

    let err = run_ollama(&config_for(&server), out.path())
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::Fetch(_)));
}

#[tokio::test]
async fn empty_listing_is_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body></body></html>"))
        .mount(&server)
        .await;
    let out = tempfile::tempdir().expect("tempdir");

    let err = run_ollama(&config_for(&server), out.path())
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::Parse(_)));
}
