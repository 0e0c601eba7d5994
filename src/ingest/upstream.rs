//! The upstream model feed.
//!
//! The feed is a JSON object keyed by provider. Each provider carries an
//! optional `id`, a display `name` and a `models` map. Model entries are
//! kept as raw [`Value`]s; the builder decides what is valid.

use serde_json::{Map, Value};

use crate::error::{CatalogError, Result};
use crate::ingest::validate::ValidationError;

/// The decoded feed.
#[derive(Debug, Clone, Default)]
pub struct UpstreamFeed {
    providers: Map<String, Value>,
}

impl UpstreamFeed {
    /// Decode a feed from its JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Parse`] if the body is not a JSON object.
    pub fn from_json(body: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(body)
            .map_err(|e| CatalogError::Parse(format!("upstream feed: {e}")))?;
        match value {
            Value::Object(providers) => Ok(Self { providers }),
            _ => Err(CatalogError::Parse("upstream feed is not a JSON object".into())),
        }
    }

    /// Number of provider entries, including malformed ones.
    pub fn provider_count(&self) -> usize {
        self.providers.len()
    }

    /// Iterate over `(feed key, raw provider value)` pairs.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.providers.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// One provider entry of the feed.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamProvider<'a> {
    /// Provider identifier: the entry's `id`, else its feed key.
    pub id: String,
    /// Display name; falls back to the identifier.
    pub name: String,
    /// Raw model entries keyed by model key.
    pub models: Option<&'a Map<String, Value>>,
}

impl<'a> UpstreamProvider<'a> {
    /// Interpret one feed entry.
    ///
    /// A provider without a `models` map is valid and simply contributes no
    /// records.
    pub fn from_value(key: &str, value: &'a Value) -> std::result::Result<Self, ValidationError> {
        let Value::Object(fields) = value else {
            return Err(ValidationError::NotAnObject(format!("provider `{key}`")));
        };
        let id = match fields.get("id") {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            None | Some(Value::Null) => key.to_owned(),
            Some(Value::String(_)) => key.to_owned(),
            Some(_) => {
                return Err(ValidationError::InvalidType {
                    field: "provider.id".into(),
                    expected: "a string",
                });
            }
        };
        let name = match fields.get("name") {
            Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
            _ => id.clone(),
        };
        let models = match fields.get("models") {
            Some(Value::Object(models)) => Some(models),
            None | Some(Value::Null) => None,
            Some(_) => {
                return Err(ValidationError::InvalidType {
                    field: "provider.models".into(),
                    expected: "an object",
                });
            }
        };
        Ok(Self { id, name, models })
    }

    /// Iterate over `(model key, raw model value)` pairs.
    pub fn models(&self) -> impl Iterator<Item = (&'a str, &'a Value)> {
        self.models
            .into_iter()
            .flat_map(|m| m.iter().map(|(k, v)| (k.as_str(), v)))
    }
}

/// Fetch and decode the upstream feed.
///
/// # Errors
///
/// Returns [`CatalogError::Fetch`] on transport failure or a non-success
/// status and [`CatalogError::Parse`] if the body is not a JSON object.
pub async fn fetch_feed(client: &reqwest::Client, url: &str) -> Result<UpstreamFeed> {
    tracing::info!(url, "fetching upstream feed");
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| CatalogError::Fetch(format!("{url}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(CatalogError::Fetch(format!("{url}: HTTP {status}")));
    }

    let body = response
        .text()
        .await
        .map_err(|e| CatalogError::Fetch(format!("{url}: failed to read body: {e}")))?;
    let feed = UpstreamFeed::from_json(&body)?;
    tracing::debug!(providers = feed.provider_count(), "decoded upstream feed");
    Ok(feed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn feed_must_be_object() {
        assert!(UpstreamFeed::from_json("[]").is_err());
        assert!(UpstreamFeed::from_json("not json").is_err());
        let feed = UpstreamFeed::from_json(r#"{"openai": {"models": {}}}"#).expect("feed");
        assert_eq!(feed.provider_count(), 1);
    }

    #[test]
    fn provider_id_falls_back_to_key() {
        let value = json!({"name": "OpenAI", "models": {}});
        let provider = UpstreamProvider::from_value("openai", &value).expect("provider");
        assert_eq!(provider.id, "openai");
        assert_eq!(provider.name, "OpenAI");
    }

    #[test]
    fn explicit_provider_id_wins() {
        let value = json!({"id": "azure", "name": "Azure", "models": {}});
        let provider = UpstreamProvider::from_value("azure-openai", &value).expect("provider");
        assert_eq!(provider.id, "azure");
    }

    #[test]
    fn missing_name_uses_id() {
        let value = json!({"models": {}});
        let provider = UpstreamProvider::from_value("groq", &value).expect("provider");
        assert_eq!(provider.name, "groq");
    }

    #[test]
    fn provider_without_models_yields_nothing() {
        let value = json!({"name": "Empty"});
        let provider = UpstreamProvider::from_value("empty", &value).expect("provider");
        assert_eq!(provider.models().count(), 0);
    }

    #[test]
    fn malformed_provider_rejected() {
        assert!(UpstreamProvider::from_value("x", &json!("nope")).is_err());
        assert!(UpstreamProvider::from_value("x", &json!({"models": []})).is_err());
        assert!(UpstreamProvider::from_value("x", &json!({"id": 7})).is_err());
    }

    #[test]
    fn models_are_iterated_with_their_keys() {
        let value = json!({"models": {"b": {"name": "B"}, "a": {"name": "A"}}});
        let provider = UpstreamProvider::from_value("p", &value).expect("provider");
        let mut keys: Vec<&str> = provider.models().map(|(k, _)| k).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["a", "b"]);
    }
}
