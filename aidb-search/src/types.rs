//! Canonical catalog types.
//!
//! [`ModelRecord`] is the unit of the catalog. Every shape-shifting field of
//! the upstream feed has already been normalised by the time a record exists:
//! modalities are always sequences, flags are always booleans and absent
//! prices stay absent.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A capability a model advertises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    /// Tool / function calling.
    Tools,
    /// Extended reasoning.
    Reasoning,
    /// Image or video understanding.
    Vision,
    /// Embedding generation. Never derived from the upstream feed.
    Embedding,
}

impl Capability {
    /// Returns the wire name of this capability.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tools => "tools",
            Self::Reasoning => "reasoning",
            Self::Vision => "vision",
            Self::Embedding => "embedding",
        }
    }

    /// Returns all capability variants.
    pub fn all() -> &'static [Capability] {
        &[Self::Tools, Self::Reasoning, Self::Vision, Self::Embedding]
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An input or output modality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Text,
    Audio,
    Image,
    Video,
    Pdf,
}

impl Modality {
    /// Returns the wire name of this modality.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Audio => "audio",
            Self::Image => "image",
            Self::Video => "video",
            Self::Pdf => "pdf",
        }
    }

    /// Whether this modality makes a model vision-capable when accepted as input.
    pub fn is_visual(&self) -> bool {
        matches!(self, Self::Image | Self::Video)
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Modality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "audio" => Ok(Self::Audio),
            "image" => Ok(Self::Image),
            "video" => Ok(Self::Video),
            "pdf" => Ok(Self::Pdf),
            other => Err(format!("unknown modality `{other}`")),
        }
    }
}

/// Accepted input and produced output modalities.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modalities {
    pub input: Vec<Modality>,
    pub output: Vec<Modality>,
}

/// Prices per unit volume. Absent prices are omitted, never zeroed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Cost {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_read: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_write: Option<f64>,
}

impl Cost {
    /// Returns `true` when no price is known.
    pub fn is_empty(&self) -> bool {
        self.input.is_none()
            && self.output.is_none()
            && self.cache_read.is_none()
            && self.cache_write.is_none()
    }
}

/// Token limits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limit {
    /// Context window in tokens.
    pub context: u64,
    /// Maximum output tokens.
    pub output: u64,
}

/// One normalised, validated catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRecord {
    /// Opaque upstream identifier, unique within `provider_id`.
    pub id: String,
    /// Human-readable label.
    pub name: String,
    /// Provider display name.
    pub provider: String,
    /// Provider identifier.
    pub provider_id: String,
    /// Derived capabilities, in the order the producer emitted them.
    #[serde(default)]
    pub capabilities: Vec<Capability>,
    /// Whether the model accepts file attachments.
    pub attachment: bool,
    /// Whether the model supports a temperature parameter.
    pub temperature: bool,
    /// Knowledge cutoff, `YYYY-MM` or `YYYY-MM-DD`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub knowledge: Option<String>,
    #[serde(default)]
    pub modalities: Modalities,
    #[serde(default)]
    pub cost: Cost,
    pub limit: Limit,
    /// Parameter counts in billions (scraped local-model catalogs only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Vec<f64>>,
}

impl ModelRecord {
    /// The `(provider_id, id)` pair the consolidated index is ordered by.
    pub fn sort_key(&self) -> (&str, &str) {
        (&self.provider_id, &self.id)
    }

    /// Returns `true` if the record carries `capability`.
    pub fn has_capability(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ModelRecord {
        ModelRecord {
            id: "gpt-4o".into(),
            name: "GPT-4o".into(),
            provider: "OpenAI".into(),
            provider_id: "openai".into(),
            capabilities: vec![Capability::Tools, Capability::Vision],
            attachment: true,
            temperature: true,
            knowledge: Some("2023-09".into()),
            modalities: Modalities {
                input: vec![Modality::Text, Modality::Image],
                output: vec![Modality::Text],
            },
            cost: Cost {
                input: Some(2.5),
                output: Some(10.0),
                ..Default::default()
            },
            limit: Limit {
                context: 128_000,
                output: 16_384,
            },
            size: None,
        }
    }

    #[test]
    fn capabilities_serialize_in_stored_order() {
        let json = serde_json::to_value(sample()).expect("serialize");
        assert_eq!(json["capabilities"], serde_json::json!(["tools", "vision"]));
    }

    #[test]
    fn absent_costs_are_omitted_not_null() {
        let json = serde_json::to_value(sample()).expect("serialize");
        let cost = json["cost"].as_object().expect("cost object");
        assert_eq!(cost.len(), 2);
        assert!(!cost.contains_key("cache_read"));
        assert!(!cost.contains_key("cache_write"));
    }

    #[test]
    fn absent_knowledge_and_size_are_omitted() {
        let mut record = sample();
        record.knowledge = None;
        let json = serde_json::to_value(record).expect("serialize");
        assert!(json.get("knowledge").is_none());
        assert!(json.get("size").is_none());
    }

    #[test]
    fn decodes_record_without_optional_sections() {
        let json = r#"{
            "id": "llama3",
            "name": "llama3",
            "provider": "ollama",
            "provider_id": "ollama",
            "attachment": false,
            "temperature": false,
            "limit": {"context": 8192, "output": 0},
            "size": [8.0, 70.0]
        }"#;
        let record: ModelRecord = serde_json::from_str(json).expect("decode");
        assert!(record.capabilities.is_empty());
        assert!(record.cost.is_empty());
        assert!(record.modalities.input.is_empty());
        assert_eq!(record.size.as_deref(), Some(&[8.0, 70.0][..]));
    }

    #[test]
    fn unknown_capability_is_rejected() {
        let json = r#"{
            "id": "x", "name": "x", "provider": "p", "provider_id": "p",
            "capabilities": ["telepathy"],
            "attachment": false, "temperature": false,
            "limit": {"context": 1, "output": 1}
        }"#;
        assert!(serde_json::from_str::<ModelRecord>(json).is_err());
    }

    #[test]
    fn modality_from_str() {
        assert_eq!("pdf".parse::<Modality>(), Ok(Modality::Pdf));
        assert!("file".parse::<Modality>().is_err());
    }

    #[test]
    fn visual_modalities() {
        assert!(Modality::Image.is_visual());
        assert!(Modality::Video.is_visual());
        assert!(!Modality::Audio.is_visual());
    }

    #[test]
    fn sort_key_is_provider_then_id() {
        assert_eq!(sample().sort_key(), ("openai", "gpt-4o"));
    }

    #[test]
    fn capability_display_and_all() {
        assert_eq!(Capability::Reasoning.to_string(), "reasoning");
        assert_eq!(Capability::all().len(), 4);
        assert!(sample().has_capability(Capability::Vision));
        assert!(!sample().has_capability(Capability::Embedding));
    }
}
