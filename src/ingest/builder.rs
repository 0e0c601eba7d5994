//! Canonical record builder.
//!
//! Turns one upstream provider/model pair into a [`ModelRecord`]. Pure: no
//! I/O and no logging, failures are returned to the caller.

use aidb_search::{Capability, Cost, Limit, Modalities, Modality, ModelRecord};
use serde_json::{Map, Value};

use super::upstream::UpstreamProvider;
use super::validate::{
    ValidationError, non_negative_integer, normalize_modalities, optional_price, truthy,
    validate_knowledge, validate_model_id, validate_provider_id,
};

/// Build and validate the canonical record for one upstream model entry.
///
/// `model_key` is the entry's key in the provider's `models` map and stands
/// in for the id when the entry carries none.
///
/// # Errors
///
/// Returns the first [`ValidationError`] encountered.
pub fn build_record(
    provider: &UpstreamProvider<'_>,
    model_key: &str,
    model: &Value,
) -> Result<ModelRecord, ValidationError> {
    let Value::Object(fields) = model else {
        return Err(ValidationError::NotAnObject(format!("model `{model_key}`")));
    };

    validate_provider_id(&provider.id)?;

    let id = match fields.get("id") {
        None | Some(Value::Null) => model_key.to_owned(),
        Some(Value::String(s)) => s.clone(),
        Some(_) => {
            return Err(ValidationError::InvalidType {
                field: "id".into(),
                expected: "a string",
            });
        }
    };
    validate_model_id(&id)?;

    let name = match fields.get("name") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
        Some(Value::String(_)) | None | Some(Value::Null) => {
            return Err(ValidationError::Missing("name".into()));
        }
        Some(_) => {
            return Err(ValidationError::InvalidType {
                field: "name".into(),
                expected: "a string",
            });
        }
    };

    let knowledge = match fields.get("knowledge") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.is_empty() => None,
        Some(Value::String(s)) => {
            validate_knowledge(s)?;
            Some(s.clone())
        }
        Some(_) => {
            return Err(ValidationError::InvalidType {
                field: "knowledge".into(),
                expected: "a date string",
            });
        }
    };

    let modalities = build_modalities(fields.get("modalities"))?;
    let cost = build_cost(fields.get("cost"))?;
    let limit = build_limit(fields.get("limit"))?;
    let capabilities = derive_capabilities(fields, &modalities);

    Ok(ModelRecord {
        id,
        name,
        provider: provider.name.clone(),
        provider_id: provider.id.clone(),
        capabilities,
        attachment: truthy(fields.get("attachment")),
        temperature: truthy(fields.get("temperature")),
        knowledge,
        modalities,
        cost,
        limit,
        size: None,
    })
}

/// `tools` from `tool_call`, `reasoning` from `reasoning`, `vision` from a
/// visual input modality, in that order. The feed never declares embeddings.
fn derive_capabilities(fields: &Map<String, Value>, modalities: &Modalities) -> Vec<Capability> {
    let mut capabilities = Vec::new();
    if truthy(fields.get("tool_call")) {
        capabilities.push(Capability::Tools);
    }
    if truthy(fields.get("reasoning")) {
        capabilities.push(Capability::Reasoning);
    }
    if modalities.input.iter().any(Modality::is_visual) {
        capabilities.push(Capability::Vision);
    }
    capabilities
}

fn build_modalities(value: Option<&Value>) -> Result<Modalities, ValidationError> {
    let fields = match value {
        None | Some(Value::Null) => return Ok(Modalities::default()),
        Some(Value::Object(fields)) => fields,
        Some(_) => return Err(ValidationError::NotAnObject("modalities".into())),
    };
    Ok(Modalities {
        input: normalize_modalities("modalities.input", fields.get("input"))?,
        output: normalize_modalities("modalities.output", fields.get("output"))?,
    })
}

fn build_cost(value: Option<&Value>) -> Result<Cost, ValidationError> {
    let fields = match value {
        None | Some(Value::Null) => return Ok(Cost::default()),
        Some(Value::Object(fields)) => fields,
        Some(_) => return Err(ValidationError::NotAnObject("cost".into())),
    };
    Ok(Cost {
        input: optional_price("cost.input", fields.get("input"))?,
        output: optional_price("cost.output", fields.get("output"))?,
        cache_read: optional_price("cost.cache_read", fields.get("cache_read"))?,
        cache_write: optional_price("cost.cache_write", fields.get("cache_write"))?,
    })
}

fn build_limit(value: Option<&Value>) -> Result<Limit, ValidationError> {
    let fields = match value {
        None | Some(Value::Null) => return Err(ValidationError::Missing("limit".into())),
        Some(Value::Object(fields)) => fields,
        Some(_) => return Err(ValidationError::NotAnObject("limit".into())),
    };
    Ok(Limit {
        context: non_negative_integer("limit.context", fields.get("context"))?,
        output: non_negative_integer("limit.output", fields.get("output"))?,
    })
}
