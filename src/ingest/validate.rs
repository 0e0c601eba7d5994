//! Validation rules applied at the ingestion boundary.
//!
//! The upstream feed is untrusted. Everything that ends up in a
//! [`ModelRecord`] passes through one of the checks below, and every failure
//! is a [`ValidationError`] naming the offending field.

use aidb_search::{Modality, ModelRecord};
use chrono::NaiveDate;
use serde_json::Value;

/// Longest accepted model identifier, in characters.
pub const MAX_ID_LEN: usize = 256;

/// Why a single record was rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// The value for `0` is not a JSON object.
    #[error("`{0}` is not an object")]
    NotAnObject(String),

    /// A required field is absent or blank.
    #[error("missing field `{0}`")]
    Missing(String),

    /// A field has the wrong JSON type.
    #[error("`{field}` must be {expected}")]
    InvalidType { field: String, expected: &'static str },

    /// An identifier failed the allowed-character rules.
    #[error("invalid {field} `{value}`: {reason}")]
    InvalidIdentifier {
        field: &'static str,
        value: String,
        reason: &'static str,
    },

    /// A modality string outside the known set.
    #[error("`{field}` has unknown modality `{value}`")]
    UnknownModality { field: String, value: String },

    /// A numeric field outside its allowed range.
    #[error("`{field}` out of range: {value}")]
    OutOfRange { field: String, value: String },

    /// The knowledge cutoff is not `YYYY-MM` or `YYYY-MM-DD`.
    #[error("invalid knowledge date `{0}`")]
    InvalidKnowledge(String),

    /// A second record with the same `(provider_id, id)` in one run.
    #[error("duplicate record {provider_id}/{id}")]
    Duplicate { provider_id: String, id: String },

    /// Two distinct ids sanitize to the same file name.
    #[error("file name `{file}` for `{id}` already used by `{existing}`")]
    FileNameCollision {
        file: String,
        id: String,
        existing: String,
    },
}

/// JavaScript-style truthiness of a JSON value.
///
/// `null`, `false`, `0` and `""` are false; every other value, including
/// empty arrays and objects, is true.
pub fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Check a model identifier.
///
/// Identifiers are opaque but must be usable as a storage key once
/// sanitized: non-empty, at most [`MAX_ID_LEN`] characters, no whitespace
/// or control characters, and not `.` or `..`.
pub fn validate_model_id(id: &str) -> Result<(), ValidationError> {
    let invalid = |reason| ValidationError::InvalidIdentifier {
        field: "model id",
        value: id.to_owned(),
        reason,
    };
    if id.is_empty() {
        return Err(invalid("empty"));
    }
    if id.chars().count() > MAX_ID_LEN {
        return Err(invalid("too long"));
    }
    if id.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(invalid("contains whitespace or control characters"));
    }
    if id == "." || id == ".." {
        return Err(invalid("reserved path segment"));
    }
    Ok(())
}

/// Check a provider identifier: `[A-Za-z0-9._-]+`, not starting with `.`.
///
/// The provider id becomes a directory name, so it is held to a stricter
/// character set than model ids.
pub fn validate_provider_id(id: &str) -> Result<(), ValidationError> {
    let invalid = |reason| ValidationError::InvalidIdentifier {
        field: "provider id",
        value: id.to_owned(),
        reason,
    };
    if id.is_empty() {
        return Err(invalid("empty"));
    }
    if id.starts_with('.') {
        return Err(invalid("starts with `.`"));
    }
    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
    {
        return Err(invalid("allowed characters are A-Z a-z 0-9 . _ -"));
    }
    Ok(())
}

/// Check a knowledge cutoff: a real calendar date as `YYYY-MM-DD`, or a
/// year-month as `YYYY-MM`.
pub fn validate_knowledge(value: &str) -> Result<(), ValidationError> {
    let well_formed = match value.len() {
        7 => NaiveDate::parse_from_str(&format!("{value}-01"), "%Y-%m-%d").is_ok(),
        10 => NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok(),
        _ => false,
    };
    // chrono accepts unpadded fields; the wire format does not.
    let digits_in_place = value
        .char_indices()
        .all(|(i, c)| if i == 4 || i == 7 { c == '-' } else { c.is_ascii_digit() });
    if well_formed && digits_in_place {
        Ok(())
    } else {
        Err(ValidationError::InvalidKnowledge(value.to_owned()))
    }
}

/// Read a required non-negative integer.
///
/// Integral floats such as `128000.0` are accepted.
pub fn non_negative_integer(field: &str, value: Option<&Value>) -> Result<u64, ValidationError> {
    let value = match value {
        None | Some(Value::Null) => return Err(ValidationError::Missing(field.to_owned())),
        Some(v) => v,
    };
    let Value::Number(n) = value else {
        return Err(ValidationError::InvalidType {
            field: field.to_owned(),
            expected: "a non-negative integer",
        });
    };
    if let Some(u) = n.as_u64() {
        return Ok(u);
    }
    let out_of_range = || ValidationError::OutOfRange {
        field: field.to_owned(),
        value: n.to_string(),
    };
    match n.as_f64() {
        Some(f) if f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 => Ok(f as u64),
        _ => Err(out_of_range()),
    }
}

/// Read an optional non-negative price. Absent or `null` stays absent.
pub fn optional_price(field: &str, value: Option<&Value>) -> Result<Option<f64>, ValidationError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => match n.as_f64() {
            Some(f) if f.is_finite() && f >= 0.0 => Ok(Some(f)),
            _ => Err(ValidationError::OutOfRange {
                field: field.to_owned(),
                value: n.to_string(),
            }),
        },
        Some(_) => Err(ValidationError::InvalidType {
            field: field.to_owned(),
            expected: "a number",
        }),
    }
}

/// Normalise a modality field into a sequence.
///
/// A scalar string becomes a one-element sequence; absent, `null`, `""` and
/// `[]` become an empty sequence. Unknown names are rejected.
pub fn normalize_modalities(
    field: &str,
    value: Option<&Value>,
) -> Result<Vec<Modality>, ValidationError> {
    let parse = |name: &str| {
        name.parse::<Modality>()
            .map_err(|_| ValidationError::UnknownModality {
                field: field.to_owned(),
                value: name.to_owned(),
            })
    };
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::String(s)) if s.is_empty() => Ok(Vec::new()),
        Some(Value::String(s)) => Ok(vec![parse(s)?]),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => parse(s),
                _ => Err(ValidationError::InvalidType {
                    field: field.to_owned(),
                    expected: "a modality name or a list of modality names",
                }),
            })
            .collect(),
        Some(_) => Err(ValidationError::InvalidType {
            field: field.to_owned(),
            expected: "a modality name or a list of modality names",
        }),
    }
}

/// Re-check an already-built record (for records read back from disk or
/// produced by a scraper).
pub fn validate_record(record: &ModelRecord) -> Result<(), ValidationError> {
    validate_model_id(&record.id)?;
    validate_provider_id(&record.provider_id)?;
    if record.name.trim().is_empty() {
        return Err(ValidationError::Missing("name".into()));
    }
    if let Some(knowledge) = &record.knowledge {
        validate_knowledge(knowledge)?;
    }
    let prices = [
        ("cost.input", record.cost.input),
        ("cost.output", record.cost.output),
        ("cost.cache_read", record.cost.cache_read),
        ("cost.cache_write", record.cost.cache_write),
    ];
    for (field, price) in prices {
        if let Some(p) = price
            && !(p.is_finite() && p >= 0.0)
        {
            return Err(ValidationError::OutOfRange {
                field: field.to_owned(),
                value: p.to_string(),
            });
        }
    }
    if let Some(sizes) = &record.size
        && let Some(bad) = sizes.iter().find(|s| !(s.is_finite() && **s >= 0.0))
    {
        return Err(ValidationError::OutOfRange {
            field: "size".into(),
            value: bad.to_string(),
        });
    }
    Ok(())
}
