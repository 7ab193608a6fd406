//! Parsing and validation of generated combination text.

use super::types::{Attribute, Catalog, Combination, Selections};
use serde_json::Value;
use thiserror::Error;

/// Number of combinations a response must carry.
pub const EXPECTED_COMBINATIONS: usize = 3;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Response is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Response does not match the schema: {0}")]
    Schema(String),
    #[error("Combination {index}: {attribute} value {value:?} is not in the catalog")]
    NotInCatalog {
        index: usize,
        attribute: Attribute,
        value: String,
    },
}

/// Strip a surrounding triple-backtick fence and an optional `json` tag.
///
/// Text that does not start with a fence is only trimmed.
pub fn strip_fences(raw: &str) -> &str {
    let text = raw.trim();
    if !text.starts_with("```") {
        return text;
    }
    let inner = text.trim_matches('`').trim();
    inner.strip_prefix("json").unwrap_or(inner).trim()
}

/// Parse a generated response into exactly three combinations.
///
/// Locked attributes are overwritten with the user's value whatever the
/// generator wrote. Defaulted attributes must be strings present in the
/// catalog. A non-string `rationale` becomes empty. Duplicates are kept;
/// de-duplication is the resolver's job.
pub fn parse_response(
    raw: &str,
    selections: &Selections,
    catalog: &Catalog,
) -> Result<Vec<Combination>, ValidationError> {
    let data: Value = serde_json::from_str(strip_fences(raw))?;

    let items = data
        .as_object()
        .ok_or_else(|| ValidationError::Schema("top level is not an object".into()))?
        .get("combinations")
        .ok_or_else(|| ValidationError::Schema("missing `combinations`".into()))?
        .as_array()
        .ok_or_else(|| ValidationError::Schema("`combinations` is not an array".into()))?;

    if items.len() != EXPECTED_COMBINATIONS {
        return Err(ValidationError::Schema(format!(
            "expected {EXPECTED_COMBINATIONS} combinations, got {}",
            items.len()
        )));
    }

    items
        .iter()
        .enumerate()
        .map(|(index, item)| validate_item(index, item, selections, catalog))
        .collect()
}

fn validate_item(
    index: usize,
    item: &Value,
    selections: &Selections,
    catalog: &Catalog,
) -> Result<Combination, ValidationError> {
    let obj = item
        .as_object()
        .ok_or_else(|| ValidationError::Schema(format!("combination {index} is not an object")))?;

    let mut values: Vec<String> = Vec::with_capacity(Attribute::ALL.len());
    for attr in Attribute::ALL {
        let value = match selections.get(attr).locked() {
            Some(locked) => locked.to_string(),
            None => {
                let value = obj.get(attr.key()).and_then(Value::as_str).ok_or_else(|| {
                    ValidationError::Schema(format!(
                        "combination {index}: `{attr}` is missing or not a string"
                    ))
                })?;
                if !catalog.contains(attr, value) {
                    return Err(ValidationError::NotInCatalog {
                        index,
                        attribute: attr,
                        value: value.to_string(),
                    });
                }
                value.to_string()
            }
        };
        values.push(value);
    }

    let rationale = obj
        .get("rationale")
        .and_then(Value::as_str)
        .unwrap_or_default();

    let mut values = values.into_iter();
    Ok(Combination::from_fn(rationale, |_| {
        values.next().unwrap_or_default()
    }))
}
