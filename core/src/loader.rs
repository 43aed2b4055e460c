use deck_common::SlideRecord;
use serde_json::Value;

use crate::error::{DeckError, Result};

/// Parse raw JSON into the slide sequence.
///
/// Accepts either a top-level array of slide records or an object carrying
/// the array under a `"slides"` key (extra object keys are ignored). Any
/// other shape is a structural error; there is no partial recovery.
pub fn parse_slides(raw: &str) -> Result<Vec<SlideRecord>> {
    let value: Value = serde_json::from_str(raw)?;
    let slides = match value {
        Value::Array(_) => value,
        Value::Object(mut map) => map.remove("slides").ok_or_else(|| {
            DeckError::InvalidInput(
                "top-level object has no \"slides\" key".to_string(),
            )
        })?,
        other => {
            return Err(DeckError::InvalidInput(format!(
                "expected an array or an object with a \"slides\" key, got {}",
                json_type_name(&other)
            )))
        }
    };
    if !slides.is_array() {
        return Err(DeckError::InvalidInput(format!(
            "\"slides\" must be an array, got {}",
            json_type_name(&slides)
        )));
    }
    Ok(serde_json::from_value(slides)?)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
