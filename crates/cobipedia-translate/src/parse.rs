//! Parsing of the model's JSON reply into a [`Translation`].

use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::TranslateError;

/// Number of characters of a malformed reply kept in the parse error.
const RAW_EXCERPT_CHARS: usize = 200;

/// Translated values keyed by field name.
///
/// Only fields that were requested and came back as non-empty strings are
/// present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Translation {
    fields: BTreeMap<String, String>,
}

impl Translation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, field: &str, value: &str) -> Self {
        self.fields.insert(field.to_string(), value.to_string());
        self
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Removes a surrounding markdown code fence, optionally tagged `json`.
fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_prefix('\n').unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.strip_suffix('\n').unwrap_or(rest)
}

fn excerpt(text: &str) -> String {
    text.chars().take(RAW_EXCERPT_CHARS).collect()
}

/// Parses a model reply, keeping only `expected_fields` with non-empty string
/// values.
///
/// # Errors
///
/// Returns [`TranslateError::Parse`] with the first 200 characters of the
/// reply if it is not a JSON object once an optional code fence is removed.
pub fn parse_translation(
    text: &str,
    expected_fields: &[&str],
) -> Result<Translation, TranslateError> {
    let trimmed = text.trim();
    let body = strip_code_fence(trimmed);

    let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) else {
        return Err(TranslateError::Parse {
            raw: excerpt(trimmed),
        });
    };

    let mut translation = Translation::new();
    for (key, value) in map {
        if !expected_fields.contains(&key.as_str()) {
            tracing::debug!(field = %key, "ignoring unrequested field in model reply");
            continue;
        }
        match value {
            Value::String(s) if !s.trim().is_empty() => {
                translation.fields.insert(key, s);
            }
            _ => {}
        }
    }
    Ok(translation)
}
