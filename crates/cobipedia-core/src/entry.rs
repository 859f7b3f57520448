//! Source entries as fetched from the host in the source locale.

use std::collections::BTreeMap;

use serde_json::Value;
use thiserror::Error;

use crate::content_types::{ContentTypeProfile, DOCUMENT_ID_FIELD, MEDIA_FIELD};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EntryError {
    #[error("entry has no {DOCUMENT_ID_FIELD}")]
    MissingDocumentId,

    #[error("entry is not a JSON object")]
    NotAnObject,
}

/// Scalar value of a configured field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(serde_json::Number),
    Null,
}

impl FieldValue {
    /// Converts a JSON value; `None` for booleans, arrays and objects, which
    /// never occur in localized text fields.
    #[must_use]
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(FieldValue::Text(s.clone())),
            Value::Number(n) => Some(FieldValue::Number(n.clone())),
            Value::Null => Some(FieldValue::Null),
            _ => None,
        }
    }

    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Text(s) => Value::String(s.clone()),
            FieldValue::Number(n) => Value::Number(n.clone()),
            FieldValue::Null => Value::Null,
        }
    }

    /// The single definition of "empty" used for skip decisions, prompts, and
    /// payloads: null, or text that is blank after trimming. Numbers are
    /// never empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.trim().is_empty(),
            FieldValue::Number(_) => false,
            FieldValue::Null => true,
        }
    }

    /// Text rendering for prompts and slugs; `None` when empty.
    #[must_use]
    pub fn as_text(&self) -> Option<String> {
        match self {
            FieldValue::Text(s) if !s.trim().is_empty() => Some(s.clone()),
            FieldValue::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SourceEntry {
    pub document_id: String,
    /// Configured translatable and required fields that were present on the
    /// fetched document.
    pub fields: BTreeMap<String, FieldValue>,
    /// Media ids in host order; `None` when media was not requested.
    pub media_ids: Option<Vec<i64>>,
}

impl SourceEntry {
    #[must_use]
    pub fn new(document_id: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
            fields: BTreeMap::new(),
            media_ids: None,
        }
    }

    /// Builder-style setter, mostly for fixtures.
    #[must_use]
    pub fn with_field(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }

    #[must_use]
    pub fn with_media(mut self, ids: Vec<i64>) -> Self {
        self.media_ids = Some(ids);
        self
    }

    /// Extracts the profile's fields from a host document.
    ///
    /// Media ids are read from `images` only when the profile uses the media
    /// workaround. Entries may be either `{id}` objects or bare ids.
    ///
    /// # Errors
    ///
    /// Returns [`EntryError`] if the document is not an object or lacks a
    /// string `documentId`.
    pub fn from_document(profile: &ContentTypeProfile, doc: &Value) -> Result<Self, EntryError> {
        let obj = doc.as_object().ok_or(EntryError::NotAnObject)?;
        let document_id = obj
            .get(DOCUMENT_ID_FIELD)
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .ok_or(EntryError::MissingDocumentId)?
            .to_string();

        let mut fields = BTreeMap::new();
        for name in profile
            .translatable_fields
            .iter()
            .chain(profile.required_fields.iter())
        {
            if let Some(value) = obj.get(*name).and_then(FieldValue::from_json) {
                fields.insert((*name).to_string(), value);
            }
        }

        let media_ids = if profile.uses_media_workaround {
            obj.get(MEDIA_FIELD).and_then(Value::as_array).map(|items| {
                items
                    .iter()
                    .filter_map(|item| match item {
                        Value::Object(m) => m.get("id").and_then(Value::as_i64),
                        other => other.as_i64(),
                    })
                    .collect()
            })
        } else {
            None
        };

        Ok(Self {
            document_id,
            fields,
            media_ids,
        })
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Non-empty text value of `name`.
    #[must_use]
    pub fn text(&self, name: &str) -> Option<String> {
        self.field(name).and_then(FieldValue::as_text)
    }

    /// `true` when at least one translatable field holds a non-empty value.
    #[must_use]
    pub fn has_translatable_content(&self, profile: &ContentTypeProfile) -> bool {
        profile
            .translatable_fields
            .iter()
            .any(|f| self.field(f).is_some_and(|v| !v.is_empty()))
    }

    /// Translatable fields with non-empty values, in profile order.
    #[must_use]
    pub fn translatable_values(&self, profile: &ContentTypeProfile) -> Vec<(&'static str, String)> {
        profile
            .translatable_fields
            .iter()
            .filter_map(|f| self.text(f).map(|v| (*f, v)))
            .collect()
    }

    /// Label for log lines: the name field, falling back to the document id.
    #[must_use]
    pub fn display_name(&self, profile: &ContentTypeProfile) -> String {
        self.text(profile.name_field)
            .unwrap_or_else(|| self.document_id.clone())
    }

    /// Slug discriminator (e.g. the set number), when the profile declares
    /// one and the entry carries it.
    #[must_use]
    pub fn discriminator(&self, profile: &ContentTypeProfile) -> Option<String> {
        profile
            .discriminator_field
            .and_then(|f| self.text(f))
            .map(|d| d.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::content_types::{CATEGORY, SET};

    #[test]
    fn whitespace_only_text_is_empty() {
        assert!(FieldValue::Text("   \n".into()).is_empty());
        assert!(FieldValue::Text(String::new()).is_empty());
        assert!(FieldValue::Null.is_empty());
        assert!(!FieldValue::Text("Panzer".into()).is_empty());
        assert!(!FieldValue::Number(0.into()).is_empty());
    }

    #[test]
    fn number_renders_as_text() {
        assert_eq!(
            FieldValue::Number(2559.into()).as_text().as_deref(),
            Some("2559")
        );
    }

    #[test]
    fn from_document_reads_configured_fields_only() {
        let doc = json!({
            "id": 17,
            "documentId": "abc123",
            "name": "Tiger I",
            "subtitle": null,
            "setNumber": "2559",
            "pieces": 850,
            "images": [{"id": 5}, {"id": 9}]
        });
        let entry = SourceEntry::from_document(&SET, &doc).unwrap();
        assert_eq!(entry.document_id, "abc123");
        assert_eq!(entry.field("name"), Some(&FieldValue::Text("Tiger I".into())));
        assert_eq!(entry.field("subtitle"), Some(&FieldValue::Null));
        assert_eq!(entry.field("setNumber"), Some(&FieldValue::Text("2559".into())));
        assert!(entry.field("pieces").is_none());
        assert_eq!(entry.media_ids, Some(vec![5, 9]));
    }

    #[test]
    fn from_document_ignores_media_without_workaround() {
        let doc = json!({"documentId": "c1", "name": "Panzer", "images": [{"id": 1}]});
        let entry = SourceEntry::from_document(&CATEGORY, &doc).unwrap();
        assert!(entry.media_ids.is_none());
    }

    #[test]
    fn from_document_accepts_bare_media_ids() {
        let doc = json!({"documentId": "s1", "images": [3, 4]});
        let entry = SourceEntry::from_document(&SET, &doc).unwrap();
        assert_eq!(entry.media_ids, Some(vec![3, 4]));
    }

    #[test]
    fn from_document_requires_document_id() {
        let doc = json!({"id": 1, "name": "x"});
        assert_eq!(
            SourceEntry::from_document(&SET, &doc),
            Err(EntryError::MissingDocumentId)
        );
        assert_eq!(
            SourceEntry::from_document(&SET, &json!([1, 2])),
            Err(EntryError::NotAnObject)
        );
    }

    #[test]
    fn has_translatable_content_uses_shared_emptiness_rule() {
        let blank = SourceEntry::new("a")
            .with_field("name", "  ")
            .with_field("setNumber", "2559");
        assert!(!blank.has_translatable_content(&SET));

        let filled = SourceEntry::new("b").with_field("description", "Ein Panzer");
        assert!(filled.has_translatable_content(&SET));
    }

    #[test]
    fn translatable_values_follow_profile_order() {
        let entry = SourceEntry::new("a")
            .with_field("metaTitle", "Meta")
            .with_field("name", "Tiger I")
            .with_field("subtitle", "");
        let values = entry.translatable_values(&SET);
        assert_eq!(
            values,
            vec![("name", "Tiger I".to_string()), ("metaTitle", "Meta".to_string())]
        );
    }

    #[test]
    fn display_name_falls_back_to_document_id() {
        let entry = SourceEntry::new("doc-9");
        assert_eq!(entry.display_name(&SET), "doc-9");
        let named = SourceEntry::new("doc-9").with_field("name", "Bismarck");
        assert_eq!(named.display_name(&SET), "Bismarck");
    }

    #[test]
    fn discriminator_only_for_declaring_profiles() {
        let entry = SourceEntry::new("x")
            .with_field("name", "Tiger I")
            .with_field("setNumber", "2559");
        assert_eq!(entry.discriminator(&SET).as_deref(), Some("2559"));
        assert!(entry.discriminator(&CATEGORY).is_none());
    }
}
