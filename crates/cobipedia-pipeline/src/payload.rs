//! Assembly of the data written to a target-locale variant.

use cobipedia_core::{slug_with_discriminator, ContentTypeProfile, SourceEntry, MEDIA_FIELD};
use cobipedia_translate::Translation;
use serde_json::{Map, Value};

/// Write payload for one entry in one target locale.
pub type WritePayload = Map<String, Value>;

/// Builds the payload for `entry` from its `translation`:
///
/// 1. required fields, verbatim from the source;
/// 2. translated fields declared translatable by the profile;
/// 3. a slug derived from the translated name, suffixed with the entry's
///    discriminator, when the profile has a slug field;
/// 4. media ids, when the profile uses the media workaround and the entry
///    has any.
#[must_use]
pub fn build_payload(
    profile: &ContentTypeProfile,
    entry: &SourceEntry,
    translation: &Translation,
) -> WritePayload {
    let mut payload = Map::new();

    for field in profile.required_fields {
        if let Some(value) = entry.field(field) {
            payload.insert((*field).to_string(), value.to_json());
        }
    }

    for field in profile.translatable_fields {
        if let Some(text) = translation.get(field) {
            payload.insert((*field).to_string(), Value::from(text));
        }
    }

    if let (Some(slug_field), Some(name)) = (profile.slug_field, translation.get(profile.name_field)) {
        let discriminator = entry.discriminator(profile);
        let slug = slug_with_discriminator(name, discriminator.as_deref());
        if !slug.is_empty() {
            payload.insert(slug_field.to_string(), Value::from(slug));
        }
    }

    if profile.uses_media_workaround {
        if let Some(ids) = entry.media_ids.as_ref().filter(|ids| !ids.is_empty()) {
            payload.insert(
                MEDIA_FIELD.to_string(),
                Value::Array(ids.iter().map(|id| Value::from(*id)).collect()),
            );
        }
    }

    payload
}
