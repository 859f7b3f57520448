//! Static registry of the content types that take part in localization.
//!
//! Order matters: [`CONTENT_TYPES`] is the order in which a full run visits
//! the types, so categories and series exist in every locale before the sets
//! that reference them.

/// Field carrying media references on content types that need the media
/// workaround.
pub const MEDIA_FIELD: &str = "images";

/// Stable identifier field of every Strapi document.
pub const DOCUMENT_ID_FIELD: &str = "documentId";

/// Model tier used for a content type, chosen by expected text length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelProfile {
    /// Short texts: names, subtitles, meta descriptions.
    Short,
    /// Long-form prose such as historical background articles.
    Long,
}

impl std::fmt::Display for ModelProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelProfile::Short => write!(f, "short"),
            ModelProfile::Long => write!(f, "long"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentTypeProfile {
    /// Name used on the command line and as the ledger key.
    pub name: &'static str,
    /// Collection path segment under `/api`.
    pub endpoint: &'static str,
    pub translatable_fields: &'static [&'static str],
    /// Non-localized fields the host rejects a locale write without.
    pub required_fields: &'static [&'static str],
    pub slug_field: Option<&'static str>,
    pub name_field: &'static str,
    /// Source field appended to derived slugs to keep them unique.
    pub discriminator_field: Option<&'static str>,
    /// Re-send media ids on every locale write; the host drops media
    /// associations on locale-scoped updates otherwise.
    pub uses_media_workaround: bool,
    pub model_profile: ModelProfile,
    pub prompt_context: &'static str,
}

impl ContentTypeProfile {
    /// Fields to request from the host when fetching source entries:
    /// translatable, then required, then the document id.
    #[must_use]
    pub fn requested_fields(&self) -> Vec<&'static str> {
        let mut fields: Vec<&'static str> = Vec::with_capacity(
            self.translatable_fields.len() + self.required_fields.len() + 1,
        );
        for field in self
            .translatable_fields
            .iter()
            .chain(self.required_fields.iter())
        {
            if !fields.contains(field) {
                fields.push(field);
            }
        }
        fields.push(DOCUMENT_ID_FIELD);
        fields
    }

    /// Every key a write payload for this type may contain.
    #[must_use]
    pub fn writable_keys(&self) -> Vec<&'static str> {
        let mut keys: Vec<&'static str> = self
            .required_fields
            .iter()
            .chain(self.translatable_fields.iter())
            .copied()
            .collect();
        if let Some(slug) = self.slug_field {
            keys.push(slug);
        }
        if self.uses_media_workaround {
            keys.push(MEDIA_FIELD);
        }
        keys
    }

    #[must_use]
    pub fn is_translatable(&self, field: &str) -> bool {
        self.translatable_fields.contains(&field)
    }
}

pub const CATEGORY: ContentTypeProfile = ContentTypeProfile {
    name: "category",
    endpoint: "categories",
    translatable_fields: &["name", "description"],
    required_fields: &[],
    // Category slugs stay global.
    slug_field: None,
    name_field: "name",
    discriminator_field: None,
    uses_media_workaround: false,
    model_profile: ModelProfile::Short,
    prompt_context: "a building block set category",
};

pub const MANUFACTURER: ContentTypeProfile = ContentTypeProfile {
    name: "manufacturer",
    endpoint: "manufacturers",
    translatable_fields: &["name", "description"],
    required_fields: &[],
    slug_field: None,
    name_field: "name",
    discriminator_field: None,
    uses_media_workaround: false,
    model_profile: ModelProfile::Short,
    prompt_context: "a building block manufacturer",
};

pub const SERIES: ContentTypeProfile = ContentTypeProfile {
    name: "series",
    endpoint: "all-series",
    translatable_fields: &["name", "description"],
    required_fields: &[],
    slug_field: None,
    name_field: "name",
    discriminator_field: None,
    uses_media_workaround: false,
    model_profile: ModelProfile::Short,
    prompt_context: "a building block set series/collection",
};

pub const SET: ContentTypeProfile = ContentTypeProfile {
    name: "set",
    endpoint: "sets",
    translatable_fields: &[
        "name",
        "subtitle",
        "description",
        "metaTitle",
        "metaDescription",
    ],
    required_fields: &["setNumber"],
    slug_field: Some("slug"),
    name_field: "name",
    discriminator_field: Some("setNumber"),
    uses_media_workaround: true,
    model_profile: ModelProfile::Short,
    prompt_context:
        "a COBI building block set (like LEGO but focused on military/historical models)",
};

pub const HISTORICAL_CONTEXT: ContentTypeProfile = ContentTypeProfile {
    name: "historical-context",
    endpoint: "historical-contexts",
    translatable_fields: &["title", "period", "summary", "content"],
    required_fields: &[],
    slug_field: Some("slug"),
    name_field: "title",
    discriminator_field: None,
    uses_media_workaround: false,
    model_profile: ModelProfile::Long,
    prompt_context: "historical context information about a military vehicle/ship/aircraft",
};

/// All localized content types, in processing order.
pub const CONTENT_TYPES: &[ContentTypeProfile] =
    &[CATEGORY, MANUFACTURER, SERIES, SET, HISTORICAL_CONTEXT];

/// Look up a content type by its command-line name.
#[must_use]
pub fn find_content_type(name: &str) -> Option<&'static ContentTypeProfile> {
    CONTENT_TYPES.iter().find(|p| p.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_order_is_fixed() {
        let names: Vec<&str> = CONTENT_TYPES.iter().map(|p| p.name).collect();
        assert_eq!(
            names,
            vec!["category", "manufacturer", "series", "set", "historical-context"]
        );
    }

    #[test]
    fn find_content_type_known_and_unknown() {
        assert_eq!(find_content_type("set").map(|p| p.endpoint), Some("sets"));
        assert_eq!(
            find_content_type("series").map(|p| p.endpoint),
            Some("all-series")
        );
        assert!(find_content_type("minifigure").is_none());
    }

    #[test]
    fn requested_fields_include_required_and_document_id() {
        let fields = SET.requested_fields();
        assert_eq!(
            fields,
            vec![
                "name",
                "subtitle",
                "description",
                "metaTitle",
                "metaDescription",
                "setNumber",
                "documentId"
            ]
        );
    }

    #[test]
    fn writable_keys_cover_slug_and_media_only_when_configured() {
        let set_keys = SET.writable_keys();
        assert!(set_keys.contains(&"slug"));
        assert!(set_keys.contains(&MEDIA_FIELD));
        assert!(set_keys.contains(&"setNumber"));

        let category_keys = CATEGORY.writable_keys();
        assert_eq!(category_keys, vec!["name", "description"]);
    }

    #[test]
    fn only_historical_context_uses_long_model() {
        for profile in CONTENT_TYPES {
            let expected = if profile.name == "historical-context" {
                ModelProfile::Long
            } else {
                ModelProfile::Short
            };
            assert_eq!(profile.model_profile, expected, "{}", profile.name);
        }
    }

    #[test]
    fn name_field_is_translatable_for_every_type() {
        for profile in CONTENT_TYPES {
            assert!(
                profile.is_translatable(profile.name_field),
                "{} name field must be translatable",
                profile.name
            );
        }
    }
}
