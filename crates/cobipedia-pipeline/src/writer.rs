//! Persistence of write payloads to target-locale variants.

use cobipedia_core::ContentTypeProfile;
use cobipedia_strapi::{ContentStore, StrapiError};
use serde_json::Value;

use crate::payload::WritePayload;

/// Characters of a payload shown in dry-run logs.
const DRY_RUN_PREVIEW_CHARS: usize = 300;

/// Writes one payload per entry and locale, or only logs it in dry-run mode.
pub struct Writer<'a> {
    store: &'a dyn ContentStore,
    dry_run: bool,
}

impl<'a> Writer<'a> {
    #[must_use]
    pub fn new(store: &'a dyn ContentStore, dry_run: bool) -> Self {
        Self { store, dry_run }
    }

    /// # Errors
    ///
    /// Returns the store's [`StrapiError`] when the host rejects the write.
    pub async fn write(
        &self,
        profile: &ContentTypeProfile,
        document_id: &str,
        locale: &str,
        payload: WritePayload,
    ) -> Result<(), StrapiError> {
        if self.dry_run {
            let preview: String = serde_json::to_string(&payload)
                .unwrap_or_default()
                .chars()
                .take(DRY_RUN_PREVIEW_CHARS)
                .collect();
            tracing::info!(
                endpoint = profile.endpoint,
                document_id,
                locale,
                payload = %preview,
                "dry run: skipping write"
            );
            return Ok(());
        }

        self.store
            .update(
                profile.endpoint,
                document_id,
                Some(locale),
                Value::Object(payload),
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use cobipedia_core::content_types::SET;
    use cobipedia_strapi::MemoryStore;
    use serde_json::json;

    use super::*;

    fn payload() -> WritePayload {
        let Value::Object(map) = json!({"setNumber": "2559", "name": "Tiger I"}) else {
            unreachable!()
        };
        map
    }

    #[tokio::test]
    async fn writes_to_locale_variant() {
        let store = MemoryStore::new();
        store.insert("sets", Some("de"), json!({"documentId": "abc", "name": "Tiger I"}));

        Writer::new(&store, false)
            .write(&SET, "abc", "en", payload())
            .await
            .unwrap();

        let writes = store.writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].content_type, "sets");
        assert_eq!(writes[0].locale.as_deref(), Some("en"));
        assert_eq!(writes[0].data, json!({"setNumber": "2559", "name": "Tiger I"}));
    }

    #[tokio::test]
    async fn dry_run_never_touches_the_store() {
        let store = MemoryStore::new();
        Writer::new(&store, true)
            .write(&SET, "abc", "en", payload())
            .await
            .unwrap();
        assert!(store.writes().is_empty());
    }

    #[tokio::test]
    async fn host_rejection_is_returned() {
        let store = MemoryStore::new();
        store.insert("sets", Some("de"), json!({"documentId": "abc"}));
        store.fail_writes_for("abc");

        let err = Writer::new(&store, false)
            .write(&SET, "abc", "pl", payload())
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(500));
    }
}
