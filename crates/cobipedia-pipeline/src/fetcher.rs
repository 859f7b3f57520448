//! Paginated retrieval of source-locale documents.

use std::time::Duration;

use cobipedia_core::{ContentTypeProfile, SourceEntry, MEDIA_FIELD};
use cobipedia_strapi::{ContentStore, Populate, Query};
use serde_json::Value;

use crate::error::PipelineError;

/// Upper bound on pages per fetch, guarding against a host that keeps
/// reporting more pages.
pub const MAX_PAGES: u32 = 1_000;

/// Fetches every document matching `base` by walking pages of `page_size`
/// until the reported page count is exhausted, sleeping `delay` between
/// requests.
///
/// All-or-nothing: if any page fails, documents from earlier pages are
/// discarded and the error is returned.
///
/// # Errors
///
/// Returns [`PipelineError::Fetch`] if a page request fails, or
/// [`PipelineError::PaginationLimit`] after [`MAX_PAGES`] pages.
pub async fn fetch_all_documents(
    store: &dyn ContentStore,
    content_type: &str,
    base: &Query,
    page_size: u32,
    delay: Duration,
) -> Result<Vec<Value>, PipelineError> {
    let mut documents = Vec::new();
    let mut page = 1u32;

    loop {
        if page > MAX_PAGES {
            return Err(PipelineError::PaginationLimit {
                content_type: content_type.to_string(),
                max_pages: MAX_PAGES,
            });
        }

        let query = base.clone().page(page, page_size);
        let result = store
            .find_many(content_type, &query)
            .await
            .map_err(|source| PipelineError::Fetch {
                content_type: content_type.to_string(),
                source,
            })?;

        let received = result.data.len();
        documents.extend(result.data);
        tracing::debug!(
            content_type,
            page,
            page_count = result.pagination.page_count,
            received,
            "fetched page"
        );

        if page >= result.pagination.page_count || received == 0 {
            break;
        }
        page += 1;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    Ok(documents)
}

/// Query for a profile's source entries: its declared fields, plus media ids
/// when the media workaround applies.
#[must_use]
pub fn source_query(profile: &ContentTypeProfile, locale: &str) -> Query {
    let mut query = Query::new()
        .locale(locale)
        .fields(&profile.requested_fields());
    if profile.uses_media_workaround {
        query = query.populate(Populate::relation(MEDIA_FIELD, &["id"]));
    }
    query
}

/// Fetches all entries of `profile` in `locale`, in host order.
///
/// Documents without a `documentId` are logged and dropped.
///
/// # Errors
///
/// See [`fetch_all_documents`].
pub async fn fetch_source_entries(
    store: &dyn ContentStore,
    profile: &ContentTypeProfile,
    locale: &str,
    page_size: u32,
    delay: Duration,
) -> Result<Vec<SourceEntry>, PipelineError> {
    let query = source_query(profile, locale);
    let documents = fetch_all_documents(store, profile.endpoint, &query, page_size, delay).await?;

    let entries = documents
        .iter()
        .filter_map(|doc| match SourceEntry::from_document(profile, doc) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(content_type = profile.name, error = %e, "skipping malformed document");
                None
            }
        })
        .collect();
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use cobipedia_core::content_types::{CATEGORY, SET};
    use cobipedia_strapi::MemoryStore;
    use serde_json::json;

    use super::*;

    fn seed(store: &MemoryStore, count: usize) {
        for i in 0..count {
            store.insert(
                "sets",
                Some("de"),
                json!({
                    "documentId": format!("set-{i}"),
                    "name": format!("Set {i}"),
                    "setNumber": format!("{}", 2000 + i),
                    "pieces": 100,
                    "images": [{"id": i}]
                }),
            );
        }
    }

    #[tokio::test]
    async fn walks_every_page_in_order() {
        let store = MemoryStore::new();
        seed(&store, 7);

        let entries = fetch_source_entries(&store, &SET, "de", 3, Duration::ZERO)
            .await
            .unwrap();

        assert_eq!(entries.len(), 7);
        assert_eq!(entries[0].document_id, "set-0");
        assert_eq!(entries[6].document_id, "set-6");
        assert_eq!(store.list_calls().len(), 3);
    }

    #[tokio::test]
    async fn requests_declared_fields_and_media() {
        let store = MemoryStore::new();
        seed(&store, 1);

        let entries = fetch_source_entries(&store, &SET, "de", 50, Duration::ZERO)
            .await
            .unwrap();

        let (_, query) = &store.list_calls()[0];
        assert_eq!(query.locale.as_deref(), Some("de"));
        assert_eq!(query.page_size, Some(50));
        assert!(query.fields.iter().any(|f| f == "setNumber"));
        assert!(query.fields.iter().any(|f| f == "documentId"));
        assert_eq!(query.populate, vec![Populate::relation("images", &["id"])]);
        assert_eq!(entries[0].media_ids, Some(vec![0]));
    }

    #[test]
    fn no_media_populate_without_workaround() {
        assert!(source_query(&CATEGORY, "de").populate.is_empty());
    }

    #[tokio::test]
    async fn empty_collection_is_one_request() {
        let store = MemoryStore::new();
        let entries = fetch_source_entries(&store, &CATEGORY, "de", 50, Duration::ZERO)
            .await
            .unwrap();
        assert!(entries.is_empty());
        assert_eq!(store.list_calls().len(), 1);
    }

    #[tokio::test]
    async fn failing_page_aborts_the_fetch() {
        let store = MemoryStore::new();
        seed(&store, 3);
        store.fail_lists_for("sets");

        let err = fetch_source_entries(&store, &SET, "de", 2, Duration::ZERO)
            .await
            .unwrap_err();
        assert!(
            matches!(err, PipelineError::Fetch { ref content_type, .. } if content_type == "sets"),
            "expected Fetch error, got {err:?}"
        );
    }

    #[tokio::test]
    async fn documents_without_id_are_dropped() {
        let store = MemoryStore::new();
        store.insert("categories", Some("de"), json!({"documentId": "", "name": "Panzer"}));
        store.insert("categories", Some("de"), json!({"documentId": "c2", "name": "Schiffe"}));

        let entries = fetch_source_entries(&store, &CATEGORY, "de", 50, Duration::ZERO)
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].document_id, "c2");
    }
}
