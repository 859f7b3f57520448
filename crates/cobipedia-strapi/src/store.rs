use async_trait::async_trait;
use serde_json::Value;

use crate::error::StrapiError;
use crate::types::{Page, Query};

/// Document store behind the host CMS, addressed by content-type identifier
/// (the collection path segment, e.g. `sets`) and stable `documentId`.
///
/// Implemented over HTTP by [`crate::StrapiClient`] and in memory by
/// [`crate::MemoryStore`].
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// One page of documents matching `query`.
    async fn find_many(&self, content_type: &str, query: &Query) -> Result<Page, StrapiError>;

    /// A single document, or `None` if it does not exist.
    async fn find_one(
        &self,
        content_type: &str,
        document_id: &str,
        query: &Query,
    ) -> Result<Option<Value>, StrapiError>;

    /// Creates a document and returns it as stored.
    async fn create(
        &self,
        content_type: &str,
        locale: Option<&str>,
        data: Value,
    ) -> Result<Value, StrapiError>;

    /// Writes `data` to the `locale` variant of an existing document,
    /// creating that variant if needed, and returns it as stored.
    async fn update(
        &self,
        content_type: &str,
        document_id: &str,
        locale: Option<&str>,
        data: Value,
    ) -> Result<Value, StrapiError>;

    async fn delete(&self, content_type: &str, document_id: &str) -> Result<(), StrapiError>;
}
