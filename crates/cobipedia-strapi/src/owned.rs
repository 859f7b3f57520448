//! Ownership-filtered CRUD over user-owned content types.
//!
//! The caller passes the authenticated owner's `documentId`; `None` means the
//! request is unauthenticated. Ownership is checked against the `user`
//! relation of each document.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::error::StrapiError;
use crate::store::ContentStore;
use crate::types::{Filter, Populate, Query, Sort};

/// Maximum number of documents returned by [`OwnedCollections::list`].
pub const LIST_LIMIT: u32 = 100;

/// Maximum number of items accepted by a single batch create.
pub const MAX_BATCH_SIZE: usize = 200;

const OWNER_FIELD: &str = "user";
const SET_SUMMARY_FIELDS: &[&str] = &["documentId", "setNumber", "name", "slug"];
const SET_IMAGE_FIELDS: &[&str] = &["url", "formats"];

#[derive(Debug, Error)]
pub enum OwnedError {
    #[error("you must be logged in")]
    Unauthorized,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Store(#[from] StrapiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnedKind {
    CollectionItem,
    WishlistItem,
    PriceAlert,
}

impl OwnedKind {
    /// Host content-type uid.
    #[must_use]
    pub fn uid(self) -> &'static str {
        match self {
            OwnedKind::CollectionItem => "api::collection-item.collection-item",
            OwnedKind::WishlistItem => "api::wishlist-item.wishlist-item",
            OwnedKind::PriceAlert => "api::price-alert.price-alert",
        }
    }

    /// Collection path segment under `/api`.
    #[must_use]
    pub fn endpoint(self) -> &'static str {
        match self {
            OwnedKind::CollectionItem => "collection-items",
            OwnedKind::WishlistItem => "wishlist-items",
            OwnedKind::PriceAlert => "price-alerts",
        }
    }

    /// Populate directive for the related set. Wishlist items and price
    /// alerts also carry the set's images.
    fn set_populate(self) -> Populate {
        let set = Populate::relation("set", SET_SUMMARY_FIELDS);
        match self {
            OwnedKind::CollectionItem => set,
            OwnedKind::WishlistItem | OwnedKind::PriceAlert => {
                set.with(Populate::relation("images", SET_IMAGE_FIELDS))
            }
        }
    }

    fn noun(self) -> &'static str {
        match self {
            OwnedKind::CollectionItem | OwnedKind::WishlistItem => "items",
            OwnedKind::PriceAlert => "alerts",
        }
    }
}

/// Result of one item in a batch create.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BatchOutcome {
    Created { success: bool, data: Value },
    Failed { success: bool, error: String },
}

impl BatchOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, BatchOutcome::Created { .. })
    }
}

pub struct OwnedCollections<'a> {
    store: &'a dyn ContentStore,
}

impl<'a> OwnedCollections<'a> {
    #[must_use]
    pub fn new(store: &'a dyn ContentStore) -> Self {
        Self { store }
    }

    /// The owner's documents of `kind`, newest first, at most [`LIST_LIMIT`].
    ///
    /// # Errors
    ///
    /// [`OwnedError::Unauthorized`] without an owner; [`OwnedError::Store`]
    /// if the store call fails.
    pub async fn list(&self, kind: OwnedKind, owner: Option<&str>) -> Result<Vec<Value>, OwnedError> {
        let owner = require_owner(owner)?;
        let query = Query::new()
            .filter(Filter::eq(&[OWNER_FIELD, "documentId"], owner))
            .populate(kind.set_populate())
            .sort(Sort::desc("createdAt"))
            .page(1, LIST_LIMIT);
        let page = self.store.find_many(kind.endpoint(), &query).await?;
        Ok(page.data)
    }

    /// Creates a document of `kind` owned by `owner`. Any `user` value in
    /// `data` is replaced.
    ///
    /// # Errors
    ///
    /// [`OwnedError::Unauthorized`] without an owner; [`OwnedError::Store`]
    /// if the store call fails.
    pub async fn create(
        &self,
        kind: OwnedKind,
        owner: Option<&str>,
        data: Value,
    ) -> Result<Value, OwnedError> {
        let owner = require_owner(owner)?;
        let created = self
            .store
            .create(kind.endpoint(), None, with_owner(data, owner))
            .await?;
        tracing::debug!(content_type = kind.uid(), owner, "owned document created");
        Ok(created)
    }

    /// Creates collection items one by one, reporting a per-item outcome. A
    /// failing item does not stop the batch.
    ///
    /// # Errors
    ///
    /// [`OwnedError::Unauthorized`] without an owner;
    /// [`OwnedError::BadRequest`] for an empty batch or one larger than
    /// [`MAX_BATCH_SIZE`].
    pub async fn batch_create_collection_items(
        &self,
        owner: Option<&str>,
        items: Vec<Value>,
    ) -> Result<Vec<BatchOutcome>, OwnedError> {
        let owner = require_owner(owner)?;
        if items.is_empty() {
            return Err(OwnedError::BadRequest("No items provided".to_string()));
        }
        if items.len() > MAX_BATCH_SIZE {
            return Err(OwnedError::BadRequest(format!(
                "Maximum {MAX_BATCH_SIZE} items per batch"
            )));
        }

        let endpoint = OwnedKind::CollectionItem.endpoint();
        let mut outcomes = Vec::with_capacity(items.len());
        for item in items {
            match self.store.create(endpoint, None, with_owner(item, owner)).await {
                Ok(data) => outcomes.push(BatchOutcome::Created {
                    success: true,
                    data,
                }),
                Err(e) => {
                    tracing::warn!(owner, error = %e, "batch item create failed");
                    outcomes.push(BatchOutcome::Failed {
                        success: false,
                        error: e.to_string(),
                    });
                }
            }
        }
        Ok(outcomes)
    }

    /// Updates one of the owner's price alerts.
    ///
    /// # Errors
    ///
    /// [`OwnedError::Unauthorized`] without an owner;
    /// [`OwnedError::Forbidden`] if the alert is missing or foreign-owned;
    /// [`OwnedError::Store`] if a store call fails.
    pub async fn update_price_alert(
        &self,
        owner: Option<&str>,
        document_id: &str,
        data: Value,
    ) -> Result<Value, OwnedError> {
        let owner = require_owner(owner)?;
        let kind = OwnedKind::PriceAlert;
        self.ensure_owned(kind, owner, document_id, "update").await?;
        let updated = self
            .store
            .update(kind.endpoint(), document_id, None, data)
            .await?;
        Ok(updated)
    }

    /// Deletes one of the owner's documents and returns its id.
    ///
    /// # Errors
    ///
    /// [`OwnedError::Unauthorized`] without an owner;
    /// [`OwnedError::Forbidden`] if the document is missing or foreign-owned;
    /// [`OwnedError::Store`] if a store call fails.
    pub async fn delete(
        &self,
        kind: OwnedKind,
        owner: Option<&str>,
        document_id: &str,
    ) -> Result<String, OwnedError> {
        let owner = require_owner(owner)?;
        self.ensure_owned(kind, owner, document_id, "delete").await?;
        self.store.delete(kind.endpoint(), document_id).await?;
        tracing::debug!(content_type = kind.uid(), owner, document_id, "owned document deleted");
        Ok(document_id.to_string())
    }

    async fn ensure_owned(
        &self,
        kind: OwnedKind,
        owner: &str,
        document_id: &str,
        action: &str,
    ) -> Result<(), OwnedError> {
        let query = Query::new().populate(Populate::relation(OWNER_FIELD, &[]));
        let existing = self
            .store
            .find_one(kind.endpoint(), document_id, &query)
            .await?;

        let owned = existing
            .as_ref()
            .and_then(|doc| doc.get(OWNER_FIELD))
            .and_then(relation_document_id)
            == Some(owner);
        if owned {
            Ok(())
        } else {
            Err(OwnedError::Forbidden(format!(
                "You can only {action} your own {}",
                kind.noun()
            )))
        }
    }
}

fn require_owner(owner: Option<&str>) -> Result<&str, OwnedError> {
    owner.filter(|o| !o.is_empty()).ok_or(OwnedError::Unauthorized)
}

fn with_owner(data: Value, owner: &str) -> Value {
    let mut map = match data {
        Value::Object(map) => map,
        _ => serde_json::Map::new(),
    };
    map.insert(OWNER_FIELD.to_string(), Value::from(owner));
    Value::Object(map)
}

/// `documentId` of a relation value, populated or bare.
fn relation_document_id(value: &Value) -> Option<&str> {
    match value {
        Value::Object(map) => map.get("documentId").and_then(Value::as_str),
        Value::String(id) => Some(id),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::memory::MemoryStore;

    #[tokio::test]
    async fn every_operation_requires_an_owner() {
        let store = MemoryStore::new();
        let owned = OwnedCollections::new(&store);

        assert!(matches!(
            owned.list(OwnedKind::WishlistItem, None).await,
            Err(OwnedError::Unauthorized)
        ));
        assert!(matches!(
            owned.create(OwnedKind::PriceAlert, None, json!({})).await,
            Err(OwnedError::Unauthorized)
        ));
        assert!(matches!(
            owned.batch_create_collection_items(None, vec![json!({})]).await,
            Err(OwnedError::Unauthorized)
        ));
        assert!(matches!(
            owned.update_price_alert(None, "x", json!({})).await,
            Err(OwnedError::Unauthorized)
        ));
        assert!(matches!(
            owned.delete(OwnedKind::CollectionItem, None, "x").await,
            Err(OwnedError::Unauthorized)
        ));
        assert_eq!(store.count("collection-items"), 0);
    }

    #[tokio::test]
    async fn create_overwrites_user_with_owner() {
        let store = MemoryStore::new();
        let owned = OwnedCollections::new(&store);

        let created = owned
            .create(
                OwnedKind::WishlistItem,
                Some("u-1"),
                json!({"set": "s-1", "user": "someone-else"}),
            )
            .await
            .unwrap();
        assert_eq!(created["user"], "u-1");
        assert_eq!(created["set"], "s-1");
    }

    #[tokio::test]
    async fn list_returns_only_own_entries_newest_first() {
        let store = MemoryStore::new();
        let owned = OwnedCollections::new(&store);
        for set in ["s-1", "s-2"] {
            owned
                .create(OwnedKind::CollectionItem, Some("u-1"), json!({"set": set}))
                .await
                .unwrap();
        }
        owned
            .create(OwnedKind::CollectionItem, Some("u-2"), json!({"set": "s-3"}))
            .await
            .unwrap();

        let mine = owned.list(OwnedKind::CollectionItem, Some("u-1")).await.unwrap();
        let sets: Vec<&str> = mine.iter().filter_map(|d| d["set"].as_str()).collect();
        assert_eq!(sets, vec!["s-2", "s-1"]);
    }

    #[tokio::test]
    async fn price_alert_list_populates_set_images() {
        let store = MemoryStore::new();
        let owned = OwnedCollections::new(&store);
        owned.list(OwnedKind::PriceAlert, Some("u-1")).await.unwrap();
        owned.list(OwnedKind::CollectionItem, Some("u-1")).await.unwrap();

        let calls = store.list_calls();
        let alert_pairs = calls[0].1.to_pairs();
        assert!(alert_pairs.contains(&(
            "populate[set][populate][images][fields][1]".to_string(),
            "formats".to_string()
        )));
        let item_pairs = calls[1].1.to_pairs();
        assert!(item_pairs.iter().all(|(k, _)| !k.contains("images")));
        assert!(item_pairs.contains(&("populate[set][fields][3]".to_string(), "slug".to_string())));
    }

    #[tokio::test]
    async fn batch_rejects_empty_and_oversized() {
        let store = MemoryStore::new();
        let owned = OwnedCollections::new(&store);

        assert!(matches!(
            owned.batch_create_collection_items(Some("u-1"), vec![]).await,
            Err(OwnedError::BadRequest(_))
        ));
        let too_many = vec![json!({"set": "s"}); MAX_BATCH_SIZE + 1];
        assert!(matches!(
            owned.batch_create_collection_items(Some("u-1"), too_many).await,
            Err(OwnedError::BadRequest(_))
        ));
        assert_eq!(store.count("collection-items"), 0);
    }

    #[tokio::test]
    async fn batch_reports_per_item_outcomes() {
        let store = MemoryStore::new();
        store.fail_writes_for("broken");
        let owned = OwnedCollections::new(&store);

        let outcomes = owned
            .batch_create_collection_items(
                Some("u-1"),
                vec![
                    json!({"set": "s-1"}),
                    json!({"documentId": "broken", "set": "s-2"}),
                    json!({"set": "s-3"}),
                ],
            )
            .await
            .unwrap();

        let flags: Vec<bool> = outcomes.iter().map(BatchOutcome::is_success).collect();
        assert_eq!(flags, vec![true, false, true]);
        assert_eq!(store.count("collection-items"), 2);
        let rendered = serde_json::to_value(&outcomes[1]).unwrap();
        assert_eq!(rendered["success"], false);
        assert!(rendered["error"].as_str().is_some_and(|e| !e.is_empty()));
    }

    #[tokio::test]
    async fn foreign_or_missing_documents_are_forbidden() {
        let store = MemoryStore::new();
        store.insert(
            "price-alerts",
            None,
            json!({"documentId": "alert-1", "user": {"documentId": "u-2"}, "targetPrice": 20}),
        );
        let owned = OwnedCollections::new(&store);

        let err = owned
            .update_price_alert(Some("u-1"), "alert-1", json!({"targetPrice": 10}))
            .await
            .unwrap_err();
        assert!(matches!(err, OwnedError::Forbidden(ref m) if m.contains("alerts")));

        assert!(matches!(
            owned.delete(OwnedKind::PriceAlert, Some("u-1"), "missing").await,
            Err(OwnedError::Forbidden(_))
        ));
        assert_eq!(store.count("price-alerts"), 1);
    }

    #[tokio::test]
    async fn owner_can_update_and_delete() {
        let store = MemoryStore::new();
        store.insert(
            "price-alerts",
            None,
            json!({"documentId": "alert-1", "user": "u-1", "targetPrice": 20}),
        );
        let owned = OwnedCollections::new(&store);

        let updated = owned
            .update_price_alert(Some("u-1"), "alert-1", json!({"targetPrice": 15}))
            .await
            .unwrap();
        assert_eq!(updated["targetPrice"], 15);

        let deleted = owned
            .delete(OwnedKind::PriceAlert, Some("u-1"), "alert-1")
            .await
            .unwrap();
        assert_eq!(deleted, "alert-1");
        assert_eq!(store.count("price-alerts"), 0);
    }
}
