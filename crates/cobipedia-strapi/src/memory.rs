//! In-memory [`ContentStore`] for tests.
//!
//! Documents are kept per content type as JSON objects carrying `id`,
//! `documentId`, `locale` and `createdAt` alongside their attributes. A
//! relation may be stored either as a populated object or as the bare
//! `documentId` of the related document; filters accept both.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde_json::{Map, Value};

use crate::error::StrapiError;
use crate::store::ContentStore;
use crate::types::{Filter, Page, Pagination, Populate, Query, SortOrder};

/// A write observed by the store, in call order.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedWrite {
    pub content_type: String,
    pub document_id: String,
    pub locale: Option<String>,
    pub data: Value,
}

#[derive(Default)]
struct State {
    documents: BTreeMap<String, Vec<Map<String, Value>>>,
    next_id: i64,
    writes: Vec<RecordedWrite>,
    list_calls: Vec<(String, Query)>,
    failing_lists: HashSet<String>,
    failing_writes: HashSet<String>,
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seeds a document. `id` and `createdAt` are assigned when missing; the
    /// document is stored under `locale` when one is given.
    pub fn insert(&self, content_type: &str, locale: Option<&str>, document: Value) {
        let mut state = self.lock();
        let mut doc = match document {
            Value::Object(map) => map,
            other => {
                let mut map = Map::new();
                map.insert("value".to_string(), other);
                map
            }
        };
        state.stamp(&mut doc, locale);
        state
            .documents
            .entry(content_type.to_string())
            .or_default()
            .push(doc);
    }

    /// Makes every subsequent `find_many` on `content_type` fail with a 500.
    pub fn fail_lists_for(&self, content_type: &str) {
        self.lock().failing_lists.insert(content_type.to_string());
    }

    /// Makes every subsequent `update`/`create` touching `document_id` fail
    /// with a 500.
    pub fn fail_writes_for(&self, document_id: &str) {
        self.lock().failing_writes.insert(document_id.to_string());
    }

    /// Every successful `create`/`update`, in call order.
    #[must_use]
    pub fn writes(&self) -> Vec<RecordedWrite> {
        self.lock().writes.clone()
    }

    /// Every `find_many` call, in call order.
    #[must_use]
    pub fn list_calls(&self) -> Vec<(String, Query)> {
        self.lock().list_calls.clone()
    }

    /// Stored variant of a document in `locale` (or the locale-less one).
    #[must_use]
    pub fn get(&self, content_type: &str, document_id: &str, locale: Option<&str>) -> Option<Value> {
        let state = self.lock();
        state
            .documents
            .get(content_type)?
            .iter()
            .find(|d| matches_document(d, document_id, locale))
            .map(|d| Value::Object(d.clone()))
    }

    #[must_use]
    pub fn count(&self, content_type: &str) -> usize {
        self.lock()
            .documents
            .get(content_type)
            .map_or(0, Vec::len)
    }
}

impl State {
    fn stamp(&mut self, doc: &mut Map<String, Value>, locale: Option<&str>) {
        self.next_id += 1;
        let id = self.next_id;
        doc.entry("id").or_insert_with(|| Value::from(id));
        doc.entry("documentId")
            .or_insert_with(|| Value::from(format!("doc-{id}")));
        doc.entry("createdAt")
            .or_insert_with(|| Value::from(synthetic_timestamp(id)));
        if let Some(locale) = locale {
            doc.insert("locale".to_string(), Value::from(locale));
        }
    }

    fn injected_failure(content_type: &str, document_id: &str) -> StrapiError {
        StrapiError::UnexpectedStatus {
            status: 500,
            url: format!("memory://{content_type}/{document_id}"),
            body: "injected failure".to_string(),
        }
    }
}

/// Strictly increasing creation time so `createdAt` ordering is stable.
fn synthetic_timestamp(seq: i64) -> String {
    let base = DateTime::<Utc>::UNIX_EPOCH + Duration::days(20_000);
    (base + Duration::seconds(seq)).to_rfc3339()
}

fn matches_document(doc: &Map<String, Value>, document_id: &str, locale: Option<&str>) -> bool {
    doc.get("documentId").and_then(Value::as_str) == Some(document_id)
        && locale.is_none_or(|l| doc.get("locale").and_then(Value::as_str) == Some(l))
}

fn matches_filter(doc: &Map<String, Value>, filter: &Filter) -> bool {
    let Some((first, rest)) = filter.path.split_first() else {
        return false;
    };
    let mut current = match doc.get(first) {
        Some(value) => value,
        None => return false,
    };
    for key in rest {
        current = match current {
            Value::Object(map) => match map.get(key) {
                Some(value) => value,
                None => return false,
            },
            // Relation stored as the bare related id.
            scalar if key == "documentId" || key == "id" => scalar,
            _ => return false,
        };
    }
    current == &filter.value
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> std::cmp::Ordering {
    use std::cmp::Ordering;
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        _ => Ordering::Equal,
    }
}

/// Keeps requested fields, the identity fields and populated relations.
fn project(doc: &Map<String, Value>, query: &Query) -> Value {
    if query.fields.is_empty() {
        return Value::Object(doc.clone());
    }
    let populated: Vec<&str> = query
        .populate
        .iter()
        .filter_map(|p| match p {
            Populate::Relation { name, .. } => Some(name.as_str()),
            Populate::All => None,
        })
        .collect();
    let keep_all_relations = query.populate.contains(&Populate::All);

    let projected = doc
        .iter()
        .filter(|(key, value)| {
            matches!(key.as_str(), "id" | "documentId" | "locale")
                || query.fields.iter().any(|f| f == *key)
                || populated.contains(&key.as_str())
                || (keep_all_relations && (value.is_object() || value.is_array()))
        })
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    Value::Object(projected)
}

fn page_count(total: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    u32::try_from(total.div_ceil(u64::from(page_size))).unwrap_or(u32::MAX)
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn find_many(&self, content_type: &str, query: &Query) -> Result<Page, StrapiError> {
        let mut state = self.lock();
        state
            .list_calls
            .push((content_type.to_string(), query.clone()));
        if state.failing_lists.contains(content_type) {
            return Err(StrapiError::UnexpectedStatus {
                status: 500,
                url: format!("memory://{content_type}"),
                body: "injected failure".to_string(),
            });
        }

        let mut matching: Vec<&Map<String, Value>> = state
            .documents
            .get(content_type)
            .map(|docs| {
                docs.iter()
                    .filter(|d| {
                        query.locale.as_deref().is_none_or(|l| {
                            d.get("locale").and_then(Value::as_str) == Some(l)
                        })
                    })
                    .filter(|d| query.filters.iter().all(|f| matches_filter(d, f)))
                    .collect()
            })
            .unwrap_or_default();

        for sort in query.sort.iter().rev() {
            matching.sort_by(|a, b| {
                let ord = compare_values(a.get(&sort.field), b.get(&sort.field));
                match sort.order {
                    SortOrder::Asc => ord,
                    SortOrder::Desc => ord.reverse(),
                }
            });
        }

        let total = matching.len() as u64;
        let page = query.page.unwrap_or(1).max(1);
        let page_size = query.page_size.unwrap_or(25);
        let start = usize::try_from((page - 1) * page_size).unwrap_or(usize::MAX);
        let data = matching
            .into_iter()
            .skip(start)
            .take(usize::try_from(page_size).unwrap_or(usize::MAX))
            .map(|d| project(d, query))
            .collect();

        Ok(Page {
            data,
            pagination: Pagination {
                page,
                page_size,
                page_count: page_count(total, page_size),
                total,
            },
        })
    }

    async fn find_one(
        &self,
        content_type: &str,
        document_id: &str,
        query: &Query,
    ) -> Result<Option<Value>, StrapiError> {
        let state = self.lock();
        Ok(state.documents.get(content_type).and_then(|docs| {
            docs.iter()
                .find(|d| matches_document(d, document_id, query.locale.as_deref()))
                .map(|d| project(d, query))
        }))
    }

    async fn create(
        &self,
        content_type: &str,
        locale: Option<&str>,
        data: Value,
    ) -> Result<Value, StrapiError> {
        let mut state = self.lock();
        let Value::Object(mut doc) = data else {
            return Err(StrapiError::UnexpectedStatus {
                status: 400,
                url: format!("memory://{content_type}"),
                body: "data must be an object".to_string(),
            });
        };
        if let Some(id) = doc.get("documentId").and_then(Value::as_str) {
            if state.failing_writes.contains(id) {
                return Err(State::injected_failure(content_type, id));
            }
        }
        state.stamp(&mut doc, locale);
        let document_id = doc
            .get("documentId")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        state.writes.push(RecordedWrite {
            content_type: content_type.to_string(),
            document_id,
            locale: locale.map(str::to_string),
            data: Value::Object(doc.clone()),
        });
        state
            .documents
            .entry(content_type.to_string())
            .or_default()
            .push(doc.clone());
        Ok(Value::Object(doc))
    }

    async fn update(
        &self,
        content_type: &str,
        document_id: &str,
        locale: Option<&str>,
        data: Value,
    ) -> Result<Value, StrapiError> {
        let mut state = self.lock();
        if state.failing_writes.contains(document_id) {
            return Err(State::injected_failure(content_type, document_id));
        }
        let Value::Object(fields) = data.clone() else {
            return Err(StrapiError::UnexpectedStatus {
                status: 400,
                url: format!("memory://{content_type}/{document_id}"),
                body: "data must be an object".to_string(),
            });
        };

        let docs = state.documents.entry(content_type.to_string()).or_default();
        if !docs.iter().any(|d| matches_document(d, document_id, None)) {
            return Err(StrapiError::NotFound {
                content_type: content_type.to_string(),
                document_id: document_id.to_string(),
            });
        }

        let position = docs
            .iter()
            .position(|d| matches_document(d, document_id, locale));
        let updated = if let Some(index) = position {
            let existing = &mut docs[index];
            existing.extend(fields);
            existing.clone()
        } else {
            let mut variant = fields;
            variant.insert("documentId".to_string(), Value::from(document_id));
            state.stamp(&mut variant, locale);
            state
                .documents
                .entry(content_type.to_string())
                .or_default()
                .push(variant.clone());
            variant
        };

        state.writes.push(RecordedWrite {
            content_type: content_type.to_string(),
            document_id: document_id.to_string(),
            locale: locale.map(str::to_string),
            data,
        });
        Ok(Value::Object(updated))
    }

    async fn delete(&self, content_type: &str, document_id: &str) -> Result<(), StrapiError> {
        let mut state = self.lock();
        let docs = state.documents.entry(content_type.to_string()).or_default();
        let before = docs.len();
        docs.retain(|d| !matches_document(d, document_id, None));
        if docs.len() == before {
            return Err(StrapiError::NotFound {
                content_type: content_type.to_string(),
                document_id: document_id.to_string(),
            });
        }
        Ok(())
    }
}
