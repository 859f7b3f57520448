//! Query and response types shared by every [`crate::ContentStore`] adapter.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Relation population directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Populate {
    /// Every first-level relation, component and media field (`populate=*`).
    All,
    /// One relation, optionally restricted to the listed fields, with its
    /// own nested relations.
    Relation {
        name: String,
        fields: Vec<String>,
        nested: Vec<Populate>,
    },
}

impl Populate {
    #[must_use]
    pub fn relation(name: &str, fields: &[&str]) -> Self {
        Populate::Relation {
            name: name.to_string(),
            fields: fields.iter().map(|f| (*f).to_string()).collect(),
            nested: Vec::new(),
        }
    }

    /// Adds a relation populated inside this one. No effect on
    /// [`Populate::All`].
    #[must_use]
    pub fn with(mut self, inner: Populate) -> Self {
        if let Populate::Relation { nested, .. } = &mut self {
            nested.push(inner);
        }
        self
    }

    /// Appends this directive's query pairs under `prefix` (`populate` at
    /// the top level).
    fn push_pairs(&self, prefix: &str, pairs: &mut Vec<(String, String)>) {
        match self {
            Populate::All => pairs.push((prefix.to_string(), "*".to_string())),
            Populate::Relation {
                name,
                fields,
                nested,
            } => {
                let base = format!("{prefix}[{name}]");
                if fields.is_empty() && nested.is_empty() {
                    pairs.push((base, "true".to_string()));
                    return;
                }
                for (i, field) in fields.iter().enumerate() {
                    pairs.push((format!("{base}[fields][{i}]"), field.clone()));
                }
                let nested_prefix = format!("{base}[populate]");
                for inner in nested {
                    inner.push_pairs(&nested_prefix, pairs);
                }
            }
        }
    }
}

/// Equality filter on a (possibly nested) attribute path, e.g.
/// `["user", "documentId"]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub path: Vec<String>,
    pub value: Value,
}

impl Filter {
    #[must_use]
    pub fn eq(path: &[&str], value: impl Into<Value>) -> Self {
        Self {
            path: path.iter().map(|p| (*p).to_string()).collect(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub field: String,
    pub order: SortOrder,
}

impl Sort {
    #[must_use]
    pub fn desc(field: &str) -> Self {
        Self {
            field: field.to_string(),
            order: SortOrder::Desc,
        }
    }
}

/// Parameters of a `find_many`/`find_one` call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub locale: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    /// Scalar fields to return; empty means all.
    pub fields: Vec<String>,
    pub populate: Vec<Populate>,
    pub filters: Vec<Filter>,
    pub sort: Vec<Sort>,
}

impl Query {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn locale(mut self, locale: &str) -> Self {
        self.locale = Some(locale.to_string());
        self
    }

    #[must_use]
    pub fn page(mut self, page: u32, page_size: u32) -> Self {
        self.page = Some(page);
        self.page_size = Some(page_size);
        self
    }

    #[must_use]
    pub fn fields(mut self, fields: &[&str]) -> Self {
        self.fields = fields.iter().map(|f| (*f).to_string()).collect();
        self
    }

    #[must_use]
    pub fn populate(mut self, populate: Populate) -> Self {
        self.populate.push(populate);
        self
    }

    #[must_use]
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    #[must_use]
    pub fn sort(mut self, sort: Sort) -> Self {
        self.sort.push(sort);
        self
    }

    /// Query-string pairs in the host's bracket notation, unencoded.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();

        if let Some(locale) = &self.locale {
            pairs.push(("locale".to_string(), locale.clone()));
        }
        if let Some(page) = self.page {
            pairs.push(("pagination[page]".to_string(), page.to_string()));
        }
        if let Some(page_size) = self.page_size {
            pairs.push(("pagination[pageSize]".to_string(), page_size.to_string()));
        }
        for (i, field) in self.fields.iter().enumerate() {
            pairs.push((format!("fields[{i}]"), field.clone()));
        }
        for populate in &self.populate {
            populate.push_pairs("populate", &mut pairs);
        }
        for filter in &self.filters {
            let path: String = filter.path.iter().map(|p| format!("[{p}]")).collect();
            let value = match &filter.value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            pairs.push((format!("filters{path}[$eq]"), value));
        }
        for (i, sort) in self.sort.iter().enumerate() {
            let order = match sort.order {
                SortOrder::Asc => "asc",
                SortOrder::Desc => "desc",
            };
            pairs.push((format!("sort[{i}]"), format!("{}:{order}", sort.field)));
        }

        pairs
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
    pub page_count: u32,
    pub total: u64,
}

/// One page of documents.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub data: Vec<Value>,
    pub pagination: Pagination,
}

/// `GET /api/<endpoint>` envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct ListResponse {
    pub data: Vec<Value>,
    #[serde(default)]
    pub meta: ListMeta,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListMeta {
    pub pagination: Option<Pagination>,
}

/// Single-document envelope used by find-one, create and update.
#[derive(Debug, Deserialize)]
pub(crate) struct DocumentResponse {
    pub data: Value,
}

impl ListResponse {
    /// Hosts may omit pagination metadata for unpaginated queries; such a
    /// response is treated as the only page.
    pub(crate) fn into_page(self, query: &Query) -> Page {
        let pagination = self.meta.pagination.unwrap_or_else(|| {
            let total = self.data.len() as u64;
            Pagination {
                page: query.page.unwrap_or(1),
                page_size: query
                    .page_size
                    .unwrap_or_else(|| u32::try_from(self.data.len()).unwrap_or(u32::MAX)),
                page_count: u32::from(total > 0),
                total,
            }
        });
        Page {
            data: self.data,
            pagination,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(query: &Query) -> Vec<(String, String)> {
        query.to_pairs()
    }

    fn pair(k: &str, v: &str) -> (String, String) {
        (k.to_string(), v.to_string())
    }

    #[test]
    fn source_listing_query_uses_bracket_notation() {
        let query = Query::new()
            .locale("de")
            .page(2, 50)
            .fields(&["name", "setNumber", "documentId"])
            .populate(Populate::relation("images", &["id"]));

        assert_eq!(
            pairs(&query),
            vec![
                pair("locale", "de"),
                pair("pagination[page]", "2"),
                pair("pagination[pageSize]", "50"),
                pair("fields[0]", "name"),
                pair("fields[1]", "setNumber"),
                pair("fields[2]", "documentId"),
                pair("populate[images][fields][0]", "id"),
            ]
        );
    }

    #[test]
    fn populate_all_and_bare_relation() {
        let query = Query::new()
            .populate(Populate::All)
            .populate(Populate::relation("user", &[]));
        assert_eq!(
            pairs(&query),
            vec![pair("populate", "*"), pair("populate[user]", "true")]
        );
    }

    #[test]
    fn nested_relation_populates_under_parent() {
        let query = Query::new().populate(
            Populate::relation("set", &["documentId", "name"])
                .with(Populate::relation("images", &["url", "formats"])),
        );
        assert_eq!(
            pairs(&query),
            vec![
                pair("populate[set][fields][0]", "documentId"),
                pair("populate[set][fields][1]", "name"),
                pair("populate[set][populate][images][fields][0]", "url"),
                pair("populate[set][populate][images][fields][1]", "formats"),
            ]
        );
    }

    #[test]
    fn filters_and_sort() {
        let query = Query::new()
            .filter(Filter::eq(&["user", "documentId"], "u-1"))
            .filter(Filter::eq(&["pieces"], 850))
            .sort(Sort::desc("createdAt"));
        assert_eq!(
            pairs(&query),
            vec![
                pair("filters[user][documentId][$eq]", "u-1"),
                pair("filters[pieces][$eq]", "850"),
                pair("sort[0]", "createdAt:desc"),
            ]
        );
    }

    #[test]
    fn list_response_without_meta_is_single_page() {
        let response: ListResponse =
            serde_json::from_value(serde_json::json!({"data": [{"id": 1}, {"id": 2}]})).unwrap();
        let page = response.into_page(&Query::new());
        assert_eq!(page.pagination.page_count, 1);
        assert_eq!(page.pagination.total, 2);
    }

    #[test]
    fn pagination_reads_camel_case() {
        let response: ListResponse = serde_json::from_value(serde_json::json!({
            "data": [],
            "meta": {"pagination": {"page": 1, "pageSize": 50, "pageCount": 0, "total": 0}}
        }))
        .unwrap();
        let page = response.into_page(&Query::new());
        assert_eq!(
            page.pagination,
            Pagination {
                page: 1,
                page_size: 50,
                page_count: 0,
                total: 0
            }
        );
    }
}
