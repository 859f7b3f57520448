//! Weighted completeness scoring of set entries.

use std::time::Duration;

use cobipedia_strapi::{ContentStore, Populate, Query};
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::error::PipelineError;
use crate::fetcher::fetch_all_documents;

/// Collection the report scores.
pub const QUALITY_ENDPOINT: &str = "sets";
pub const QUALITY_PAGE_SIZE: u32 = 100;
/// Lowest-scoring sets listed in the text report.
pub const WORST_SETS_SHOWN: usize = 15;

/// How a field counts as filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
    /// Not null, not absent, not the empty string.
    Present,
    NonEmptyArray,
    /// A populated relation object carrying an `id`.
    RelationWithId,
}

impl FieldRule {
    fn is_satisfied(self, value: Option<&Value>) -> bool {
        match (self, value) {
            (_, None | Some(Value::Null)) => false,
            (FieldRule::Present, Some(Value::String(s))) => !s.is_empty(),
            (FieldRule::Present, Some(_)) => true,
            (FieldRule::NonEmptyArray, Some(Value::Array(items))) => !items.is_empty(),
            (FieldRule::RelationWithId, Some(Value::Object(map))) => {
                map.get("id").is_some_and(id_is_truthy)
            }
            _ => false,
        }
    }
}

fn id_is_truthy(id: &Value) -> bool {
    match id {
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Bool(b) => *b,
        Value::Null => false,
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[derive(Debug, Clone, Copy)]
pub struct QualityField {
    pub key: &'static str,
    pub label: &'static str,
    pub weight: u32,
    pub rule: FieldRule,
}

const fn field(key: &'static str, label: &'static str, weight: u32, rule: FieldRule) -> QualityField {
    QualityField {
        key,
        label,
        weight,
        rule,
    }
}

/// Checked fields, in report order.
pub const QUALITY_FIELDS: &[QualityField] = &[
    field("name", "Name", 10, FieldRule::Present),
    field("description", "Description", 8, FieldRule::Present),
    field("subtitle", "Subtitle", 3, FieldRule::Present),
    field("metaDescription", "Meta description", 7, FieldRule::Present),
    field("images", "Images", 10, FieldRule::NonEmptyArray),
    field("pieces", "Pieces", 8, FieldRule::Present),
    field("scale", "Scale", 5, FieldRule::Present),
    field("year", "Year", 5, FieldRule::Present),
    field("msrp", "MSRP", 4, FieldRule::Present),
    field("category", "Category", 9, FieldRule::RelationWithId),
    field("affiliateLinks", "Affiliate links", 7, FieldRule::NonEmptyArray),
    field("historicalContext", "Historical context", 5, FieldRule::RelationWithId),
    field("length", "Dimensions", 3, FieldRule::Present),
    field("weight", "Weight", 2, FieldRule::Present),
    field("ean", "EAN", 2, FieldRule::Present),
    field("minifigures", "Minifigures", 3, FieldRule::Present),
];

/// Serializes `(key, value)` pairs as a JSON object, keeping their order.
fn ordered_map<V, S>(entries: &[(&'static str, V)], serializer: S) -> Result<S::Ok, S::Error>
where
    V: Serialize,
    S: Serializer,
{
    serializer.collect_map(entries.iter().map(|(k, v)| (k, v)))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetScore {
    pub set_number: String,
    pub name: String,
    /// 0 to 100.
    pub score: u32,
    /// Labels of unfilled fields, in report order.
    pub missing: Vec<&'static str>,
    #[serde(serialize_with = "ordered_map")]
    pub results: Vec<(&'static str, bool)>,
}

impl SetScore {
    fn is_filled(&self, key: &str) -> bool {
        self.results.iter().any(|(k, filled)| *k == key && *filled)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldStat {
    pub label: &'static str,
    pub filled: usize,
    pub missing: usize,
    pub percent: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityReport {
    pub total_sets: usize,
    pub average_score: u32,
    #[serde(serialize_with = "ordered_map")]
    pub field_stats: Vec<(&'static str, FieldStat)>,
    /// Ascending by score.
    pub sets: Vec<SetScore>,
}

impl QualityReport {
    /// Number of sets scoring 100.
    #[must_use]
    pub fn perfect_count(&self) -> usize {
        self.sets.iter().filter(|s| s.score == 100).count()
    }

    #[must_use]
    pub fn worst(&self) -> &[SetScore] {
        &self.sets[..self.sets.len().min(WORST_SETS_SHOWN)]
    }
}

/// `round(100 * part / whole)` with halves rounded up; 0 when `whole` is 0.
fn rounded_percent(part: u64, whole: u64) -> u32 {
    if whole == 0 {
        return 0;
    }
    u32::try_from((200 * part + whole) / (2 * whole)).unwrap_or(u32::MAX)
}

fn text_of(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Scores one set document against [`QUALITY_FIELDS`].
#[must_use]
pub fn score_set(document: &Value) -> SetScore {
    let mut earned = 0u64;
    let mut total = 0u64;
    let mut missing = Vec::new();
    let mut results = Vec::with_capacity(QUALITY_FIELDS.len());

    for field in QUALITY_FIELDS {
        total += u64::from(field.weight);
        let filled = field.rule.is_satisfied(document.get(field.key));
        if filled {
            earned += u64::from(field.weight);
        } else {
            missing.push(field.label);
        }
        results.push((field.key, filled));
    }

    SetScore {
        set_number: text_of(document.get("setNumber")),
        name: text_of(document.get("name")),
        score: rounded_percent(earned, total),
        missing,
        results,
    }
}

/// Scores every document and aggregates per-field statistics.
#[must_use]
pub fn build_report(documents: &[Value]) -> QualityReport {
    let mut sets: Vec<SetScore> = documents.iter().map(score_set).collect();
    sets.sort_by_key(|s| s.score);

    let total_sets = sets.len();
    let count = total_sets as u64;
    let score_sum: u64 = sets.iter().map(|s| u64::from(s.score)).sum();
    let average_score = rounded_percent(score_sum, count * 100);

    let field_stats = QUALITY_FIELDS
        .iter()
        .map(|field| {
            let filled = sets.iter().filter(|s| s.is_filled(field.key)).count();
            (
                field.key,
                FieldStat {
                    label: field.label,
                    filled,
                    missing: total_sets - filled,
                    percent: rounded_percent(filled as u64, count),
                },
            )
        })
        .collect();

    QualityReport {
        total_sets,
        average_score,
        field_stats,
        sets,
    }
}

/// Fetches every set in `locale` with all relations populated.
///
/// # Errors
///
/// Returns [`PipelineError::Fetch`] if any page fails.
pub async fn fetch_quality_sets(
    store: &dyn ContentStore,
    locale: &str,
    delay: Duration,
) -> Result<Vec<Value>, PipelineError> {
    let query = Query::new().locale(locale).populate(Populate::All);
    fetch_all_documents(store, QUALITY_ENDPOINT, &query, QUALITY_PAGE_SIZE, delay).await
}
