//! Prediction records and per-model result sets.
//!
//! A [`PredictionRecord`] is one classification outcome: which span of which
//! policy was classified, its human-assigned (gold) label and the model's
//! output. Only the four identity fields are interpreted; everything else a
//! record carries is kept verbatim in [`PredictionRecord::extra`] and written
//! back out unchanged.
//!
//! Identity fields are not type-checked. A numeric `pred` or a float
//! `policy_id` is kept as the JSON value it was read as and compared by that
//! value, so `1` and `"1"` stay distinct.
//!
//! ```rust
//! use c3pa_core::{PolicyId, PredictionRecord, ResultSet};
//!
//! let json = r#"{"m1": [{"policy_id": "p1", "span": "s1", "gold": "X", "pred": "X", "latency_ms": 12}]}"#;
//! let set: ResultSet = serde_json::from_str(json).unwrap();
//! let record = &set.get("m1").unwrap()[0];
//! assert_eq!(record.policy_id, Some(PolicyId::from("p1")));
//! assert_eq!(record.extra["latency_ms"], 12);
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A JSON value compared by its compact serialization.
///
/// Used for identity fields holding something other than the expected type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OpaqueValue(pub Value);

impl OpaqueValue {
    fn canonical(&self) -> String {
        self.0.to_string()
    }
}

impl PartialEq for OpaqueValue {
    fn eq(&self, other: &Self) -> bool {
        self.canonical() == other.canonical()
    }
}

impl Eq for OpaqueValue {}

impl Hash for OpaqueValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical().hash(state);
    }
}

impl PartialOrd for OpaqueValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpaqueValue {
    fn cmp(&self, other: &Self) -> Ordering {
        self.canonical().cmp(&other.canonical())
    }
}

impl fmt::Display for OpaqueValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a source policy document.
///
/// Policy ids show up both as strings and as integers in result files. They
/// are compared by natural identity, so `1` and `"1"` are different ids.
/// Anything else (floats, integers beyond `i64`, booleans) is kept as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PolicyId {
    /// Integer id.
    Int(i64),
    /// String id (usually the policy's file stem).
    Text(String),
    /// Any other JSON value.
    Other(OpaqueValue),
}

impl fmt::Display for PolicyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyId::Int(id) => write!(f, "{}", id),
            PolicyId::Text(id) => f.write_str(id),
            PolicyId::Other(value) => fmt::Display::fmt(value, f),
        }
    }
}

impl From<&str> for PolicyId {
    fn from(id: &str) -> Self {
        PolicyId::Text(id.to_string())
    }
}

impl From<String> for PolicyId {
    fn from(id: String) -> Self {
        PolicyId::Text(id)
    }
}

impl From<i64> for PolicyId {
    fn from(id: i64) -> Self {
        PolicyId::Int(id)
    }
}

/// Value of a span or label field: normally a string, otherwise the raw JSON.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// String value.
    Text(String),
    /// Any other JSON value.
    Other(OpaqueValue),
}

impl FieldValue {
    /// The string, if this is one.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::Other(_) => None,
        }
    }

    /// The string, or the JSON text of a non-string value.
    #[must_use]
    pub fn text(&self) -> Cow<'_, str> {
        match self {
            FieldValue::Text(s) => Cow::Borrowed(s),
            FieldValue::Other(value) => Cow::Owned(value.to_string()),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => FieldValue::Text(s),
            other => FieldValue::Other(OpaqueValue(other)),
        }
    }
}

/// One classification outcome produced by a model.
///
/// A JSON `null` and an absent field both read as `None`, and `None` fields
/// are omitted when the record is written back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    /// Source document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_id: Option<PolicyId>,
    /// Exact text passed to the classifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<FieldValue>,
    /// Human-assigned label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gold: Option<FieldValue>,
    /// Model output, free-form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pred: Option<FieldValue>,
    /// Every other field, in input order.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PredictionRecord {
    /// Create a record with all four identity fields set.
    pub fn new(
        policy_id: impl Into<PolicyId>,
        span: impl Into<FieldValue>,
        gold: impl Into<FieldValue>,
        pred: impl Into<FieldValue>,
    ) -> Self {
        Self {
            policy_id: Some(policy_id.into()),
            span: Some(span.into()),
            gold: Some(gold.into()),
            pred: Some(pred.into()),
            extra: Map::new(),
        }
    }

    /// Attach a passthrough field.
    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// The deduplication key `(policy_id, span, gold, pred)`.
    #[must_use]
    pub fn identity_key(&self) -> IdentityKey {
        IdentityKey {
            policy_id: self.policy_id.clone(),
            span: self.span.clone(),
            gold: self.gold.clone(),
            pred: self.pred.clone(),
        }
    }

    /// Span text for similarity: a missing span reads as the empty string,
    /// a non-string span as its JSON text.
    #[must_use]
    pub fn span_text(&self) -> Cow<'_, str> {
        self.span.as_ref().map_or(Cow::Borrowed(""), FieldValue::text)
    }

    /// The span, if it is a string.
    #[must_use]
    pub fn span_str(&self) -> Option<&str> {
        self.span.as_ref().and_then(FieldValue::as_str)
    }

    /// The gold label, if it is a string.
    #[must_use]
    pub fn gold_str(&self) -> Option<&str> {
        self.gold.as_ref().and_then(FieldValue::as_str)
    }

    /// The predicted label, if it is a string.
    #[must_use]
    pub fn pred_str(&self) -> Option<&str> {
        self.pred.as_ref().and_then(FieldValue::as_str)
    }
}

/// Identity of an observation: two records with equal keys are the same
/// observation no matter what else they carry.
///
/// `None` is a concrete value here, not a wildcard.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityKey {
    /// Source document.
    pub policy_id: Option<PolicyId>,
    /// Span.
    pub span: Option<FieldValue>,
    /// Gold label.
    pub gold: Option<FieldValue>,
    /// Predicted label.
    pub pred: Option<FieldValue>,
}

/// Records per model, keyed by model id.
///
/// Model order is first-insertion order and record order within a model is
/// significant (it is the order the model produced them in).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultSet(IndexMap<String, Vec<PredictionRecord>>);

impl ResultSet {
    /// Create an empty result set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records for `model_id`, if present.
    #[must_use]
    pub fn get(&self, model_id: &str) -> Option<&[PredictionRecord]> {
        self.0.get(model_id).map(Vec::as_slice)
    }

    /// Replace the records for `model_id`, keeping its position if it exists.
    pub fn insert(&mut self, model_id: impl Into<String>, records: Vec<PredictionRecord>) {
        self.0.insert(model_id.into(), records);
    }

    /// Mutable record list for `model_id`, creating an empty one at the end.
    pub fn records_mut(&mut self, model_id: impl Into<String>) -> &mut Vec<PredictionRecord> {
        self.0.entry(model_id.into()).or_default()
    }

    /// Whether `model_id` is present.
    #[must_use]
    pub fn contains_model(&self, model_id: &str) -> bool {
        self.0.contains_key(model_id)
    }

    /// Model ids in order.
    pub fn model_ids(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// The first model and its records.
    #[must_use]
    pub fn first(&self) -> Option<(&str, &[PredictionRecord])> {
        self.0
            .first()
            .map(|(id, records)| (id.as_str(), records.as_slice()))
    }

    /// `(model_id, records)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[PredictionRecord])> {
        self.0
            .iter()
            .map(|(id, records)| (id.as_str(), records.as_slice()))
    }

    /// Number of models.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no models.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total number of records across all models.
    #[must_use]
    pub fn total_records(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }
}

impl IntoIterator for ResultSet {
    type Item = (String, Vec<PredictionRecord>);
    type IntoIter = indexmap::map::IntoIter<String, Vec<PredictionRecord>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl FromIterator<(String, Vec<PredictionRecord>)> for ResultSet {
    fn from_iter<T: IntoIterator<Item = (String, Vec<PredictionRecord>)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
