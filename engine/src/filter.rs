//! Filter predicate engine.
//!
//! A screen declares a closed set of named buckets plus the fields free-text
//! search looks at. [`filter`] combines the two: bucket predicate first, then
//! case-insensitive substring search over the searchable fields (any field
//! matching is enough). Input order is preserved and input is never mutated.

use crate::{BucketId, Record};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Id of the identity bucket every screen has.
pub const ALL_BUCKET: &str = "all";

type PredicateFn = dyn Fn(&Record) -> bool + Send + Sync;

/// A shareable record predicate.
#[derive(Clone)]
pub struct Predicate(Arc<PredicateFn>);

impl Predicate {
    /// Wrap an arbitrary closure.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Record) -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Always true.
    pub fn always() -> Self {
        Self::new(|_| true)
    }

    /// Attribute equals `value`. Strings compare case-insensitively.
    pub fn field_equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        let field = field.into();
        let value = value.into();
        Self::new(move |record| {
            record
                .get(&field)
                .is_some_and(|actual| values_equal(actual, &value))
        })
    }

    /// Attribute equals any of `values`.
    pub fn field_in<I, V>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let field = field.into();
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        Self::new(move |record| {
            record
                .get(&field)
                .is_some_and(|actual| values.iter().any(|v| values_equal(actual, v)))
        })
    }

    /// Attribute is `true`, a non-zero number, or a non-empty string.
    pub fn field_truthy(field: impl Into<String>) -> Self {
        let field = field.into();
        Self::new(move |record| match record.get(&field) {
            Some(Value::Bool(b)) => *b,
            Some(Value::Number(n)) => n.as_f64().is_some_and(|x| x != 0.0),
            Some(Value::String(s)) => !s.is_empty(),
            _ => false,
        })
    }

    /// Numeric attribute strictly greater than `threshold`.
    pub fn number_gt(field: impl Into<String>, threshold: f64) -> Self {
        let field = field.into();
        Self::new(move |record| record.number(&field).is_some_and(|x| x > threshold))
    }

    /// Numeric attribute at most `threshold`; a missing value counts as zero.
    pub fn number_le(field: impl Into<String>, threshold: f64) -> Self {
        let field = field.into();
        Self::new(move |record| record.number(&field).unwrap_or(0.0) <= threshold)
    }

    /// Negate a predicate.
    pub fn negate(self) -> Self {
        Self::new(move |record| !self.matches(record))
    }

    pub fn matches(&self, record: &Record) -> bool {
        (self.0)(record)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate(..)")
    }
}

fn values_equal(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::String(a), Value::String(b)) => a.eq_ignore_ascii_case(b),
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        (a, b) => a == b,
    }
}

/// A named, mutually exclusive record predicate.
#[derive(Debug, Clone)]
pub struct Bucket {
    pub id: BucketId,
    pub label: String,
    pub predicate: Predicate,
}

impl Bucket {
    pub fn new(id: impl Into<BucketId>, label: impl Into<String>, predicate: Predicate) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            predicate,
        }
    }
}

/// Bucket id and label, for rendering a bucket selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketInfo {
    pub id: BucketId,
    pub label: String,
}

/// Per-screen filter configuration.
#[derive(Debug, Clone)]
pub struct FilterConfig {
    buckets: Vec<Bucket>,
    searchable_fields: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self::new(Vec::<String>::new())
    }
}

impl FilterConfig {
    /// Create a configuration with only the `all` bucket.
    pub fn new<I, S>(searchable_fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            buckets: vec![Bucket::new(ALL_BUCKET, "All", Predicate::always())],
            searchable_fields: searchable_fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Builder-style method to add a bucket.
    ///
    /// Redefining `all` or an existing id is caught by [`FilterConfig::validate`].
    pub fn with_bucket(mut self, bucket: Bucket) -> Self {
        self.buckets.push(bucket);
        self
    }

    /// Check that bucket ids are unique and `all` is not redefined.
    pub fn validate(&self) -> crate::error::Result<()> {
        for (i, bucket) in self.buckets.iter().enumerate().skip(1) {
            if bucket.id == ALL_BUCKET {
                return Err(crate::Error::ReservedBucket(bucket.id.clone()));
            }
            if self.buckets[..i].iter().any(|b| b.id == bucket.id) {
                return Err(crate::Error::DuplicateBucket(bucket.id.clone()));
            }
        }
        Ok(())
    }

    pub fn searchable_fields(&self) -> &[String] {
        &self.searchable_fields
    }

    /// Buckets in declaration order, `all` first.
    pub fn buckets(&self) -> impl Iterator<Item = BucketInfo> + '_ {
        self.buckets.iter().map(|b| BucketInfo {
            id: b.id.clone(),
            label: b.label.clone(),
        })
    }

    pub fn contains_bucket(&self, id: &str) -> bool {
        self.bucket(id).is_some()
    }

    fn bucket(&self, id: &str) -> Option<&Bucket> {
        self.buckets.iter().find(|b| b.id == id)
    }

    /// Evaluate a bucket predicate. `None` for an unknown bucket.
    pub fn matches_bucket(&self, id: &str, record: &Record) -> Option<bool> {
        self.bucket(id).map(|b| b.predicate.matches(record))
    }

    /// Search predicate with an already normalized term. Empty terms pass.
    pub fn matches_search(&self, record: &Record, normalized_term: &str) -> bool {
        if normalized_term.is_empty() {
            return true;
        }
        self.searchable_fields.iter().any(|field| {
            record
                .text(field)
                .is_some_and(|text| text.to_lowercase().contains(normalized_term))
        })
    }
}

/// Trim and lowercase a search term.
pub fn normalize_term(term: &str) -> String {
    term.trim().to_lowercase()
}

/// Active bucket plus the applied search term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    pub bucket: BucketId,
    pub search_term: String,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            bucket: ALL_BUCKET.to_string(),
            search_term: String::new(),
        }
    }
}

/// Derive the visible subset of `records`.
///
/// Unknown buckets match nothing. The result keeps input order.
pub fn filter<'a, I>(
    records: I,
    bucket: &str,
    search_term: &str,
    config: &FilterConfig,
) -> Vec<&'a Record>
where
    I: IntoIterator<Item = &'a Record>,
{
    let Some(bucket) = config.bucket(bucket) else {
        return Vec::new();
    };
    let term = normalize_term(search_term);

    records
        .into_iter()
        .filter(|record| bucket.predicate.matches(record))
        .filter(|record| config.matches_search(record, &term))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn users() -> Vec<Record> {
        vec![
            Record::from_json(
                "u1",
                json!({"name": "Alice", "email": "alice@example.com", "status": "active"}),
            ),
            Record::from_json(
                "u2",
                json!({"name": "Bob", "email": "bob@example.com", "status": "inactive"}),
            ),
            Record::from_json("u3", json!({"name": "Malik", "status": "Active"})),
            Record::from_json("u4", json!({"email": null, "status": "active"})),
        ]
    }

    fn config() -> FilterConfig {
        FilterConfig::new(["name", "email"])
            .with_bucket(Bucket::new(
                "active",
                "Active",
                Predicate::field_equals("status", "active"),
            ))
            .with_bucket(Bucket::new(
                "inactive",
                "Inactive",
                Predicate::field_equals("status", "inactive"),
            ))
    }

    fn ids(records: &[&Record]) -> Vec<String> {
        records.iter().map(|r| r.id.clone()).collect()
    }

    #[test]
    fn all_and_empty_term_is_identity() {
        let records = users();
        let result = filter(&records, ALL_BUCKET, "", &config());
        assert_eq!(ids(&result), vec!["u1", "u2", "u3", "u4"]);
    }

    #[test]
    fn bucket_then_search() {
        let records = users();
        let active = filter(&records, "active", "", &config());
        assert_eq!(ids(&active), vec!["u1", "u3", "u4"]);

        let active_ali = filter(&records, "active", "ALI", &config());
        assert_eq!(ids(&active_ali), vec!["u1", "u3"]);
    }

    #[test]
    fn search_matches_any_configured_field() {
        let records = users();
        let result = filter(&records, ALL_BUCKET, "bob@", &config());
        assert_eq!(ids(&result), vec!["u2"]);
    }

    #[test]
    fn null_and_missing_fields_never_match() {
        let records = users();
        let result = filter(&records, ALL_BUCKET, "example", &config());
        assert_eq!(ids(&result), vec!["u1", "u2"]);
    }

    #[test]
    fn whitespace_term_is_empty() {
        let records = users();
        assert_eq!(filter(&records, ALL_BUCKET, "   ", &config()).len(), 4);
    }

    #[test]
    fn unknown_bucket_matches_nothing() {
        let records = users();
        assert!(filter(&records, "archived", "", &config()).is_empty());
    }

    #[test]
    fn empty_input_is_valid() {
        let records: Vec<Record> = Vec::new();
        assert!(filter(&records, ALL_BUCKET, "x", &config()).is_empty());
    }

    #[test]
    fn predicate_helpers() {
        let product = Record::from_json("p1", json!({"stock": 4, "featured": true, "tier": "B"}));

        assert!(Predicate::number_gt("stock", 0.0).matches(&product));
        assert!(!Predicate::number_le("stock", 0.0).matches(&product));
        assert!(Predicate::number_le("missing", 0.0).matches(&product));
        assert!(Predicate::field_truthy("featured").matches(&product));
        assert!(Predicate::field_in("tier", ["a", "b"]).matches(&product));
        assert!(Predicate::field_equals("stock", 4).matches(&product));
        assert!(!Predicate::field_equals("stock", 4).negate().matches(&product));
    }

    #[test]
    fn validate_rejects_reserved_and_duplicate_ids() {
        assert!(config().validate().is_ok());

        let redefined = config().with_bucket(Bucket::new(ALL_BUCKET, "All", Predicate::always()));
        assert!(matches!(
            redefined.validate(),
            Err(crate::Error::ReservedBucket(id)) if id == "all"
        ));

        let duplicate = config().with_bucket(Bucket::new("active", "Again", Predicate::always()));
        assert!(matches!(
            duplicate.validate(),
            Err(crate::Error::DuplicateBucket(id)) if id == "active"
        ));
    }

    #[test]
    fn bucket_listing_starts_with_all() {
        let listed: Vec<_> = config().buckets().map(|b| b.id).collect();
        assert_eq!(listed, vec!["all", "active", "inactive"]);
    }

    // Property-based tests using proptest
    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        fn arb_records() -> impl Strategy<Value = Vec<Record>> {
            proptest::collection::vec(
                ("[a-zA-Z ]{0,12}", prop_oneof![Just("active"), Just("inactive")]),
                0..40,
            )
            .prop_map(|rows| {
                rows.into_iter()
                    .enumerate()
                    .map(|(i, (name, status))| {
                        Record::from_json(format!("r{i}"), json!({"name": name, "status": status}))
                    })
                    .collect()
            })
        }

        proptest! {
            #[test]
            fn prop_all_bucket_empty_term_is_identity(records in arb_records()) {
                let result = filter(&records, ALL_BUCKET, "   ", &config());
                let expected: Vec<_> = records.iter().map(|r| r.id.clone()).collect();
                prop_assert_eq!(ids(&result), expected);
            }

            #[test]
            fn prop_status_buckets_partition(records in arb_records(), term in "[a-z]{0,2}") {
                let active = filter(&records, "active", &term, &config());
                let inactive = filter(&records, "inactive", &term, &config());
                let all = filter(&records, ALL_BUCKET, &term, &config());
                prop_assert_eq!(active.len() + inactive.len(), all.len());
            }

            #[test]
            fn prop_filter_keeps_order_and_is_deterministic(
                records in arb_records(),
                term in "[a-zA-Z]{0,3}",
            ) {
                let first = ids(&filter(&records, "active", &term, &config()));
                let second = ids(&filter(&records, "active", &term, &config()));
                prop_assert_eq!(&first, &second);

                let positions: Vec<usize> = first
                    .iter()
                    .filter_map(|id| records.iter().position(|r| &r.id == id))
                    .collect();
                prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));
            }
        }
    }
}
