//! The ordered, identity-unique record collection of one resource.

use crate::record::{self, Record};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::sync::{Arc, PoisonError, RwLock};

/// Total order over two records.
pub type Comparator = Arc<dyn Fn(&Record, &Record) -> Ordering + Send + Sync>;

/// Shared, replaceable comparator for one resource.
///
/// Cloning the handle shares the comparator, so a replacement made through
/// any clone applies to every later sort. Replacing it never re-sorts the
/// collection by itself.
#[derive(Clone)]
pub struct SortOrder {
    comparator: Arc<RwLock<Comparator>>,
}

impl SortOrder {
    /// Ascending order on the identity field.
    #[must_use]
    pub fn by_identity(id_field: &str) -> Self {
        let id_field = id_field.to_string();
        Self::from_fn(move |a, b| {
            let null = Value::Null;
            let left = record::identity(a, &id_field).unwrap_or(&null);
            let right = record::identity(b, &id_field).unwrap_or(&null);
            record::compare_values(left, right)
        })
    }

    /// Order defined by an arbitrary comparator.
    pub fn from_fn<F>(compare: F) -> Self
    where
        F: Fn(&Record, &Record) -> Ordering + Send + Sync + 'static,
    {
        Self {
            comparator: Arc::new(RwLock::new(Arc::new(compare))),
        }
    }

    /// Replace the comparator used by subsequent sorts.
    pub fn set<F>(&self, compare: F)
    where
        F: Fn(&Record, &Record) -> Ordering + Send + Sync + 'static,
    {
        let mut slot = self.comparator.write().unwrap_or_else(PoisonError::into_inner);
        *slot = Arc::new(compare);
    }

    /// The comparator currently in effect.
    #[must_use]
    pub fn current(&self) -> Comparator {
        Arc::clone(&self.comparator.read().unwrap_or_else(PoisonError::into_inner))
    }
}

impl std::fmt::Debug for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SortOrder").finish_non_exhaustive()
    }
}

/// Records of one resource, unique by identity and kept sorted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Collection {
    records: Vec<Record>,
}

impl Collection {
    /// An empty collection.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Records in their current order.
    #[must_use]
    pub fn as_slice(&self) -> &[Record] {
        &self.records
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the collection holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate records in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// The record whose identity equals `id`.
    #[must_use]
    pub fn find(&self, id_field: &str, id: &Value) -> Option<&Record> {
        self.records
            .iter()
            .find(|r| record::identity(r, id_field) == Some(id))
    }

    /// Upsert-merge a batch, then re-sort.
    ///
    /// Each incoming record is merged field by field into the record with the
    /// same identity, or appended when there is none. Records without an
    /// identity value cannot be addressed and are skipped; their count is
    /// returned.
    pub fn upsert(&mut self, incoming: Vec<Record>, id_field: &str, order: &SortOrder) -> usize {
        let mut skipped = 0;

        for record in incoming {
            let Some(id) = record::identity(&record, id_field).cloned() else {
                skipped += 1;
                continue;
            };

            match self
                .records
                .iter_mut()
                .find(|existing| record::identity(existing, id_field) == Some(&id))
            {
                Some(existing) => record::merge_into(existing, record),
                None => self.records.push(record),
            }
        }

        self.sort(order);
        skipped
    }

    /// Remove the record whose identity equals `id`, then re-sort the remainder.
    pub fn remove(&mut self, id_field: &str, id: &Value, order: &SortOrder) -> Option<Record> {
        let position = self
            .records
            .iter()
            .position(|r| record::identity(r, id_field) == Some(id))?;
        let removed = self.records.remove(position);
        self.sort(order);
        Some(removed)
    }

    /// Remove every record.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Stable sort with the comparator currently in effect.
    pub fn sort(&mut self, order: &SortOrder) {
        let compare = order.current();
        self.records.sort_by(|a, b| compare(a, b));
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rec(value: Value) -> Record {
        record::from_value(value).unwrap_or_default()
    }

    fn ids(collection: &Collection) -> Vec<Value> {
        collection.iter().map(|r| r["_id"].clone()).collect()
    }

    #[test]
    fn test_upsert_appends_and_sorts() {
        let order = SortOrder::by_identity("_id");
        let mut collection = Collection::new();

        let skipped = collection.upsert(
            vec![rec(json!({"_id": "b"})), rec(json!({"_id": "a"}))],
            "_id",
            &order,
        );

        assert_eq!(skipped, 0);
        assert_eq!(ids(&collection), vec![json!("a"), json!("b")]);
    }

    #[test]
    fn test_upsert_merges_existing() {
        let order = SortOrder::by_identity("_id");
        let mut collection = Collection::new();
        collection.upsert(vec![rec(json!({"_id": 1, "name": "X", "size": 3}))], "_id", &order);

        collection.upsert(vec![rec(json!({"_id": 1, "name": "Y"}))], "_id", &order);

        assert_eq!(collection.len(), 1);
        assert_eq!(
            Value::Object(collection.as_slice()[0].clone()),
            json!({"_id": 1, "name": "Y", "size": 3})
        );
    }

    #[test]
    fn test_upsert_skips_records_without_identity() {
        let order = SortOrder::by_identity("_id");
        let mut collection = Collection::new();

        let skipped = collection.upsert(
            vec![rec(json!({"name": "orphan"})), rec(json!({"_id": 2}))],
            "_id",
            &order,
        );

        assert_eq!(skipped, 1);
        assert_eq!(ids(&collection), vec![json!(2)]);
    }

    #[test]
    fn test_remove_keeps_others_sorted() {
        let order = SortOrder::by_identity("_id");
        let mut collection = Collection::new();
        collection.upsert(
            vec![rec(json!({"_id": 3})), rec(json!({"_id": 1})), rec(json!({"_id": 2}))],
            "_id",
            &order,
        );

        let removed = collection.remove("_id", &json!(2), &order);

        assert_eq!(removed.map(Value::Object), Some(json!({"_id": 2})));
        assert_eq!(ids(&collection), vec![json!(1), json!(3)]);
        assert!(collection.remove("_id", &json!(9), &order).is_none());
    }

    #[test]
    fn test_replaced_comparator_applies_on_next_sort_only() {
        let order = SortOrder::by_identity("_id");
        let mut collection = Collection::new();
        collection.upsert(vec![rec(json!({"_id": 1})), rec(json!({"_id": 2}))], "_id", &order);

        order.set(|a, b| record::compare_values(&b["_id"], &a["_id"]));
        assert_eq!(ids(&collection), vec![json!(1), json!(2)]);

        collection.upsert(vec![rec(json!({"_id": 3}))], "_id", &order);
        assert_eq!(ids(&collection), vec![json!(3), json!(2), json!(1)]);
    }

    #[test]
    fn test_custom_id_field() {
        let order = SortOrder::by_identity("slug");
        let mut collection = Collection::new();
        collection.upsert(
            vec![rec(json!({"slug": "zeta"})), rec(json!({"slug": "alpha"}))],
            "slug",
            &order,
        );

        assert!(collection.find("slug", &json!("zeta")).is_some());
        assert_eq!(collection.as_slice()[0]["slug"], json!("alpha"));
    }
}
