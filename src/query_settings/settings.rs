use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value as Json};

/// One permitted index, by key pattern or by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AllowedIndex {
    KeyPattern(Map<String, Json>),
    Name(String),
}

impl AllowedIndex {
    pub fn to_json(&self) -> Json {
        match self {
            AllowedIndex::KeyPattern(pattern) => Json::Object(pattern.clone()),
            AllowedIndex::Name(name) => Json::String(name.clone()),
        }
    }
}

/// The filter stored for one query shape.
///
/// `query`, `sort`, `projection` and `collation` are the literal documents of
/// the most recent `set` for the shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllowedIndexEntry {
    pub query: Json,
    pub sort: Json,
    pub projection: Json,
    pub collation: Option<Json>,
    pub indexes: Vec<AllowedIndex>,
}

impl AllowedIndexEntry {
    /// Listing document: `query`, `sort`, `projection`, `indexes`, plus
    /// `collation` when one was supplied.
    pub fn to_json(&self) -> Json {
        let mut doc = json!({
            "query": self.query,
            "sort": self.sort,
            "projection": self.projection,
            "indexes": self.indexes.iter().map(AllowedIndex::to_json).collect::<Vec<_>>(),
        });
        if let (Some(collation), Some(obj)) = (&self.collation, doc.as_object_mut()) {
            obj.insert("collation".to_string(), collation.clone());
        }
        doc
    }
}

/// Thread-safe map from query shape to its index filter.
#[derive(Debug, Default)]
pub struct QuerySettings {
    filters: RwLock<BTreeMap<String, AllowedIndexEntry>>,
}

impl QuerySettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, shape: &str) -> Option<AllowedIndexEntry> {
        self.read().get(shape).cloned()
    }

    /// Install the filter for `shape`, replacing any previous one.
    pub fn set(&self, shape: impl Into<String>, entry: AllowedIndexEntry) {
        self.write().insert(shape.into(), entry);
    }

    /// Remove the filter for `shape`. Returns true if one existed.
    pub fn remove(&self, shape: &str) -> bool {
        self.write().remove(shape).is_some()
    }

    /// Remove every filter, returning the shapes that had one.
    pub fn clear_all(&self) -> Vec<String> {
        let mut filters = self.write();
        let shapes = filters.keys().cloned().collect();
        filters.clear();
        shapes
    }

    /// All filters, ordered by shape.
    pub fn list(&self) -> Vec<AllowedIndexEntry> {
        self.read().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<String, AllowedIndexEntry>> {
        self.filters.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<String, AllowedIndexEntry>> {
        self.filters.write().unwrap_or_else(PoisonError::into_inner)
    }
}
