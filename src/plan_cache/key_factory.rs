//! Key factory: canonical query + collection identity to cache key

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::key::PlanCacheKey;
use crate::query::CanonicalQuery;

/// The collection a query runs against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionInfo {
    pub namespace: String,
    pub uuid: Option<Uuid>,
}

impl CollectionInfo {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            uuid: None,
        }
    }

    pub fn with_uuid(mut self, uuid: Uuid) -> Self {
        self.uuid = Some(uuid);
        self
    }
}

/// Build the plan cache key for `query` on `collection`.
///
/// Pure: parameterized literals never reach the key, explicit collation
/// always does.
pub fn make(query: &CanonicalQuery, collection: &CollectionInfo) -> PlanCacheKey {
    PlanCacheKey::new(query.shape(), collection.namespace.clone(), collection.uuid)
}
