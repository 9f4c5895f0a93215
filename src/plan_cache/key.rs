//! Plan cache keys
//!
//! A key is the encoded query shape plus the identity of the collection it
//! runs against. Two queries that differ only in literal values produce
//! equal keys.

use std::fmt;

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlanCacheKey {
    shape: String,
    namespace: String,
    collection_uuid: Option<Uuid>,
}

impl PlanCacheKey {
    pub fn new(shape: impl Into<String>, namespace: impl Into<String>, collection_uuid: Option<Uuid>) -> Self {
        Self {
            shape: shape.into(),
            namespace: namespace.into(),
            collection_uuid,
        }
    }

    /// Encoded filter, sort, projection and collation
    pub fn shape(&self) -> &str {
        &self.shape
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn collection_uuid(&self) -> Option<Uuid> {
        self.collection_uuid
    }

    /// Hash of the shape alone, shared by every collection.
    pub fn query_hash(&self) -> String {
        let mut hasher = Hasher::new();
        hasher.update(self.shape.as_bytes());
        format!("{:08X}", hasher.finalize())
    }

    /// Hash of the shape and the collection identity.
    pub fn plan_cache_key_hash(&self) -> String {
        let mut hasher = Hasher::new();
        hasher.update(self.shape.as_bytes());
        hasher.update(&[0]);
        hasher.update(self.namespace.as_bytes());
        if let Some(uuid) = self.collection_uuid {
            hasher.update(uuid.as_bytes());
        }
        format!("{:08X}", hasher.finalize())
    }
}

impl fmt::Display for PlanCacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.shape, self.namespace)?;
        if let Some(uuid) = self.collection_uuid {
            write!(f, "#{}", uuid)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hashes_are_eight_hex_digits() {
        let key = PlanCacheKey::new("{a: {$eq: ?num}}|sort:|proj:|coll:", "db.c", None);
        for hash in [key.query_hash(), key.plan_cache_key_hash()] {
            assert_eq!(hash.len(), 8);
            assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
        }
    }

    #[test]
    fn test_query_hash_ignores_collection() {
        let a = PlanCacheKey::new("s", "db.a", None);
        let b = PlanCacheKey::new("s", "db.b", Some(Uuid::new_v4()));
        assert_eq!(a.query_hash(), b.query_hash());
        assert_ne!(a.plan_cache_key_hash(), b.plan_cache_key_hash());
        assert_ne!(a, b);
    }

    #[test]
    fn test_display() {
        let key = PlanCacheKey::new("s", "db.c", None);
        assert_eq!(key.to_string(), "s@db.c");
    }
}
