use crate::collection::CacheCollection;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// One cached record: a server row snapshot keyed by identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub id: String,
    pub collection: CacheCollection,
    pub data: serde_json::Value,
}

impl CacheEntry {
    /// Get a string field by JSON pointer.
    pub fn get_str(&self, pointer: &str) -> Option<&str> {
        self.data.pointer(pointer).and_then(|v| v.as_str())
    }

    /// Decode the snapshot into a typed record.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.data)
    }

    /// Render a primary key value as the string the cache keys on.
    ///
    /// Strings are used verbatim, integers in decimal. Anything else has no key.
    pub fn key_from_value(value: &serde_json::Value) -> Option<String> {
        match value {
            serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
            serde_json::Value::Number(n) if n.is_i64() || n.is_u64() => Some(n.to_string()),
            _ => None,
        }
    }
}
