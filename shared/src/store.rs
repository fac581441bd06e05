use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// A stored record, as a JSON object.
pub type Item = Map<String, Value>;

/// Partition key attribute shared by the tables and reservations collections.
pub const KEY_ATTRIBUTE: &str = "id";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("item store request failed: {0}")]
    Request(String),
    #[error("stored item could not be decoded: {0}")]
    Decode(String),
}

/// Flatten a typed record into the JSON object that gets stored.
pub fn record_to_item<T: Serialize>(record: &T) -> Result<Item, serde_json::Error> {
    match serde_json::to_value(record)? {
        Value::Object(map) => Ok(map),
        _ => Err(serde::ser::Error::custom("record must serialize to a JSON object")),
    }
}

/// Key-value persistence, one named collection per entity.
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Unconditional upsert keyed by the item's [`KEY_ATTRIBUTE`].
    async fn put(&self, collection: &str, item: Item) -> Result<(), StoreError>;

    async fn get(&self, collection: &str, key: &Value) -> Result<Option<Item>, StoreError>;

    /// Every item in the collection, in no particular order.
    async fn scan_all(&self, collection: &str) -> Result<Vec<Item>, StoreError>;
}
