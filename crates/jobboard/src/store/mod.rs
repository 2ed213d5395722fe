//! Document store abstraction and the in-memory implementation backing it.
//!
//! The store is an explicit dependency handed to services; nothing in the
//! crate reaches for an ambient connection.

mod matcher;
mod memory;

pub use memory::InMemoryStore;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::query::CollectionQuery;

/// Schemaless document: a JSON object keyed by field name.
pub type Document = Map<String, Value>;

/// Identifier field assigned by the store on insert.
pub const ID_FIELD: &str = "_id";

/// Version counter maintained by the store; excluded from responses by the
/// filter builder's default projection.
pub const VERSION_FIELD: &str = "__v";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("document not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Storage seam for collections of documents. Kept synchronous like the rest
/// of the repository traits; services expose async facades over it.
pub trait DocumentStore: Send + Sync {
    /// Insert a document, assigning `_id` and a zeroed `__v`. Returns the
    /// stored form.
    fn insert(&self, collection: &str, document: Document) -> Result<Document, StoreError>;

    /// Replace the document with the given id, preserving `_id` and bumping
    /// `__v`.
    fn replace(&self, collection: &str, id: &str, document: Document)
        -> Result<Document, StoreError>;

    fn remove(&self, collection: &str, id: &str) -> Result<(), StoreError>;

    fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    /// Materialize a staged query: predicate, text search, sort, window,
    /// projection, in that order.
    fn execute(&self, query: &CollectionQuery) -> Result<Vec<Document>, StoreError>;
}

/// Serialize a typed record into its stored document form.
pub fn to_document<T: Serialize>(value: &T) -> Result<Document, serde_json::Error> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(serde::ser::Error::custom(format!(
            "expected an object document, got {other}"
        ))),
    }
}

/// Deserialize a stored document back into a typed record.
pub fn from_document<T: DeserializeOwned>(document: Document) -> Result<T, serde_json::Error> {
    serde_json::from_value(Value::Object(document))
}
