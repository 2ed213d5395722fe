use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use serde_json::Value;

use super::matcher;
use super::{Document, DocumentStore, StoreError, ID_FIELD, VERSION_FIELD};
use crate::query::CollectionQuery;

/// Process-local document store. Collections spring into existence on first
/// insert; queries against unknown collections yield no documents.
#[derive(Default)]
pub struct InMemoryStore {
    collections: Mutex<HashMap<String, Vec<Document>>>,
    text_indexes: HashMap<String, Vec<String>>,
    sequence: AtomicU64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the fields participating in free-text search for a
    /// collection. Phrase queries against collections without an index
    /// match nothing.
    pub fn with_text_index<I, F>(mut self, collection: &str, fields: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<String>,
    {
        self.text_indexes.insert(
            collection.to_string(),
            fields.into_iter().map(Into::into).collect(),
        );
        self
    }

    fn next_id(&self, collection: &str) -> String {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{collection}-{sequence:06}")
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Vec<Document>>>, StoreError> {
        self.collections
            .lock()
            .map_err(|_| StoreError::Unavailable("store mutex poisoned".to_string()))
    }
}

impl DocumentStore for InMemoryStore {
    fn insert(&self, collection: &str, mut document: Document) -> Result<Document, StoreError> {
        document.insert(ID_FIELD.to_string(), Value::String(self.next_id(collection)));
        document.insert(VERSION_FIELD.to_string(), Value::from(0));

        let mut collections = self.lock()?;
        collections
            .entry(collection.to_string())
            .or_default()
            .push(document.clone());
        Ok(document)
    }

    fn replace(
        &self,
        collection: &str,
        id: &str,
        mut document: Document,
    ) -> Result<Document, StoreError> {
        let mut collections = self.lock()?;
        let documents = collections
            .get_mut(collection)
            .ok_or(StoreError::NotFound)?;
        let slot = documents
            .iter_mut()
            .find(|existing| document_id(existing) == Some(id))
            .ok_or(StoreError::NotFound)?;

        let version = slot
            .get(VERSION_FIELD)
            .and_then(Value::as_u64)
            .unwrap_or(0);
        document.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
        document.insert(VERSION_FIELD.to_string(), Value::from(version + 1));
        *slot = document.clone();
        Ok(document)
    }

    fn remove(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let mut collections = self.lock()?;
        let documents = collections
            .get_mut(collection)
            .ok_or(StoreError::NotFound)?;
        let before = documents.len();
        documents.retain(|existing| document_id(existing) != Some(id));
        if documents.len() == before {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let collections = self.lock()?;
        Ok(collections.get(collection).and_then(|documents| {
            documents
                .iter()
                .find(|existing| document_id(existing) == Some(id))
                .cloned()
        }))
    }

    fn execute(&self, query: &CollectionQuery) -> Result<Vec<Document>, StoreError> {
        let collections = self.lock()?;
        let documents = collections
            .get(query.collection())
            .map(Vec::as_slice)
            .unwrap_or_default();
        let text_fields = self.text_indexes.get(query.collection());

        let mut selected: Vec<Document> = documents
            .iter()
            .filter(|document| matcher::matches(document, query.predicate()))
            .filter(|document| match query.search() {
                Some(search) => text_fields.is_some_and(|fields| {
                    matcher::text_matches(document, fields, &search.phrase)
                }),
                None => true,
            })
            .cloned()
            .collect();
        drop(collections);

        matcher::sort_documents(&mut selected, query.sort_keys());

        let windowed = selected
            .into_iter()
            .skip(query.skip())
            .take(query.limit().unwrap_or(usize::MAX));

        Ok(windowed
            .map(|document| matcher::project(document, query.projection()))
            .collect())
    }
}

fn document_id(document: &Document) -> Option<&str> {
    document.get(ID_FIELD).and_then(Value::as_str)
}
