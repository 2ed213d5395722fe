use std::sync::Arc;

use super::model::User;
use crate::query::{ApiFilters, CollectionQuery, ParamMap, QueryError};
use crate::store::{from_document, to_document, Document, DocumentStore, StoreError};

/// Collection name for accounts.
pub const USERS_COLLECTION: &str = "users";

#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("user document corrupted: {0}")]
    Corrupted(#[from] serde_json::Error),
    #[error("user not found")]
    NotFound,
}

/// Directory operations over the `users` collection. The same staged filter
/// pipeline drives listings here as it does for jobs.
pub struct UserService<S> {
    store: Arc<S>,
    max_page_size: usize,
}

impl<S: DocumentStore> UserService<S> {
    pub fn new(store: Arc<S>, max_page_size: usize) -> Self {
        Self {
            store,
            max_page_size,
        }
    }

    pub async fn list(&self, params: ParamMap) -> Result<Vec<Document>, UserServiceError> {
        let query = ApiFilters::new(CollectionQuery::new(USERS_COLLECTION), params)
            .with_max_limit(self.max_page_size)
            .build()?;
        Ok(self.store.execute(&query)?)
    }

    pub async fn register(&self, user: User) -> Result<User, UserServiceError> {
        let stored = self.store.insert(USERS_COLLECTION, to_document(&user)?)?;
        Ok(from_document(stored)?)
    }

    pub async fn get(&self, id: &str) -> Result<User, UserServiceError> {
        let document = self
            .store
            .get(USERS_COLLECTION, id)?
            .ok_or(UserServiceError::NotFound)?;
        Ok(from_document(document)?)
    }

    pub async fn delete(&self, id: &str) -> Result<(), UserServiceError> {
        match self.store.remove(USERS_COLLECTION, id) {
            Err(StoreError::NotFound) => Err(UserServiceError::NotFound),
            other => Ok(other?),
        }
    }
}
