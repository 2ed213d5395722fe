use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::model::{Applicant, Job, JobDraft, JobUpdate, JobValidationError};
use crate::query::{ApiFilters, CollectionQuery, ParamMap, QueryError};
use crate::store::{from_document, to_document, Document, DocumentStore, StoreError};

/// Collection name for job postings.
pub const JOBS_COLLECTION: &str = "jobs";

#[derive(Debug, thiserror::Error)]
pub enum JobServiceError {
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error(transparent)]
    Validation(#[from] JobValidationError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("job document corrupted: {0}")]
    Corrupted(#[from] serde_json::Error),
    #[error("job not found")]
    NotFound,
    #[error("the application window for this job has closed")]
    ApplicationWindowClosed,
    #[error("you have already applied to this job")]
    AlreadyApplied,
}

/// Inbound application payload; résumé handling lives with the upload
/// service, not here.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRequest {
    pub name: String,
    pub email: String,
}

/// Aggregate figures for postings matching a topic phrase.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStats {
    pub total_jobs: usize,
    pub avg_salary: f64,
    pub min_salary: u64,
    pub max_salary: u64,
    pub total_positions: u64,
}

/// Job posting operations over an injected document store.
pub struct JobService<S> {
    store: Arc<S>,
    max_page_size: usize,
}

impl<S: DocumentStore> JobService<S> {
    pub fn new(store: Arc<S>, max_page_size: usize) -> Self {
        Self {
            store,
            max_page_size,
        }
    }

    /// Filtered listing: the request's parameter map drives the whole
    /// staged pipeline against the `jobs` collection.
    pub async fn list(&self, params: ParamMap) -> Result<Vec<Document>, JobServiceError> {
        let query = ApiFilters::new(CollectionQuery::new(JOBS_COLLECTION), params)
            .with_max_limit(self.max_page_size)
            .build()?;
        Ok(self.store.execute(&query)?)
    }

    pub async fn create(&self, draft: JobDraft) -> Result<Job, JobServiceError> {
        let job = draft.into_job(Utc::now());
        job.validate()?;

        let stored = self.store.insert(JOBS_COLLECTION, to_document(&job)?)?;
        let job: Job = from_document(stored)?;
        info!(slug = %job.slug, "job posting created");
        Ok(job)
    }

    /// Fetch one posting by id; the slug must match so stale links 404
    /// rather than serving a renamed posting.
    pub async fn get(&self, id: &str, slug: &str) -> Result<Job, JobServiceError> {
        let job = self.fetch(id).await?;
        if job.slug != slug {
            return Err(JobServiceError::NotFound);
        }
        Ok(job)
    }

    pub async fn update(&self, id: &str, update: JobUpdate) -> Result<Job, JobServiceError> {
        let mut job = self.fetch(id).await?;
        update.apply_to(&mut job);
        job.validate()?;

        let stored = self.store.replace(JOBS_COLLECTION, id, to_document(&job)?)?;
        Ok(from_document(stored)?)
    }

    pub async fn delete(&self, id: &str) -> Result<(), JobServiceError> {
        match self.store.remove(JOBS_COLLECTION, id) {
            Err(StoreError::NotFound) => Err(JobServiceError::NotFound),
            other => Ok(other?),
        }
    }

    /// Record an application. Rejected once `lastDate` has passed or when
    /// the same email already applied.
    pub async fn apply(
        &self,
        id: &str,
        request: ApplicationRequest,
    ) -> Result<Job, JobServiceError> {
        self.apply_at(id, request, Utc::now()).await
    }

    pub(crate) async fn apply_at(
        &self,
        id: &str,
        request: ApplicationRequest,
        now: DateTime<Utc>,
    ) -> Result<Job, JobServiceError> {
        let mut job = self.fetch(id).await?;
        if now > job.last_date {
            return Err(JobServiceError::ApplicationWindowClosed);
        }
        if job
            .applicants_applied
            .iter()
            .any(|applicant| applicant.email.eq_ignore_ascii_case(&request.email))
        {
            return Err(JobServiceError::AlreadyApplied);
        }

        job.applicants_applied.push(Applicant {
            name: request.name,
            email: request.email,
            applied_at: now,
        });

        let stored = self.store.replace(JOBS_COLLECTION, id, to_document(&job)?)?;
        Ok(from_document(stored)?)
    }

    /// Aggregate postings whose indexed text matches the topic phrase
    /// (hyphens in the path segment become spaces). `None` when nothing
    /// matches.
    pub async fn stats(&self, topic: &str) -> Result<Option<JobStats>, JobServiceError> {
        let phrase = topic.replace('-', " ");
        let query = CollectionQuery::new(JOBS_COLLECTION).search_phrase(phrase);
        let documents = self.store.execute(&query)?;
        if documents.is_empty() {
            return Ok(None);
        }

        let mut total_salary = 0u64;
        let mut min_salary = u64::MAX;
        let mut max_salary = 0u64;
        let mut total_positions = 0u64;
        for document in &documents {
            let salary = document
                .get("salary")
                .and_then(serde_json::Value::as_u64)
                .unwrap_or(0);
            total_salary += salary;
            min_salary = min_salary.min(salary);
            max_salary = max_salary.max(salary);
            total_positions += document
                .get("positions")
                .and_then(serde_json::Value::as_u64)
                .unwrap_or(0);
        }

        Ok(Some(JobStats {
            total_jobs: documents.len(),
            avg_salary: total_salary as f64 / documents.len() as f64,
            min_salary,
            max_salary,
            total_positions,
        }))
    }

    async fn fetch(&self, id: &str) -> Result<Job, JobServiceError> {
        let document = self
            .store
            .get(JOBS_COLLECTION, id)?
            .ok_or(JobServiceError::NotFound)?;
        Ok(from_document(document)?)
    }
}
