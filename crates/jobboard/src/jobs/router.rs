use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use serde_json::json;

use super::model::{JobDraft, JobUpdate};
use super::service::{ApplicationRequest, JobService, JobServiceError};
use crate::query::ParamMap;
use crate::store::DocumentStore;

/// Router builder exposing the job-posting HTTP surface.
pub fn job_router<S>(service: Arc<JobService<S>>) -> Router
where
    S: DocumentStore + 'static,
{
    Router::new()
        .route("/api/v1/jobs", get(list_handler::<S>))
        .route("/api/v1/job/new", post(create_handler::<S>))
        .route("/api/v1/job/:id/:slug", get(get_handler::<S>))
        .route(
            "/api/v1/job/:id",
            put(update_handler::<S>).delete(delete_handler::<S>),
        )
        .route("/api/v1/job/:id/apply", put(apply_handler::<S>))
        .route("/api/v1/stats/:topic", get(stats_handler::<S>))
        .with_state(service)
}

pub(crate) async fn list_handler<S>(
    State(service): State<Arc<JobService<S>>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Response
where
    S: DocumentStore + 'static,
{
    match service.list(ParamMap::from_pairs(pairs)).await {
        Ok(documents) => {
            let payload = json!({
                "success": true,
                "results": documents.len(),
                "data": documents,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn create_handler<S>(
    State(service): State<Arc<JobService<S>>>,
    axum::Json(draft): axum::Json<JobDraft>,
) -> Response
where
    S: DocumentStore + 'static,
{
    match service.create(draft).await {
        Ok(job) => {
            let payload = json!({
                "success": true,
                "message": "job created",
                "data": job,
            });
            (StatusCode::CREATED, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn get_handler<S>(
    State(service): State<Arc<JobService<S>>>,
    Path((id, slug)): Path<(String, String)>,
) -> Response
where
    S: DocumentStore + 'static,
{
    match service.get(&id, &slug).await {
        Ok(job) => success(job),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn update_handler<S>(
    State(service): State<Arc<JobService<S>>>,
    Path(id): Path<String>,
    axum::Json(update): axum::Json<JobUpdate>,
) -> Response
where
    S: DocumentStore + 'static,
{
    match service.update(&id, update).await {
        Ok(job) => success(job),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn delete_handler<S>(
    State(service): State<Arc<JobService<S>>>,
    Path(id): Path<String>,
) -> Response
where
    S: DocumentStore + 'static,
{
    match service.delete(&id).await {
        Ok(()) => {
            let payload = json!({
                "success": true,
                "message": "job deleted",
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn apply_handler<S>(
    State(service): State<Arc<JobService<S>>>,
    Path(id): Path<String>,
    axum::Json(request): axum::Json<ApplicationRequest>,
) -> Response
where
    S: DocumentStore + 'static,
{
    match service.apply(&id, request).await {
        Ok(job) => {
            let payload = json!({
                "success": true,
                "message": "applied to the job successfully",
                "data": { "applicants": job.applicants_applied.len() },
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn stats_handler<S>(
    State(service): State<Arc<JobService<S>>>,
    Path(topic): Path<String>,
) -> Response
where
    S: DocumentStore + 'static,
{
    match service.stats(&topic).await {
        Ok(Some(stats)) => success(stats),
        Ok(None) => {
            let payload = json!({
                "success": false,
                "message": format!("no stats found for - {topic}"),
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

fn success<T: serde::Serialize>(data: T) -> Response {
    let payload = json!({
        "success": true,
        "data": data,
    });
    (StatusCode::OK, axum::Json(payload)).into_response()
}

fn error_response(error: JobServiceError) -> Response {
    let status = match &error {
        JobServiceError::Query(_) | JobServiceError::Validation(_) => StatusCode::BAD_REQUEST,
        JobServiceError::NotFound => StatusCode::NOT_FOUND,
        JobServiceError::AlreadyApplied => StatusCode::CONFLICT,
        JobServiceError::ApplicationWindowClosed => StatusCode::UNPROCESSABLE_ENTITY,
        JobServiceError::Store(_) | JobServiceError::Corrupted(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let payload = json!({
        "success": false,
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::model::{Experience, Industry, JobType, MinEducation};
    use crate::jobs::service::JOBS_COLLECTION;
    use crate::store::InMemoryStore;
    use axum::body::Body;
    use axum::http::Request;
    use tower::util::ServiceExt;

    fn service_with_jobs() -> Arc<JobService<InMemoryStore>> {
        let store = InMemoryStore::new().with_text_index(JOBS_COLLECTION, ["title", "description"]);
        Arc::new(JobService::new(Arc::new(store), 100))
    }

    async fn seed(service: &JobService<InMemoryStore>, title: &str, salary: u64) {
        service
            .create(JobDraft {
                title: title.to_string(),
                description: format!("{title} position"),
                email: None,
                address: "1 Main St".to_string(),
                company: "Acme".to_string(),
                industry: vec![Industry::Banking],
                job_type: JobType::Permanent,
                min_education: MinEducation::Bachelors,
                positions: 1,
                experience: Experience::None,
                salary,
                posting_date: None,
                last_date: None,
            })
            .await
            .expect("seed job");
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn list_endpoint_returns_envelope_with_counts() {
        let service = service_with_jobs();
        seed(&service, "Analyst", 45000).await;
        seed(&service, "Auditor", 65000).await;

        let response = job_router(service)
            .oneshot(
                Request::builder()
                    .uri("/api/v1/jobs?salary%5Bgte%5D=50000")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["success"], serde_json::json!(true));
        assert_eq!(body["results"], serde_json::json!(1));
        assert_eq!(body["data"][0]["title"], serde_json::json!("Auditor"));
        assert!(body["data"][0].get("__v").is_none());
    }

    #[tokio::test]
    async fn malformed_filter_key_is_a_bad_request() {
        let service = service_with_jobs();
        let response = job_router(service)
            .oneshot(
                Request::builder()
                    .uri("/api/v1/jobs?%5Bgt%5D=5")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["success"], serde_json::json!(false));
    }

    #[tokio::test]
    async fn unknown_job_is_not_found() {
        let service = service_with_jobs();
        let response = job_router(service)
            .oneshot(
                Request::builder()
                    .uri("/api/v1/job/jobs-999999/some-slug")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn stats_endpoint_reports_missing_topic() {
        let service = service_with_jobs();
        let response = job_router(service)
            .oneshot(
                Request::builder()
                    .uri("/api/v1/stats/astronaut")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["success"], serde_json::json!(false));
    }
}
