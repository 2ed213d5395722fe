use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde_json::json;
use std::sync::Arc;

use jobboard::jobs::{job_router, JobService};
use jobboard::store::DocumentStore;
use jobboard::users::{user_router, UserService};

/// Combine the domain routers with the service endpoints.
pub(crate) fn with_api_routes<S>(
    jobs: Arc<JobService<S>>,
    users: Arc<UserService<S>>,
) -> axum::Router
where
    S: DocumentStore + 'static,
{
    job_router(jobs)
        .merge(user_router(users))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{build_store, seed_demo_data};
    use axum::body::Body;
    use axum::http::Request;
    use tower::util::ServiceExt;

    #[tokio::test]
    async fn healthcheck_reports_ok() {
        let Json(body) = healthcheck().await;
        assert_eq!(body, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn seeded_listing_serves_filtered_jobs() {
        let store = Arc::new(build_store());
        let jobs = Arc::new(JobService::new(store.clone(), 100));
        let users = Arc::new(UserService::new(store, 100));
        seed_demo_data(&jobs, &users).await.expect("seed");

        let response = with_api_routes(jobs, users)
            .oneshot(
                Request::builder()
                    .uri("/api/v1/jobs?q=software-engineer&sort=-salary&fields=title,salary")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let body: serde_json::Value = serde_json::from_slice(&bytes).expect("json body");
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["results"], json!(2));
        assert_eq!(body["data"][0]["title"], json!("Senior Software Engineer"));
        assert!(body["data"][0].get("company").is_none());
    }
}
