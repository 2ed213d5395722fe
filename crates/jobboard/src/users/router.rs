use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde_json::json;

use super::service::{UserService, UserServiceError};
use crate::query::ParamMap;
use crate::store::DocumentStore;

/// Router builder for the account directory endpoints. Role enforcement is
/// the auth layer's concern and is mounted in front of this router.
pub fn user_router<S>(service: Arc<UserService<S>>) -> Router
where
    S: DocumentStore + 'static,
{
    Router::new()
        .route("/api/v1/users", get(list_handler::<S>))
        .route(
            "/api/v1/user/:id",
            get(get_handler::<S>).delete(delete_handler::<S>),
        )
        .with_state(service)
}

pub(crate) async fn list_handler<S>(
    State(service): State<Arc<UserService<S>>>,
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

pub(crate) async fn get_handler<S>(
    State(service): State<Arc<UserService<S>>>,
    Path(id): Path<String>,
) -> Response
where
    S: DocumentStore + 'static,
{
    match service.get(&id).await {
        Ok(user) => {
            let payload = json!({
                "success": true,
                "data": user,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn delete_handler<S>(
    State(service): State<Arc<UserService<S>>>,
    Path(id): Path<String>,
) -> Response
where
    S: DocumentStore + 'static,
{
    match service.delete(&id).await {
        Ok(()) => {
            let payload = json!({
                "success": true,
                "message": "user deleted",
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

fn error_response(error: UserServiceError) -> Response {
    let status = match &error {
        UserServiceError::Query(_) => StatusCode::BAD_REQUEST,
        UserServiceError::NotFound => StatusCode::NOT_FOUND,
        UserServiceError::Store(_) | UserServiceError::Corrupted(_) => {
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
    use crate::store::InMemoryStore;
    use crate::users::model::{Role, User};
    use axum::body::Body;
    use axum::http::Request;
    use chrono::Utc;
    use tower::util::ServiceExt;

    #[tokio::test]
    async fn listing_sorts_by_creation_time_on_request() {
        let service = Arc::new(UserService::new(Arc::new(InMemoryStore::new()), 100));
        for name in ["First User", "Second User"] {
            service
                .register(User {
                    id: None,
                    name: name.to_string(),
                    email: format!("{name}@example.com"),
                    role: Role::User,
                    created_at: Utc::now(),
                })
                .await
                .expect("register");
        }

        let response = user_router(service)
            .oneshot(
                Request::builder()
                    .uri("/api/v1/users?sort=createdAt&fields=name")
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
        assert_eq!(body["results"], json!(2));
        assert_eq!(body["data"][0]["name"], json!("First User"));
        assert!(body["data"][0].get("email").is_none());
    }
}
