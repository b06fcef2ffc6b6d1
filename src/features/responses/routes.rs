use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::features::responses::handlers::{
    download_attachment, get_response, list_attachments, submit_response,
    submit_response_multipart,
};
use crate::features::responses::services::{ResponseQueryService, SubmissionService};

/// Create routes for the responses feature
///
/// All routes require the auth middleware to be applied by the caller
pub fn routes(
    submission_service: Arc<SubmissionService>,
    query_service: Arc<ResponseQueryService>,
    max_body_size: usize,
) -> Router {
    submission_routes(submission_service, max_body_size).merge(query_routes(query_service))
}

/// Submission endpoints, which carry file payloads and get a larger body limit
pub fn submission_routes(service: Arc<SubmissionService>, max_body_size: usize) -> Router {
    Router::new()
        .route(
            "/api/forms/{form_id}/responses",
            post(submit_response).layer(DefaultBodyLimit::max(max_body_size)),
        )
        .route(
            "/api/forms/{form_id}/responses/multipart",
            post(submit_response_multipart).layer(DefaultBodyLimit::max(max_body_size)),
        )
        .with_state(service)
}

fn query_routes(service: Arc<ResponseQueryService>) -> Router {
    Router::new()
        .route("/api/responses/{id}", get(get_response))
        .route("/api/responses/{id}/attachments", get(list_attachments))
        .route(
            "/api/responses/{id}/attachments/{attachment_id}",
            get(download_attachment),
        )
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::core::config::SubmissionLimits;
    use crate::features::auth::IdentityResolver;
    use crate::features::forms::models::FormStatus;
    use crate::features::responses::repositories::memory::{
        InMemoryForms, InMemorySubmissionStore,
    };
    use crate::features::responses::services::SubmissionValidator;
    use crate::shared::test_helpers::{form_with, question, with_test_user};

    fn app(store: InMemorySubmissionStore, max_body_size: usize) -> Router {
        let form = form_with(
            FormStatus::Published,
            vec![question("q1", "Your name", "text", true)],
        );
        let service = Arc::new(SubmissionService::new(
            Arc::new(InMemoryForms::with(form)),
            Arc::new(store),
            SubmissionValidator::new(SubmissionLimits::default()),
            IdentityResolver::default(),
        ));
        with_test_user(submission_routes(service, max_body_size))
    }

    fn submit(body: String) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/forms/f1/responses")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_body_over_limit_is_rejected_before_submission() {
        let store = InMemorySubmissionStore::new();
        let padding = "x".repeat(512);
        let body = format!(
            r#"{{"answers":[{{"question_id":"q1","answer":"{}"}}]}}"#,
            padding
        );

        let router = app(store.clone(), 256);
        let response = tokio_test::assert_ok!(router.oneshot(submit(body)).await);

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let bytes = tokio_test::assert_ok!(to_bytes(response.into_body(), usize::MAX).await);
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(store.state().await.begins, 0);
    }

    #[tokio::test]
    async fn test_body_within_limit_is_submitted() {
        let store = InMemorySubmissionStore::new();
        let body = r#"{"answers":[{"question_id":"q1","answer":"Ada"}]}"#.to_string();

        let router = app(store.clone(), 256);
        let response = tokio_test::assert_ok!(router.oneshot(submit(body)).await);

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(store.state().await.responses.len(), 1);
    }
}
