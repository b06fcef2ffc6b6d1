use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::forms::handlers::{
    create_form, delete_form, get_form, publish_form, update_form,
};
use crate::features::forms::services::FormService;

/// Create routes for the forms feature
pub fn routes(form_service: Arc<FormService>) -> Router {
    Router::new()
        .route("/api/forms", post(create_form))
        .route(
            "/api/forms/{id}",
            get(get_form).put(update_form).delete(delete_form),
        )
        .route("/api/forms/{id}/publish", post(publish_form))
        .with_state(form_service)
}
