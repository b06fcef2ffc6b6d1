use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::forms::dtos::{CreateFormDto, FormResponseDto, UpdateFormDto};
use crate::features::forms::services::FormService;
use crate::shared::types::ApiResponse;

/// Create a draft form
#[utoipa::path(
    post,
    path = "/api/forms",
    request_body = CreateFormDto,
    responses(
        (status = 201, description = "Form created", body = ApiResponse<FormResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "forms"
)]
pub async fn create_form(
    user: AuthenticatedUser,
    State(service): State<Arc<FormService>>,
    AppJson(dto): AppJson<CreateFormDto>,
) -> Result<(StatusCode, Json<ApiResponse<FormResponseDto>>)> {
    let form = service.create(dto, &user).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(form.into()),
            Some("Form created successfully".to_string()),
            None,
        )),
    ))
}

/// Get form by ID
#[utoipa::path(
    get,
    path = "/api/forms/{id}",
    params(
        ("id" = String, Path, description = "Form ID")
    ),
    responses(
        (status = 200, description = "Form found", body = ApiResponse<FormResponseDto>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Form not found")
    ),
    security(("bearer_auth" = [])),
    tag = "forms"
)]
pub async fn get_form(
    _user: AuthenticatedUser,
    State(service): State<Arc<FormService>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<FormResponseDto>>> {
    let form = service.get_by_id(&id).await?;
    Ok(Json(ApiResponse::success(Some(form.into()), None, None)))
}

/// Update a draft form
#[utoipa::path(
    put,
    path = "/api/forms/{id}",
    params(
        ("id" = String, Path, description = "Form ID")
    ),
    request_body = UpdateFormDto,
    responses(
        (status = 200, description = "Form updated", body = ApiResponse<FormResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Form not found"),
        (status = 409, description = "Form is not a draft")
    ),
    security(("bearer_auth" = [])),
    tag = "forms"
)]
pub async fn update_form(
    _user: AuthenticatedUser,
    State(service): State<Arc<FormService>>,
    Path(id): Path<String>,
    AppJson(dto): AppJson<UpdateFormDto>,
) -> Result<Json<ApiResponse<FormResponseDto>>> {
    let form = service.update(&id, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(form.into()),
        Some("Form updated successfully".to_string()),
        None,
    )))
}

/// Publish a draft form so it accepts responses
#[utoipa::path(
    post,
    path = "/api/forms/{id}/publish",
    params(
        ("id" = String, Path, description = "Form ID")
    ),
    responses(
        (status = 200, description = "Form published", body = ApiResponse<FormResponseDto>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Form not found"),
        (status = 409, description = "Form is already published")
    ),
    security(("bearer_auth" = [])),
    tag = "forms"
)]
pub async fn publish_form(
    user: AuthenticatedUser,
    State(service): State<Arc<FormService>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<FormResponseDto>>> {
    let form = service.publish(&id, &user).await?;
    Ok(Json(ApiResponse::success(
        Some(form.into()),
        Some("Form published successfully".to_string()),
        None,
    )))
}

/// Delete a form and everything submitted to it
#[utoipa::path(
    delete,
    path = "/api/forms/{id}",
    params(
        ("id" = String, Path, description = "Form ID")
    ),
    responses(
        (status = 200, description = "Form deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Form not found")
    ),
    security(("bearer_auth" = [])),
    tag = "forms"
)]
pub async fn delete_form(
    _user: AuthenticatedUser,
    State(service): State<Arc<FormService>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(&id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Form deleted successfully".to_string()),
        None,
    )))
}
