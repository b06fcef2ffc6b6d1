use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::debug;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{multipart_error, AppJson, AppPath};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::responses::dtos::{
    AnswerDto, AttachmentGroupDto, SubmitMultipartDto, SubmitResponseDto, SubmittedResponseDto,
};
use crate::features::responses::models::{Answer, FileUpload, Submission};
use crate::features::responses::services::attachment_processor::decode_content;
use crate::features::responses::services::{
    ResponseQueryService, SubmissionResult, SubmissionService,
};
use crate::shared::types::ApiResponse;

/// Prefix of multipart file fields, followed by the question id
const FILE_FIELD_PREFIX: &str = "file:";

type SubmitReply = (StatusCode, Json<ApiResponse<SubmittedResponseDto>>);

fn reply(result: SubmissionResult) -> SubmitReply {
    match (result.data, result.error) {
        (Some(response), _) if result.success => (
            StatusCode::CREATED,
            Json(ApiResponse::success(
                Some(response.into()),
                Some(result.message),
                None,
            )),
        ),
        (_, error) => {
            let status = error
                .map(|e| e.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, Json(ApiResponse::failure(result.message)))
        }
    }
}

/// Submit a response to a published form
#[utoipa::path(
    post,
    path = "/api/forms/{form_id}/responses",
    params(
        ("form_id" = String, Path, description = "Form ID")
    ),
    request_body = SubmitResponseDto,
    responses(
        (status = 201, description = "Response submitted", body = ApiResponse<SubmittedResponseDto>),
        (status = 400, description = "Validation failed or form not published"),
        (status = 401, description = "Missing or invalid user identity"),
        (status = 404, description = "Form not found"),
        (status = 500, description = "Response could not be stored")
    ),
    security(("bearer_auth" = [])),
    tag = "responses"
)]
pub async fn submit_response(
    user: AuthenticatedUser,
    State(service): State<Arc<SubmissionService>>,
    AppPath(form_id): AppPath<String>,
    AppJson(dto): AppJson<SubmitResponseDto>,
) -> Result<SubmitReply> {
    let submission = dto.into_submission()?;
    let result = service.submit(&form_id, submission, &user).await;
    Ok(reply(result))
}

/// Submit a response with files as multipart/form-data
///
/// Accepts:
/// - `answers`: JSON array of answers (optional)
/// - `file:<question_id>`: one field per uploaded file
#[utoipa::path(
    post,
    path = "/api/forms/{form_id}/responses/multipart",
    params(
        ("form_id" = String, Path, description = "Form ID")
    ),
    request_body(
        content = SubmitMultipartDto,
        content_type = "multipart/form-data",
        description = "Answers as JSON plus one file field per upload",
    ),
    responses(
        (status = 201, description = "Response submitted", body = ApiResponse<SubmittedResponseDto>),
        (status = 400, description = "Validation failed or malformed multipart body"),
        (status = 401, description = "Missing or invalid user identity"),
        (status = 404, description = "Form not found"),
        (status = 413, description = "Request body too large"),
        (status = 500, description = "Response could not be stored")
    ),
    security(("bearer_auth" = [])),
    tag = "responses"
)]
pub async fn submit_response_multipart(
    user: AuthenticatedUser,
    State(service): State<Arc<SubmissionService>>,
    AppPath(form_id): AppPath<String>,
    mut multipart: Multipart,
) -> Result<SubmitReply> {
    let mut submission = Submission::default();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        multipart_error(e)
    })? {
        let field_name = field.name().unwrap_or("").to_string();

        if field_name == "answers" {
            let text = field.text().await.map_err(|e| {
                AppError::BadRequest(format!("Failed to read answers field: {}", e))
            })?;
            let answers: Vec<AnswerDto> = serde_json::from_str(&text)
                .map_err(|e| AppError::BadRequest(format!("Invalid answers JSON: {}", e)))?;
            submission
                .answers
                .extend(answers.into_iter().map(Answer::from));
        } else if let Some(question_id) = field_name.strip_prefix(FILE_FIELD_PREFIX) {
            let question_id = question_id.to_string();
            let content_type = field
                .content_type()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "application/octet-stream".to_string());
            let file_name = field
                .file_name()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "unnamed".to_string());
            let data = field.bytes().await.map_err(|e| {
                debug!("Failed to read file bytes: {}", e);
                multipart_error(e)
            })?;

            submission.file_uploads.push(FileUpload {
                question_id,
                file_name,
                content_type,
                data: data.to_vec(),
            });
        } else {
            debug!("Ignoring unknown field: {}", field_name);
        }
    }

    let result = service.submit(&form_id, submission, &user).await;
    Ok(reply(result))
}

/// Get a stored response by ID
#[utoipa::path(
    get,
    path = "/api/responses/{id}",
    params(
        ("id" = Uuid, Path, description = "Response ID")
    ),
    responses(
        (status = 200, description = "Response found", body = ApiResponse<SubmittedResponseDto>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Response not found")
    ),
    security(("bearer_auth" = [])),
    tag = "responses"
)]
pub async fn get_response(
    _user: AuthenticatedUser,
    State(service): State<Arc<ResponseQueryService>>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<ApiResponse<SubmittedResponseDto>>> {
    let response = service.get_response(id).await?;
    Ok(Json(ApiResponse::success(Some(response.into()), None, None)))
}

/// List the attachments of a response grouped by question
#[utoipa::path(
    get,
    path = "/api/responses/{id}/attachments",
    params(
        ("id" = Uuid, Path, description = "Response ID")
    ),
    responses(
        (status = 200, description = "Attachments grouped by question", body = ApiResponse<Vec<AttachmentGroupDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Response not found")
    ),
    security(("bearer_auth" = [])),
    tag = "responses"
)]
pub async fn list_attachments(
    _user: AuthenticatedUser,
    State(service): State<Arc<ResponseQueryService>>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<ApiResponse<Vec<AttachmentGroupDto>>>> {
    let attachments = service.list_attachments(id).await?;
    let groups = AttachmentGroupDto::group(attachments);
    Ok(Json(ApiResponse::success(Some(groups), None, None)))
}

/// Download one attachment as raw bytes
#[utoipa::path(
    get,
    path = "/api/responses/{id}/attachments/{attachment_id}",
    params(
        ("id" = Uuid, Path, description = "Response ID"),
        ("attachment_id" = Uuid, Path, description = "Attachment ID")
    ),
    responses(
        (status = 200, description = "File content with its declared content type", content_type = "application/octet-stream"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Attachment not found")
    ),
    security(("bearer_auth" = [])),
    tag = "responses"
)]
pub async fn download_attachment(
    _user: AuthenticatedUser,
    State(service): State<Arc<ResponseQueryService>>,
    AppPath((id, attachment_id)): AppPath<(Uuid, Uuid)>,
) -> Result<Response> {
    let attachment = service.get_attachment(id, attachment_id).await?;
    let bytes = decode_content(&attachment.content).map_err(|e| {
        AppError::Internal(format!(
            "Stored attachment {} is not valid base64: {}",
            attachment.id, e
        ))
    })?;

    let disposition = format!(
        "attachment; filename=\"{}\"",
        attachment.file_name.replace('"', "")
    );

    Ok((
        [
            (header::CONTENT_TYPE, attachment.content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        Body::from(bytes),
    )
        .into_response())
}
