use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::auth;
use crate::features::forms::{
    dtos as forms_dtos, handlers as forms_handlers, models as forms_models,
};
use crate::features::responses::{dtos as responses_dtos, handlers as responses_handlers};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Forms
        forms_handlers::create_form,
        forms_handlers::get_form,
        forms_handlers::update_form,
        forms_handlers::publish_form,
        forms_handlers::delete_form,
        // Responses
        responses_handlers::submit_response,
        responses_handlers::submit_response_multipart,
        responses_handlers::get_response,
        responses_handlers::list_attachments,
        responses_handlers::download_attachment,
    ),
    components(
        schemas(
            // Shared
            Meta,
            // Auth
            auth::model::AuthenticatedUser,
            // Forms
            forms_models::FormStatus,
            forms_dtos::OptionDto,
            forms_dtos::QuestionDto,
            forms_dtos::CreateFormDto,
            forms_dtos::UpdateFormDto,
            forms_dtos::QuestionResponseDto,
            forms_dtos::FormResponseDto,
            ApiResponse<forms_dtos::FormResponseDto>,
            // Responses
            responses_dtos::AnswerDto,
            responses_dtos::FileUploadDto,
            responses_dtos::SubmitResponseDto,
            responses_dtos::SubmitMultipartDto,
            responses_dtos::ResponseDetailDto,
            responses_dtos::SubmittedResponseDto,
            responses_dtos::FileAttachmentDto,
            responses_dtos::AttachmentGroupDto,
            ApiResponse<responses_dtos::SubmittedResponseDto>,
            ApiResponse<Vec<responses_dtos::AttachmentGroupDto>>,
        )
    ),
    tags(
        (name = "forms", description = "Form authoring and publishing"),
        (name = "responses", description = "Response submission, retrieval and attachments"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Formflow API",
        version = "0.1.0",
        description = "API documentation for Formflow",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
