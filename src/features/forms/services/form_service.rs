use async_trait::async_trait;
use sqlx::{types::Json, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::ClaimSet;
use crate::features::auth::IdentityResolver;
use crate::features::forms::dtos::{
    check_question_identifiers, CreateFormDto, QuestionDto, UpdateFormDto,
};
use crate::features::forms::models::{Form, FormStatus, Question};
use crate::features::responses::repositories::{FormLookup, StoreResult};
use crate::shared::constants::{MSG_FORM_NOT_DRAFT, MSG_INVALID_USER_ID};

const FORM_COLUMNS: &str = "id, title, description, status, questions, created_by, \
                            published_by, published_at, created_at, updated_at";

/// Run derive validation and the identifier uniqueness rules on form input
pub fn validate_form_input<T: Validate>(
    dto: &T,
    questions: Option<&[QuestionDto]>,
) -> Result<()> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    if let Some(questions) = questions {
        check_question_identifiers(questions).map_err(AppError::Validation)?;
    }
    Ok(())
}

/// Service for form authoring and lookup
pub struct FormService {
    pool: PgPool,
    identities: IdentityResolver,
}

impl FormService {
    pub fn new(pool: PgPool, identities: IdentityResolver) -> Self {
        Self { pool, identities }
    }

    fn user_id(&self, claims: &dyn ClaimSet) -> Result<i64> {
        self.identities
            .resolve(claims)
            .map(|identity| identity.user_id())
            .map_err(|_| AppError::Unauthorized(MSG_INVALID_USER_ID.to_string()))
    }

    /// Create a draft form owned by the caller
    pub async fn create(&self, dto: CreateFormDto, claims: &dyn ClaimSet) -> Result<Form> {
        validate_form_input(&dto, Some(dto.questions.as_slice()))?;
        let user_id = self.user_id(claims)?;

        let questions: Vec<Question> = dto.questions.into_iter().map(Into::into).collect();
        let sql = format!(
            r#"
            INSERT INTO forms (id, title, description, status, questions, created_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {FORM_COLUMNS}
            "#
        );

        let form = sqlx::query_as::<_, Form>(&sql)
            .bind(Uuid::now_v7().to_string())
            .bind(dto.title.trim())
            .bind(dto.description)
            .bind(FormStatus::Draft)
            .bind(Json(questions))
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create form: {:?}", e);
                AppError::Database(e)
            })?;

        tracing::info!("Form created: id={}, user={}", form.id, user_id);
        Ok(form)
    }

    /// Get form by ID
    pub async fn get_by_id(&self, id: &str) -> Result<Form> {
        let sql = format!("SELECT {FORM_COLUMNS} FROM forms WHERE id = $1");

        sqlx::query_as::<_, Form>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get form by ID: {:?}", e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound(format!("Form '{}' not found", id)))
    }

    /// Update a draft form, absent fields are kept
    pub async fn update(&self, id: &str, dto: UpdateFormDto) -> Result<Form> {
        validate_form_input(&dto, dto.questions.as_deref())?;

        let questions = dto
            .questions
            .map(|qs| Json(qs.into_iter().map(Question::from).collect::<Vec<_>>()));
        let sql = format!(
            r#"
            UPDATE forms
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                questions = COALESCE($4, questions),
                updated_at = NOW()
            WHERE id = $1 AND status = $5
            RETURNING {FORM_COLUMNS}
            "#
        );

        let updated = sqlx::query_as::<_, Form>(&sql)
            .bind(id)
            .bind(dto.title.as_deref().map(str::trim))
            .bind(dto.description)
            .bind(questions)
            .bind(FormStatus::Draft)
            .fetch_optional(&self.pool)
            .await?;

        match updated {
            Some(form) => Ok(form),
            None => Err(self.draft_only_error(id).await),
        }
    }

    /// Move a draft form to published
    pub async fn publish(&self, id: &str, claims: &dyn ClaimSet) -> Result<Form> {
        let user_id = self.user_id(claims)?;
        let sql = format!(
            r#"
            UPDATE forms
            SET status = $2, published_by = $3, published_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND status = $4
            RETURNING {FORM_COLUMNS}
            "#
        );

        let published = sqlx::query_as::<_, Form>(&sql)
            .bind(id)
            .bind(FormStatus::Published)
            .bind(user_id)
            .bind(FormStatus::Draft)
            .fetch_optional(&self.pool)
            .await?;

        match published {
            Some(form) => {
                tracing::info!("Form published: id={}, user={}", form.id, user_id);
                Ok(form)
            }
            None => Err(self.draft_only_error(id).await),
        }
    }

    /// Delete a form with its responses and attachments
    pub async fn delete(&self, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM forms WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Form '{}' not found", id)));
        }

        tracing::info!("Form deleted: id={}", id);
        Ok(())
    }

    /// A draft-guarded write matched nothing: missing form or wrong status
    async fn draft_only_error(&self, id: &str) -> AppError {
        match self.get_by_id(id).await {
            Ok(_) => AppError::Conflict(MSG_FORM_NOT_DRAFT.to_string()),
            Err(e) => e,
        }
    }
}

#[async_trait]
impl FormLookup for FormService {
    async fn find_form_by_id(&self, id: &str) -> StoreResult<Option<Form>> {
        let sql = format!("SELECT {FORM_COLUMNS} FROM forms WHERE id = $1");
        let form = sqlx::query_as::<_, Form>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(form)
    }
}
