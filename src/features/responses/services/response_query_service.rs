use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::responses::models::{
    FileAttachment, FileAttachmentSummary, Response, ResponseDetail, ResponseRecord,
};

/// Read access to committed responses and their attachments
pub struct ResponseQueryService {
    pool: PgPool,
}

impl ResponseQueryService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a response with its details in submission order
    pub async fn get_response(&self, id: Uuid) -> Result<Response> {
        let record = sqlx::query_as::<_, ResponseRecord>(
            r#"
            SELECT id, form_id, user_id, submitted_at
            FROM responses
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get response by ID: {:?}", e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound(format!("Response '{}' not found", id)))?;

        let details = sqlx::query_as::<_, ResponseDetail>(
            r#"
            SELECT question_id, answer
            FROM response_details
            WHERE response_id = $1
            ORDER BY position
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Response::from_record(record, details))
    }

    /// Attachment metadata of a response, ordered by question then upload order
    pub async fn list_attachments(&self, response_id: Uuid) -> Result<Vec<FileAttachmentSummary>> {
        self.ensure_response_exists(response_id).await?;

        let attachments = sqlx::query_as::<_, FileAttachmentSummary>(
            r#"
            SELECT id, response_id, question_id, file_name, content_type, file_size, uploaded_at
            FROM file_attachments
            WHERE response_id = $1
            ORDER BY question_id, uploaded_at, id
            "#,
        )
        .bind(response_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(attachments)
    }

    /// Get one attachment including its encoded content
    pub async fn get_attachment(
        &self,
        response_id: Uuid,
        attachment_id: Uuid,
    ) -> Result<FileAttachment> {
        sqlx::query_as::<_, FileAttachment>(
            r#"
            SELECT id, response_id, question_id, file_name, content_type, file_size, content, uploaded_at
            FROM file_attachments
            WHERE id = $1 AND response_id = $2
            "#,
        )
        .bind(attachment_id)
        .bind(response_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Attachment '{}' not found", attachment_id)))
    }

    async fn ensure_response_exists(&self, id: Uuid) -> Result<()> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM responses WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;

        if exists {
            Ok(())
        } else {
            Err(AppError::NotFound(format!("Response '{}' not found", id)))
        }
    }
}
