use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use tracing::debug;
use uuid::Uuid;

use crate::features::responses::models::{FileAttachment, NewResponse, ResponseDetail};
use crate::features::responses::repositories::{
    StoreResult, SubmissionStore, SubmissionTransaction,
};

/// Rows per multi-row insert, keeps bind parameters well below the protocol limit
const INSERT_CHUNK_SIZE: usize = 1000;

/// PostgreSQL-backed submission writes
pub struct PgSubmissionStore {
    pool: PgPool,
}

impl PgSubmissionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubmissionStore for PgSubmissionStore {
    async fn begin(&self) -> StoreResult<Box<dyn SubmissionTransaction>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgSubmissionTransaction {
            tx,
            pending_attachments: Vec::new(),
        }))
    }

    async fn delete_response(&self, id: Uuid) -> StoreResult<()> {
        // Details and attachments go with it through ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM responses WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        debug!(
            "Deleted response {} ({} rows affected)",
            id,
            result.rows_affected()
        );
        Ok(())
    }
}

struct PgSubmissionTransaction {
    tx: Transaction<'static, Postgres>,
    pending_attachments: Vec<FileAttachment>,
}

impl PgSubmissionTransaction {
    async fn write_attachments(&mut self) -> StoreResult<()> {
        let pending = std::mem::take(&mut self.pending_attachments);

        for chunk in pending.chunks(INSERT_CHUNK_SIZE) {
            let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
                "INSERT INTO file_attachments \
                 (id, response_id, question_id, file_name, content_type, file_size, content, uploaded_at) ",
            );
            builder.push_values(chunk, |mut row, attachment| {
                row.push_bind(attachment.id)
                    .push_bind(attachment.response_id)
                    .push_bind(attachment.question_id.clone())
                    .push_bind(attachment.file_name.clone())
                    .push_bind(attachment.content_type.clone())
                    .push_bind(attachment.file_size)
                    .push_bind(attachment.content.clone())
                    .push_bind(attachment.uploaded_at);
            });
            builder.build().execute(&mut *self.tx).await?;
        }

        Ok(())
    }
}

#[async_trait]
impl SubmissionTransaction for PgSubmissionTransaction {
    async fn insert_response(&mut self, response: &NewResponse) -> StoreResult<Uuid> {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO responses (form_id, user_id, submitted_at)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(&response.form_id)
        .bind(response.user_id)
        .bind(response.submitted_at)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(id)
    }

    async fn insert_response_details(
        &mut self,
        response_id: Uuid,
        details: &[ResponseDetail],
    ) -> StoreResult<()> {
        for (chunk_index, chunk) in details.chunks(INSERT_CHUNK_SIZE).enumerate() {
            let offset = chunk_index * INSERT_CHUNK_SIZE;
            let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
                "INSERT INTO response_details (response_id, position, question_id, answer) ",
            );
            builder.push_values(chunk.iter().enumerate(), |mut row, (i, detail)| {
                row.push_bind(response_id)
                    .push_bind((offset + i) as i32)
                    .push_bind(detail.question_id.clone())
                    .push_bind(detail.answer.clone());
            });
            builder.build().execute(&mut *self.tx).await?;
        }

        Ok(())
    }

    async fn insert_file_attachments(
        &mut self,
        attachments: Vec<FileAttachment>,
    ) -> StoreResult<()> {
        self.pending_attachments.extend(attachments);
        Ok(())
    }

    async fn commit_pending_attachment_writes(&mut self) -> StoreResult<()> {
        self.write_attachments().await
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let mut this = *self;
        // Staged rows must not be dropped silently
        if !this.pending_attachments.is_empty() {
            this.write_attachments().await?;
        }
        this.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        let PgSubmissionTransaction { tx, .. } = *self;
        tx.rollback().await?;
        Ok(())
    }
}
