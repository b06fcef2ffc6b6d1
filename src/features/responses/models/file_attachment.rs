use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for an uploaded file tied to a response and a question
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct FileAttachment {
    pub id: Uuid,
    pub response_id: Uuid,
    pub question_id: String,
    pub file_name: String,
    pub content_type: String,
    pub file_size: i64,
    /// Base64-encoded file bytes
    pub content: String,
    pub uploaded_at: DateTime<Utc>,
}

/// Attachment metadata without the encoded payload
#[derive(Debug, Clone, FromRow)]
pub struct FileAttachmentSummary {
    pub id: Uuid,
    pub response_id: Uuid,
    pub question_id: String,
    pub file_name: String,
    pub content_type: String,
    pub file_size: i64,
    pub uploaded_at: DateTime<Utc>,
}

impl From<&FileAttachment> for FileAttachmentSummary {
    fn from(attachment: &FileAttachment) -> Self {
        Self {
            id: attachment.id,
            response_id: attachment.response_id,
            question_id: attachment.question_id.clone(),
            file_name: attachment.file_name.clone(),
            content_type: attachment.content_type.clone(),
            file_size: attachment.file_size,
            uploaded_at: attachment.uploaded_at,
        }
    }
}
