use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// One question's persisted answer.
///
/// Choice answers hold a JSON array of option ids, everything else literal text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ResponseDetail {
    pub question_id: String,
    pub answer: String,
}

impl ResponseDetail {
    pub fn new(question_id: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question_id: question_id.into(),
            answer: answer.into(),
        }
    }
}

/// Response row before the database assigns its id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewResponse {
    pub form_id: String,
    pub user_id: i64,
    pub submitted_at: DateTime<Utc>,
}

/// Database model for responses
#[derive(Debug, Clone, FromRow)]
pub struct ResponseRecord {
    pub id: Uuid,
    pub form_id: String,
    pub user_id: i64,
    pub submitted_at: DateTime<Utc>,
}

/// A user's full submission against a form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub id: Uuid,
    pub form_id: String,
    pub user_id: i64,
    pub submitted_at: DateTime<Utc>,
    pub details: Vec<ResponseDetail>,
}

impl Response {
    pub fn from_record(record: ResponseRecord, details: Vec<ResponseDetail>) -> Self {
        Self {
            id: record.id,
            form_id: record.form_id,
            user_id: record.user_id,
            submitted_at: record.submitted_at,
            details,
        }
    }
}
