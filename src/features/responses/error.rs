use axum::http::StatusCode;
use thiserror::Error;

use crate::shared::constants::MSG_INVALID_USER_ID;

/// Why a submission did not commit
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    #[error("{}", MSG_INVALID_USER_ID)]
    InvalidIdentity,

    /// Missing form id or a form that is not accepting submissions
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    NotFound(String),

    /// Required-field and file constraints
    #[error("{0}")]
    ValidationFailed(String),

    /// A transactional write failed; carries the prefixed innermost message
    #[error("{0}")]
    PersistenceFailure(String),
}

impl SubmissionError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            SubmissionError::InvalidIdentity => StatusCode::UNAUTHORIZED,
            SubmissionError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            SubmissionError::NotFound(_) => StatusCode::NOT_FOUND,
            SubmissionError::ValidationFailed(_) => StatusCode::BAD_REQUEST,
            SubmissionError::PersistenceFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
