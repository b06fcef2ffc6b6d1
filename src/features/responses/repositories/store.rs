//! Storage seams consumed by the submission coordinator.
//!
//! Every step returns an explicit `Result`, the coordinator decides from the
//! returned error whether to enter its rollback path.

use async_trait::async_trait;
use uuid::Uuid;

use crate::core::error::StoreError;
use crate::features::forms::models::Form;
use crate::features::responses::models::{FileAttachment, NewResponse, ResponseDetail};

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Resolves the form a submission targets
#[async_trait]
pub trait FormLookup: Send + Sync {
    async fn find_form_by_id(&self, id: &str) -> StoreResult<Option<Form>>;
}

/// Entry point for submission writes
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    /// Open the transaction all submission writes go through
    async fn begin(&self) -> StoreResult<Box<dyn SubmissionTransaction>>;

    /// Delete a response and everything hanging off it, outside any
    /// transaction. Deleting a missing response is not an error.
    async fn delete_response(&self, id: Uuid) -> StoreResult<()>;
}

/// Writes of a single submission; nothing is visible before `commit`
#[async_trait]
pub trait SubmissionTransaction: Send {
    /// Insert the response row and return its generated id
    async fn insert_response(&mut self, response: &NewResponse) -> StoreResult<Uuid>;

    /// Persist the ordered answer details of a response
    async fn insert_response_details(
        &mut self,
        response_id: Uuid,
        details: &[ResponseDetail],
    ) -> StoreResult<()>;

    /// Stage attachment rows; they are written by `commit_pending_attachment_writes`
    async fn insert_file_attachments(&mut self, attachments: Vec<FileAttachment>)
        -> StoreResult<()>;

    /// Write every staged attachment row
    async fn commit_pending_attachment_writes(&mut self) -> StoreResult<()>;

    async fn commit(self: Box<Self>) -> StoreResult<()>;

    async fn rollback(self: Box<Self>) -> StoreResult<()>;
}
