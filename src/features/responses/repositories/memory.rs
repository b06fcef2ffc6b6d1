//! In-memory storage doubles with failure injection and call recording.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use crate::core::error::StoreError;
use crate::features::forms::models::Form;
use crate::features::responses::models::{
    FileAttachment, NewResponse, ResponseDetail, ResponseRecord,
};
use crate::features::responses::repositories::{
    FormLookup, StoreResult, SubmissionStore, SubmissionTransaction,
};

/// Storage step that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPoint {
    Begin,
    InsertResponse,
    InsertDetails,
    InsertAttachments,
    CommitAttachments,
    Commit,
    Rollback,
    Delete,
}

fn simulated(point: FailPoint) -> StoreError {
    StoreError::operation(
        "An error occurred while saving the entity changes",
        format!("{:?} failed", point),
    )
}

#[derive(Debug, Default)]
pub struct MemoryState {
    pub responses: HashMap<Uuid, ResponseRecord>,
    pub details: HashMap<Uuid, Vec<ResponseDetail>>,
    pub attachments: Vec<FileAttachment>,
    pub delete_calls: Vec<Uuid>,
    pub begins: usize,
    pub commits: usize,
    pub rollbacks: usize,
}

#[derive(Clone, Default)]
pub struct InMemorySubmissionStore {
    state: Arc<Mutex<MemoryState>>,
    failures: Arc<Vec<FailPoint>>,
}

impl InMemorySubmissionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_at(point: FailPoint) -> Self {
        Self::failing_at_all(&[point])
    }

    pub fn failing_at_all(points: &[FailPoint]) -> Self {
        Self {
            state: Arc::default(),
            failures: Arc::new(points.to_vec()),
        }
    }

    pub async fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().await
    }

    fn check(failures: &[FailPoint], point: FailPoint) -> StoreResult<()> {
        if failures.contains(&point) {
            Err(simulated(point))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl SubmissionStore for InMemorySubmissionStore {
    async fn begin(&self) -> StoreResult<Box<dyn SubmissionTransaction>> {
        self.state.lock().await.begins += 1;
        Self::check(&self.failures, FailPoint::Begin)?;

        Ok(Box::new(MemoryTransaction {
            state: Arc::clone(&self.state),
            failures: Arc::clone(&self.failures),
            response: None,
            details: Vec::new(),
            staged: Vec::new(),
            written: Vec::new(),
        }))
    }

    async fn delete_response(&self, id: Uuid) -> StoreResult<()> {
        let mut state = self.state.lock().await;
        state.delete_calls.push(id);
        Self::check(&self.failures, FailPoint::Delete)?;

        state.responses.remove(&id);
        state.details.remove(&id);
        state.attachments.retain(|a| a.response_id != id);
        Ok(())
    }
}

/// Buffers writes until commit
struct MemoryTransaction {
    state: Arc<Mutex<MemoryState>>,
    failures: Arc<Vec<FailPoint>>,
    response: Option<ResponseRecord>,
    details: Vec<ResponseDetail>,
    staged: Vec<FileAttachment>,
    written: Vec<FileAttachment>,
}

#[async_trait]
impl SubmissionTransaction for MemoryTransaction {
    async fn insert_response(&mut self, response: &NewResponse) -> StoreResult<Uuid> {
        InMemorySubmissionStore::check(&self.failures, FailPoint::InsertResponse)?;
        let id = Uuid::new_v4();
        self.response = Some(ResponseRecord {
            id,
            form_id: response.form_id.clone(),
            user_id: response.user_id,
            submitted_at: response.submitted_at,
        });
        Ok(id)
    }

    async fn insert_response_details(
        &mut self,
        _response_id: Uuid,
        details: &[ResponseDetail],
    ) -> StoreResult<()> {
        InMemorySubmissionStore::check(&self.failures, FailPoint::InsertDetails)?;
        self.details.extend_from_slice(details);
        Ok(())
    }

    async fn insert_file_attachments(
        &mut self,
        attachments: Vec<FileAttachment>,
    ) -> StoreResult<()> {
        InMemorySubmissionStore::check(&self.failures, FailPoint::InsertAttachments)?;
        self.staged.extend(attachments);
        Ok(())
    }

    async fn commit_pending_attachment_writes(&mut self) -> StoreResult<()> {
        InMemorySubmissionStore::check(&self.failures, FailPoint::CommitAttachments)?;
        self.written.append(&mut self.staged);
        Ok(())
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let MemoryTransaction {
            state,
            failures,
            response,
            details,
            written,
            ..
        } = *self;
        InMemorySubmissionStore::check(&failures, FailPoint::Commit)?;

        let mut state = state.lock().await;
        if let Some(response) = response {
            state.details.insert(response.id, details);
            state.responses.insert(response.id, response);
        }
        state.attachments.extend(written);
        state.commits += 1;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        self.state.lock().await.rollbacks += 1;
        InMemorySubmissionStore::check(&self.failures, FailPoint::Rollback)
    }
}

/// Form lookup over a fixed set of forms
#[derive(Default)]
pub struct InMemoryForms {
    forms: HashMap<String, Form>,
    unavailable: bool,
}

impl InMemoryForms {
    pub fn with(form: Form) -> Self {
        Self {
            forms: HashMap::from([(form.id.clone(), form)]),
            unavailable: false,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            forms: HashMap::new(),
            unavailable: true,
        }
    }
}

#[async_trait]
impl FormLookup for InMemoryForms {
    async fn find_form_by_id(&self, id: &str) -> StoreResult<Option<Form>> {
        if self.unavailable {
            return Err(StoreError::operation("Failed to load form", "form store offline"));
        }
        Ok(self.forms.get(id).cloned())
    }
}
