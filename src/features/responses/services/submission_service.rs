use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::core::error::{innermost_message, StoreError};
use crate::features::auth::model::ClaimSet;
use crate::features::auth::{Identity, IdentityResolver};
use crate::features::forms::models::Form;
use crate::features::responses::error::SubmissionError;
use crate::features::responses::models::{NewResponse, Response, ResponseDetail, Submission};
use crate::features::responses::repositories::{
    FormLookup, SubmissionStore, SubmissionTransaction,
};
use crate::features::responses::services::{
    answer_formatter, attachment_processor, SubmissionValidator,
};
use crate::shared::constants::{
    MSG_FORM_ID_REQUIRED, MSG_INVALID_FORM_ID, MSG_SUBMISSION_ERROR_PREFIX,
    MSG_SUBMISSION_SUCCEEDED,
};

/// Stages a submission moves through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Validating,
    Formatting,
    Persisting,
    Committed,
    /// A storage step failed after the transaction was opened
    RolledBack,
    /// Refused before any storage write
    Rejected,
}

/// Result of a best-effort storage step whose failure is not surfaced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupOutcome {
    Ok,
    Failed(String),
}

impl CleanupOutcome {
    fn from_result(result: Result<(), StoreError>) -> Self {
        match result {
            Ok(()) => CleanupOutcome::Ok,
            Err(e) => CleanupOutcome::Failed(innermost_message(&e)),
        }
    }
}

/// Internal record of what a submission did, including the steps whose
/// failures are swallowed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionTrace {
    pub states: Vec<SubmissionState>,
    pub response_id: Option<Uuid>,
    pub rollback: Option<CleanupOutcome>,
    /// Compensating delete of the inserted response
    pub cleanup: Option<CleanupOutcome>,
}

impl SubmissionTrace {
    fn enter(&mut self, state: SubmissionState) {
        self.states.push(state);
    }

    pub fn final_state(&self) -> Option<SubmissionState> {
        self.states.last().copied()
    }
}

/// Outcome handed back to the caller; never an error across this boundary
#[derive(Debug, Clone)]
pub struct SubmissionResult {
    pub success: bool,
    pub message: String,
    pub data: Option<Response>,
    pub error: Option<SubmissionError>,
}

impl SubmissionResult {
    fn committed(response: Response) -> Self {
        Self {
            success: true,
            message: MSG_SUBMISSION_SUCCEEDED.to_string(),
            data: Some(response),
            error: None,
        }
    }

    fn failed(error: SubmissionError) -> Self {
        Self {
            success: false,
            message: error.to_string(),
            data: None,
            error: Some(error),
        }
    }
}

/// Coordinates validation, formatting and transactional persistence of a
/// single submission
pub struct SubmissionService {
    forms: Arc<dyn FormLookup>,
    store: Arc<dyn SubmissionStore>,
    validator: SubmissionValidator,
    identities: IdentityResolver,
}

impl SubmissionService {
    pub fn new(
        forms: Arc<dyn FormLookup>,
        store: Arc<dyn SubmissionStore>,
        validator: SubmissionValidator,
        identities: IdentityResolver,
    ) -> Self {
        Self {
            forms,
            store,
            validator,
            identities,
        }
    }

    pub async fn submit(
        &self,
        form_id: &str,
        submission: Submission,
        claims: &dyn ClaimSet,
    ) -> SubmissionResult {
        self.submit_traced(form_id, submission, claims).await.0
    }

    /// Same as [`submit`](Self::submit), also returning the internal trace
    pub async fn submit_traced(
        &self,
        form_id: &str,
        submission: Submission,
        claims: &dyn ClaimSet,
    ) -> (SubmissionResult, SubmissionTrace) {
        let mut trace = SubmissionTrace::default();

        let result = match self.run(form_id, submission, claims, &mut trace).await {
            Ok(response) => SubmissionResult::committed(response),
            Err(e) => {
                if trace.final_state() != Some(SubmissionState::RolledBack) {
                    trace.enter(SubmissionState::Rejected);
                }
                SubmissionResult::failed(e)
            }
        };

        (result, trace)
    }

    async fn run(
        &self,
        form_id: &str,
        submission: Submission,
        claims: &dyn ClaimSet,
        trace: &mut SubmissionTrace,
    ) -> Result<Response, SubmissionError> {
        trace.enter(SubmissionState::Validating);

        let identity = self.identities.resolve(claims).map_err(|_| {
            debug!("Submission rejected: no usable user id in claims");
            SubmissionError::InvalidIdentity
        })?;

        if form_id.trim().is_empty() {
            return Err(SubmissionError::InvalidInput(
                MSG_FORM_ID_REQUIRED.to_string(),
            ));
        }

        let form = self
            .forms
            .find_form_by_id(form_id)
            .await
            .map_err(|e| {
                error!("Failed to load form {}: {:?}", form_id, e);
                persistence_failure(&e)
            })?
            .ok_or_else(|| SubmissionError::NotFound(MSG_INVALID_FORM_ID.to_string()))?;

        if let Err(e) = self.validator.validate(&form, &submission) {
            warn!(
                "Submission to form {} by user {} rejected: {}",
                form.id,
                identity.user_id(),
                e
            );
            return Err(e);
        }

        trace.enter(SubmissionState::Formatting);
        let details = format_details(&form, &submission);

        trace.enter(SubmissionState::Persisting);
        self.persist(&form, identity, &submission, details, trace)
            .await
    }

    async fn persist(
        &self,
        form: &Form,
        identity: Identity,
        submission: &Submission,
        details: Vec<ResponseDetail>,
        trace: &mut SubmissionTrace,
    ) -> Result<Response, SubmissionError> {
        let now = Utc::now();
        let new_response = NewResponse {
            form_id: form.id.clone(),
            user_id: identity.user_id(),
            submitted_at: now,
        };

        let mut tx = match self.store.begin().await {
            Ok(tx) => tx,
            Err(e) => {
                error!("Failed to open submission transaction: {:?}", e);
                trace.enter(SubmissionState::RolledBack);
                return Err(persistence_failure(&e));
            }
        };

        let written = write_submission(
            tx.as_mut(),
            &new_response,
            &details,
            submission,
            now,
            &mut trace.response_id,
        )
        .await;

        let failure = match written {
            Ok(response_id) => match tx.commit().await {
                Ok(()) => {
                    trace.enter(SubmissionState::Committed);
                    info!(
                        "Response committed: id={}, form={}, user={}, details={}, attachments={}",
                        response_id,
                        form.id,
                        identity.user_id(),
                        details.len(),
                        submission.file_uploads.len()
                    );
                    return Ok(Response {
                        id: response_id,
                        form_id: new_response.form_id,
                        user_id: new_response.user_id,
                        submitted_at: new_response.submitted_at,
                        details,
                    });
                }
                // The transaction is gone, only the compensating delete is left
                Err(e) => e,
            },
            Err(e) => {
                let rollback = tx.rollback().await;
                if let Err(ref rollback_err) = rollback {
                    warn!("Rollback of submission transaction failed: {:?}", rollback_err);
                }
                trace.rollback = Some(CleanupOutcome::from_result(rollback));
                e
            }
        };

        error!(
            "Failed to persist response for form {}: {:?}",
            form.id, failure
        );

        if let Some(response_id) = trace.response_id {
            trace.cleanup = Some(self.compensate(response_id).await);
        }
        trace.enter(SubmissionState::RolledBack);

        Err(persistence_failure(&failure))
    }

    /// Best-effort removal of an inserted response; failures are only logged
    async fn compensate(&self, response_id: Uuid) -> CleanupOutcome {
        let outcome = CleanupOutcome::from_result(self.store.delete_response(response_id).await);
        if let CleanupOutcome::Failed(ref reason) = outcome {
            warn!(
                "Compensating delete of response {} failed: {}",
                response_id, reason
            );
        }
        outcome
    }
}

/// Format every answer, then add one summary detail per uploaded-to question
/// that has no answer of its own.
fn format_details(form: &Form, submission: &Submission) -> Vec<ResponseDetail> {
    let mut details: Vec<ResponseDetail> = submission
        .answers
        .iter()
        .map(|answer| {
            let question = form.questions().iter().find(|q| q.id == answer.question_id);
            let value = match question {
                Some(q) => answer_formatter::format_answer(q, answer.value.as_deref()),
                None => answer.text().to_string(),
            };
            ResponseDetail::new(answer.question_id.clone(), value)
        })
        .collect();

    let upload_details = attachment_processor::upload_details(&submission.file_uploads, &details);
    details.extend(upload_details);
    details
}

async fn write_submission(
    tx: &mut dyn SubmissionTransaction,
    new_response: &NewResponse,
    details: &[ResponseDetail],
    submission: &Submission,
    uploaded_at: DateTime<Utc>,
    inserted_id: &mut Option<Uuid>,
) -> Result<Uuid, StoreError> {
    let response_id = tx.insert_response(new_response).await?;
    *inserted_id = Some(response_id);

    tx.insert_response_details(response_id, details).await?;

    let uploads = &submission.file_uploads;
    let attachments = attachment_processor::build_attachments(response_id, uploads, uploaded_at);
    if !attachments.is_empty() {
        tx.insert_file_attachments(attachments).await?;
        tx.commit_pending_attachment_writes().await?;
    }

    Ok(response_id)
}

fn persistence_failure(error: &StoreError) -> SubmissionError {
    SubmissionError::PersistenceFailure(format!(
        "{}: {}",
        MSG_SUBMISSION_ERROR_PREFIX,
        innermost_message(error)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use crate::core::config::SubmissionLimits;
    use crate::features::forms::models::FormStatus;
    use crate::features::responses::models::{Answer, FileUpload};
    use crate::features::responses::repositories::memory::{
        FailPoint, InMemoryForms, InMemorySubmissionStore,
    };
    use crate::shared::test_helpers::{choice_question, form_with, question};

    fn claims(user_id: &str) -> BTreeMap<String, String> {
        BTreeMap::from([("sub".to_string(), user_id.to_string())])
    }

    fn service(form: Form, store: &InMemorySubmissionStore) -> SubmissionService {
        SubmissionService::new(
            Arc::new(InMemoryForms::with(form)),
            Arc::new(store.clone()),
            SubmissionValidator::new(SubmissionLimits::default()),
            IdentityResolver::default(),
        )
    }

    fn pdf(question_id: &str, name: &str, size: usize) -> FileUpload {
        FileUpload {
            question_id: question_id.to_string(),
            file_name: name.to_string(),
            content_type: "application/pdf".to_string(),
            data: vec![1u8; size],
        }
    }

    #[tokio::test]
    async fn test_successful_submission_commits_everything() {
        let form = form_with(
            FormStatus::Published,
            vec![
                question("q1", "Name", "text", true),
                choice_question(
                    "q2",
                    "checkbox",
                    &[("opt1", "Option 1"), ("opt2", "Option 2"), ("opt3", "Option 3")],
                ),
                question("q3", "Attachments", "fileupload", false),
            ],
        );
        let store = InMemorySubmissionStore::new();
        let submission = Submission {
            answers: vec![Answer::new("q1", "Ada"), Answer::new("q2", "Option 1, Option 2")],
            file_uploads: vec![pdf("q3", "a.pdf", 3), pdf("q3", "b.pdf", 4)],
        };

        let (result, trace) = service(form, &store)
            .submit_traced("f1", submission, &claims("42"))
            .await;

        assert!(result.success, "{}", result.message);
        assert_eq!(result.message, "Response submitted successfully.");
        let response = result.data.unwrap();
        assert_eq!(response.user_id, 42);
        assert_eq!(response.form_id, "f1");
        assert_eq!(response.details.len(), 3);
        assert_eq!(response.details[1].answer, r#"["opt1","opt2"]"#);
        assert_eq!(response.details[2].question_id, "q3");
        assert!(response.details[2].answer.contains("a.pdf"));
        assert!(response.details[2].answer.contains("b.pdf"));

        assert_eq!(
            trace.states,
            vec![
                SubmissionState::Validating,
                SubmissionState::Formatting,
                SubmissionState::Persisting,
                SubmissionState::Committed,
            ]
        );

        let state = store.state().await;
        assert_eq!(state.commits, 1);
        assert_eq!(state.responses.len(), 1);
        assert_eq!(state.attachments.len(), 2);
        assert!(state
            .attachments
            .iter()
            .all(|a| a.response_id == response.id && a.question_id == "q3"));
        assert_eq!(state.details[&response.id], response.details);
    }

    #[tokio::test]
    async fn test_invalid_identity_touches_nothing() {
        let form = form_with(FormStatus::Published, vec![]);
        let store = InMemorySubmissionStore::new();

        for bad in ["", "abc", "0", "-5"] {
            let result = service(form.clone(), &store)
                .submit("f1", Submission::default(), &claims(bad))
                .await;
            assert!(!result.success);
            assert_eq!(result.message, "Invalid user ID.");
            assert_eq!(result.error, Some(SubmissionError::InvalidIdentity));
        }

        let missing = BTreeMap::new();
        let result = service(form, &store)
            .submit("f1", Submission::default(), &missing)
            .await;
        assert_eq!(result.message, "Invalid user ID.");
        assert_eq!(store.state().await.begins, 0);
    }

    #[tokio::test]
    async fn test_empty_form_id_is_rejected() {
        let store = InMemorySubmissionStore::new();
        let result = service(form_with(FormStatus::Published, vec![]), &store)
            .submit("  ", Submission::default(), &claims("1"))
            .await;
        assert_eq!(result.message, "Form ID is required.");
        assert!(result.data.is_none());
    }

    #[tokio::test]
    async fn test_unknown_form_is_rejected() {
        let store = InMemorySubmissionStore::new();
        let result = service(form_with(FormStatus::Published, vec![]), &store)
            .submit("missing", Submission::default(), &claims("1"))
            .await;
        assert_eq!(result.message, "Invalid form ID.");
        assert!(matches!(result.error, Some(SubmissionError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_unpublished_form_performs_no_writes() {
        let store = InMemorySubmissionStore::new();
        let (result, trace) = service(form_with(FormStatus::Draft, vec![]), &store)
            .submit_traced("f1", Submission::default(), &claims("1"))
            .await;

        assert!(!result.success);
        assert_eq!(result.message, "Cannot submit to an unpublished form.");
        assert_eq!(trace.final_state(), Some(SubmissionState::Rejected));
        assert_eq!(store.state().await.begins, 0);
    }

    #[tokio::test]
    async fn test_missing_required_answer_is_rejected() {
        let form = form_with(
            FormStatus::Published,
            vec![question("q1", "What is your name?", "text", true)],
        );
        let store = InMemorySubmissionStore::new();
        let result = service(form, &store)
            .submit("f1", Submission::default(), &claims("1"))
            .await;

        assert!(!result.success);
        assert_eq!(result.message, "Question 'What is your name?' is required.");
        assert!(result.data.is_none());
        assert_eq!(store.state().await.begins, 0);
    }

    #[tokio::test]
    async fn test_oversized_upload_is_rejected() {
        let store = InMemorySubmissionStore::new();
        let submission = Submission {
            answers: vec![],
            file_uploads: vec![pdf("q1", "big.pdf", 6 * 1024 * 1024)],
        };
        let result = service(form_with(FormStatus::Published, vec![]), &store)
            .submit("f1", submission, &claims("1"))
            .await;

        assert!(!result.success);
        assert!(result.message.contains("exceeds maximum size of 5MB"));
        assert_eq!(store.state().await.begins, 0);
    }

    #[tokio::test]
    async fn test_attachment_failure_rolls_back_and_compensates_once() {
        let store = InMemorySubmissionStore::failing_at(FailPoint::CommitAttachments);
        let submission = Submission {
            answers: vec![],
            file_uploads: vec![pdf("q1", "a.pdf", 10)],
        };

        let (result, trace) = service(form_with(FormStatus::Published, vec![]), &store)
            .submit_traced("f1", submission, &claims("7"))
            .await;

        assert!(!result.success);
        assert!(result.data.is_none());
        assert_eq!(
            result.message,
            "An error occurred while submitting the response: CommitAttachments failed"
        );
        assert_eq!(trace.final_state(), Some(SubmissionState::RolledBack));
        assert_eq!(trace.rollback, Some(CleanupOutcome::Ok));
        assert_eq!(trace.cleanup, Some(CleanupOutcome::Ok));

        let state = store.state().await;
        assert_eq!(state.delete_calls, vec![trace.response_id.unwrap()]);
        assert_eq!(state.rollbacks, 1);
        assert_eq!(state.commits, 0);
        assert!(state.responses.is_empty());
        assert!(state.attachments.is_empty());
    }

    #[tokio::test]
    async fn test_failed_cleanup_is_traced_not_surfaced() {
        let store = InMemorySubmissionStore::failing_at_all(&[
            FailPoint::InsertDetails,
            FailPoint::Delete,
        ]);
        let submission = Submission {
            answers: vec![Answer::new("q1", "hello")],
            file_uploads: vec![],
        };

        let (result, trace) = service(form_with(FormStatus::Published, vec![]), &store)
            .submit_traced("f1", submission, &claims("7"))
            .await;

        assert_eq!(
            result.message,
            "An error occurred while submitting the response: InsertDetails failed"
        );
        assert_eq!(
            trace.cleanup,
            Some(CleanupOutcome::Failed("Delete failed".to_string()))
        );
        assert_eq!(store.state().await.delete_calls.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_response_insert_needs_no_compensation() {
        let store = InMemorySubmissionStore::failing_at(FailPoint::InsertResponse);
        let (result, trace) = service(form_with(FormStatus::Published, vec![]), &store)
            .submit_traced("f1", Submission::default(), &claims("7"))
            .await;

        assert!(!result.success);
        assert_eq!(trace.response_id, None);
        assert_eq!(trace.cleanup, None);
        assert_eq!(trace.rollback, Some(CleanupOutcome::Ok));
        assert!(store.state().await.delete_calls.is_empty());
    }

    #[tokio::test]
    async fn test_commit_failure_compensates_without_rollback() {
        let store = InMemorySubmissionStore::failing_at(FailPoint::Commit);
        let (result, trace) = service(form_with(FormStatus::Published, vec![]), &store)
            .submit_traced("f1", Submission::default(), &claims("7"))
            .await;

        assert!(!result.success);
        assert_eq!(trace.rollback, None);
        assert_eq!(trace.cleanup, Some(CleanupOutcome::Ok));
        assert_eq!(store.state().await.delete_calls.len(), 1);
    }

    #[tokio::test]
    async fn test_text_answer_wins_over_upload_for_same_question() {
        let store = InMemorySubmissionStore::new();
        let submission = Submission {
            answers: vec![Answer::new("q1", "see attachment")],
            file_uploads: vec![pdf("q1", "a.pdf", 1)],
        };
        let result = service(form_with(FormStatus::Published, vec![]), &store)
            .submit("f1", submission, &claims("7"))
            .await;

        let response = result.data.unwrap();
        assert_eq!(response.details, vec![ResponseDetail::new("q1", "see attachment")]);
        assert_eq!(store.state().await.attachments.len(), 1);
    }

    #[tokio::test]
    async fn test_unmatched_radio_answer_is_stored_raw() {
        let form = form_with(
            FormStatus::Published,
            vec![choice_question("q1", "radio", &[("opt1", "Option 1")])],
        );
        let store = InMemorySubmissionStore::new();
        let submission = Submission {
            answers: vec![Answer::new("q1", "Unknown Option")],
            file_uploads: vec![],
        };
        let result = service(form, &store)
            .submit("f1", submission, &claims("7"))
            .await;

        assert_eq!(result.data.unwrap().details[0].answer, "Unknown Option");
    }

    #[tokio::test]
    async fn test_lone_comma_checkbox_answer_is_stored_raw() {
        let form = form_with(
            FormStatus::Published,
            vec![choice_question("q1", "checkbox", &[("opt1", "Option 1")])],
        );
        let store = InMemorySubmissionStore::new();
        let submission = Submission {
            answers: vec![Answer::new("q1", ",")],
            file_uploads: vec![],
        };
        let result = service(form, &store)
            .submit("f1", submission, &claims("7"))
            .await;

        assert_eq!(result.data.unwrap().details[0].answer, ",");
    }

    #[tokio::test]
    async fn test_form_lookup_failure_is_reported() {
        let store = InMemorySubmissionStore::new();
        let service = SubmissionService::new(
            Arc::new(InMemoryForms::unavailable()),
            Arc::new(store.clone()),
            SubmissionValidator::new(SubmissionLimits::default()),
            IdentityResolver::default(),
        );

        let (result, trace) = service
            .submit_traced("f1", Submission::default(), &claims("7"))
            .await;

        assert!(matches!(
            result.error,
            Some(SubmissionError::PersistenceFailure(_))
        ));
        assert!(result.message.ends_with("form store offline"));
        assert_eq!(trace.final_state(), Some(SubmissionState::Rejected));
        assert_eq!(store.state().await.begins, 0);
    }
}
