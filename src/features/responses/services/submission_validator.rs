use crate::core::config::SubmissionLimits;
use crate::features::forms::models::Form;
use crate::features::responses::error::SubmissionError;
use crate::features::responses::models::{FileUpload, Submission};
use crate::shared::constants::MSG_UNPUBLISHED_FORM;

/// Checks a submission against its form's question schema and upload limits.
///
/// Rules run in a fixed order and the first failure is returned: the form
/// must be published, then required questions are checked in question
/// order, then every upload is checked for size and MIME type.
#[derive(Debug, Clone)]
pub struct SubmissionValidator {
    limits: SubmissionLimits,
}

impl SubmissionValidator {
    pub fn new(limits: SubmissionLimits) -> Self {
        Self { limits }
    }

    pub fn validate(&self, form: &Form, submission: &Submission) -> Result<(), SubmissionError> {
        if !form.is_published() {
            return Err(SubmissionError::InvalidInput(
                MSG_UNPUBLISHED_FORM.to_string(),
            ));
        }

        for question in form.questions().iter().filter(|q| q.required) {
            if question.is_file_upload() {
                if !submission.has_upload_for(&question.id) {
                    return Err(SubmissionError::ValidationFailed(format!(
                        "File upload for '{}' is required.",
                        question.text
                    )));
                }
            } else {
                let answered = submission
                    .answers
                    .iter()
                    .any(|a| a.question_id == question.id && !a.text().trim().is_empty());
                if !answered {
                    return Err(SubmissionError::ValidationFailed(format!(
                        "Question '{}' is required.",
                        question.text
                    )));
                }
            }
        }

        // Uploads are checked whether or not they reference a known question
        for upload in &submission.file_uploads {
            self.validate_upload(upload)?;
        }

        Ok(())
    }

    fn validate_upload(&self, upload: &FileUpload) -> Result<(), SubmissionError> {
        if upload.size() > self.limits.max_file_size {
            return Err(SubmissionError::ValidationFailed(format!(
                "File '{}' exceeds maximum size of {}.",
                upload.file_name,
                self.limits.max_file_size_label()
            )));
        }

        if !self.limits.is_mime_type_allowed(&upload.content_type) {
            return Err(SubmissionError::ValidationFailed(format!(
                "File type '{}' for '{}' is not allowed.",
                upload.content_type, upload.file_name
            )));
        }

        Ok(())
    }
}
