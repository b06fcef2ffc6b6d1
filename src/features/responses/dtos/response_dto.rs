use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::core::error::AppError;
use crate::features::responses::models::{
    Answer, FileAttachmentSummary, FileUpload, Response, ResponseDetail, Submission,
};
use crate::features::responses::services::attachment_processor::decode_content;

/// One raw answer in a submission
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AnswerDto {
    pub question_id: String,
    /// Comma-separated option values for choice questions, free text otherwise
    #[serde(default)]
    pub answer: Option<String>,
}

impl From<AnswerDto> for Answer {
    fn from(dto: AnswerDto) -> Self {
        Self {
            question_id: dto.question_id,
            value: dto.answer,
        }
    }
}

/// File sent inline as base64
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FileUploadDto {
    pub question_id: String,
    pub file_name: String,
    #[schema(example = "application/pdf")]
    pub content_type: String,
    /// Base64 file bytes, a `data:` URL prefix is accepted
    pub content: String,
}

impl FileUploadDto {
    fn decode(self) -> Result<FileUpload, AppError> {
        let data = decode_content(&self.content).map_err(|_| {
            AppError::BadRequest(format!(
                "File '{}' has invalid content encoding.",
                self.file_name
            ))
        })?;

        Ok(FileUpload {
            question_id: self.question_id,
            file_name: self.file_name,
            content_type: self.content_type,
            data,
        })
    }
}

/// Request DTO for submitting a response
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct SubmitResponseDto {
    #[serde(default)]
    pub answers: Vec<AnswerDto>,
    #[serde(default)]
    pub file_uploads: Vec<FileUploadDto>,
}

impl SubmitResponseDto {
    /// Decode inline files, failing on the first bad payload
    pub fn into_submission(self) -> Result<Submission, AppError> {
        let file_uploads = self
            .file_uploads
            .into_iter()
            .map(FileUploadDto::decode)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Submission {
            answers: self.answers.into_iter().map(Answer::from).collect(),
            file_uploads,
        })
    }
}

/// Multipart submission, documentation only.
/// The handler reads the `Multipart` extractor directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct SubmitMultipartDto {
    /// JSON array of `{ "question_id", "answer" }`
    #[schema(example = r#"[{"question_id":"q1","answer":"Option 1"}]"#)]
    pub answers: Option<String>,
    /// Sent as one `file:<question_id>` field per file
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub files: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ResponseDetailDto {
    pub question_id: String,
    pub answer: String,
}

impl From<ResponseDetail> for ResponseDetailDto {
    fn from(d: ResponseDetail) -> Self {
        Self {
            question_id: d.question_id,
            answer: d.answer,
        }
    }
}

/// Response DTO for a stored submission
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubmittedResponseDto {
    pub id: Uuid,
    pub form_id: String,
    pub user_id: i64,
    pub submitted_at: DateTime<Utc>,
    pub details: Vec<ResponseDetailDto>,
}

impl From<Response> for SubmittedResponseDto {
    fn from(r: Response) -> Self {
        Self {
            id: r.id,
            form_id: r.form_id,
            user_id: r.user_id,
            submitted_at: r.submitted_at,
            details: r.details.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FileAttachmentDto {
    pub id: Uuid,
    pub file_name: String,
    pub content_type: String,
    pub file_size: i64,
    pub uploaded_at: DateTime<Utc>,
}

impl From<FileAttachmentSummary> for FileAttachmentDto {
    fn from(a: FileAttachmentSummary) -> Self {
        Self {
            id: a.id,
            file_name: a.file_name,
            content_type: a.content_type,
            file_size: a.file_size,
            uploaded_at: a.uploaded_at,
        }
    }
}

/// Sibling attachments uploaded for the same question
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AttachmentGroupDto {
    pub question_id: String,
    pub files: Vec<FileAttachmentDto>,
}

impl AttachmentGroupDto {
    /// Group attachments by question, keeping first-seen question order
    pub fn group(attachments: Vec<FileAttachmentSummary>) -> Vec<Self> {
        let mut groups: Vec<Self> = Vec::new();
        for attachment in attachments {
            match groups
                .iter_mut()
                .find(|g| g.question_id == attachment.question_id)
            {
                Some(group) => group.files.push(attachment.into()),
                None => groups.push(Self {
                    question_id: attachment.question_id.clone(),
                    files: vec![attachment.into()],
                }),
            }
        }
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload_dto(name: &str, content: &str) -> FileUploadDto {
        FileUploadDto {
            question_id: "q3".to_string(),
            file_name: name.to_string(),
            content_type: "text/plain".to_string(),
            content: content.to_string(),
        }
    }

    fn summary(question_id: &str, name: &str) -> FileAttachmentSummary {
        FileAttachmentSummary {
            id: Uuid::now_v7(),
            response_id: Uuid::nil(),
            question_id: question_id.to_string(),
            file_name: name.to_string(),
            content_type: "text/plain".to_string(),
            file_size: 3,
            uploaded_at: Utc::now(),
        }
    }

    #[test]
    fn test_into_submission_decodes_files() {
        let dto = SubmitResponseDto {
            answers: vec![AnswerDto {
                question_id: "q1".to_string(),
                answer: Some("hello".to_string()),
            }],
            file_uploads: vec![upload_dto("a.txt", "YWJj")],
        };

        let submission = dto.into_submission().unwrap();

        assert_eq!(submission.answers[0].text(), "hello");
        assert_eq!(submission.file_uploads[0].data, b"abc");
        assert_eq!(submission.file_uploads[0].size(), 3);
    }

    #[test]
    fn test_into_submission_rejects_bad_base64() {
        let dto = SubmitResponseDto {
            answers: vec![],
            file_uploads: vec![upload_dto("a.txt", "YWJj"), upload_dto("b.txt", "not base64!")],
        };

        let err = dto.into_submission().unwrap_err();

        assert!(
            matches!(err, AppError::BadRequest(ref msg) if msg == "File 'b.txt' has invalid content encoding.")
        );
    }

    #[test]
    fn test_missing_answer_deserializes_as_none() {
        let dto: SubmitResponseDto =
            serde_json::from_str(r#"{"answers":[{"question_id":"q1"}]}"#).unwrap();

        assert!(dto.file_uploads.is_empty());
        assert_eq!(dto.answers[0].answer, None);
    }

    #[test]
    fn test_group_keeps_siblings_together() {
        let groups = AttachmentGroupDto::group(vec![
            summary("q3", "a.pdf"),
            summary("q3", "b.pdf"),
            summary("q5", "c.png"),
        ]);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].question_id, "q3");
        assert_eq!(groups[0].files.len(), 2);
        assert_eq!(groups[1].files[0].file_name, "c.png");
    }
}
