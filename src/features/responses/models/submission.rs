/// Raw answer as sent by the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub question_id: String,
    /// `None` is treated as an empty answer
    pub value: Option<String>,
}

impl Answer {
    pub fn new(question_id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            question_id: question_id.into(),
            value: Some(value.into()),
        }
    }

    pub fn text(&self) -> &str {
        self.value.as_deref().unwrap_or("")
    }
}

/// Decoded file upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub question_id: String,
    pub file_name: String,
    /// MIME type declared by the client
    pub content_type: String,
    pub data: Vec<u8>,
}

impl FileUpload {
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Untyped client submission for one form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Submission {
    pub answers: Vec<Answer>,
    pub file_uploads: Vec<FileUpload>,
}

impl Submission {
    pub fn has_upload_for(&self, question_id: &str) -> bool {
        self.file_uploads.iter().any(|f| f.question_id == question_id)
    }
}
