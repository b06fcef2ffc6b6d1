use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow, Type};
use utoipa::ToSchema;

/// Form lifecycle status matching the `form_status` database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "form_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FormStatus {
    Draft,
    Published,
}

impl std::fmt::Display for FormStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormStatus::Draft => write!(f, "draft"),
            FormStatus::Published => write!(f, "published"),
        }
    }
}

/// How answers to a question are validated and formatted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionKind {
    Text,
    SingleChoice,
    MultipleChoice,
    FileUpload,
    Unrecognized,
}

impl QuestionKind {
    /// Case-insensitive mapping of a question type tag
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "text" | "textarea" | "paragraph" | "shorttext" | "longtext" => QuestionKind::Text,
            "radio" | "dropdown" | "select" | "singlechoice" | "single_choice" => {
                QuestionKind::SingleChoice
            }
            "checkbox" | "multiplechoice" | "multiple_choice" | "multichoice" => {
                QuestionKind::MultipleChoice
            }
            "fileupload" | "file" => QuestionKind::FileUpload,
            _ => QuestionKind::Unrecognized,
        }
    }

    pub fn is_choice(&self) -> bool {
        matches!(self, QuestionKind::SingleChoice | QuestionKind::MultipleChoice)
    }
}

/// One selectable choice of a question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOption {
    /// May be empty on rows written before option ids were enforced
    #[serde(default)]
    pub id: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub text: String,
    /// Raw type tag as authored, see [`QuestionKind::from_tag`]
    pub question_type: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub options: Vec<QuestionOption>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub description_enabled: bool,
}

impl Question {
    pub fn kind(&self) -> QuestionKind {
        QuestionKind::from_tag(&self.question_type)
    }

    pub fn is_file_upload(&self) -> bool {
        self.kind() == QuestionKind::FileUpload
    }

    /// Description as presented to clients, only when enabled
    pub fn visible_description(&self) -> Option<&str> {
        if self.description_enabled {
            self.description.as_deref()
        } else {
            None
        }
    }
}

/// Database model for forms
#[derive(Debug, Clone, FromRow)]
pub struct Form {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub status: FormStatus,
    pub questions: Json<Vec<Question>>,
    pub created_by: i64,
    pub published_by: Option<i64>,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Form {
    pub fn is_published(&self) -> bool {
        self.status == FormStatus::Published
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions.0
    }
}
