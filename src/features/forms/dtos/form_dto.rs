use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::forms::models::{Form, FormStatus, Question, QuestionOption};

/// Option of a choice question
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct OptionDto {
    #[validate(length(min = 1, max = 100, message = "Option id must be 1-100 characters"))]
    #[schema(example = "opt1")]
    pub id: String,
    #[validate(length(min = 1, max = 500, message = "Option value must be 1-500 characters"))]
    #[schema(example = "Option 1")]
    pub value: String,
}

/// Question definition sent when creating or updating a form
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct QuestionDto {
    #[validate(length(min = 1, max = 100, message = "Question id must be 1-100 characters"))]
    #[schema(example = "q1")]
    pub id: String,
    #[validate(length(min = 1, max = 1000, message = "Question text must be 1-1000 characters"))]
    pub text: String,
    /// `text`, `radio`, `checkbox`, `fileupload` (case-insensitive)
    #[validate(length(min = 1, max = 50, message = "Question type must be 1-50 characters"))]
    #[schema(example = "text")]
    pub question_type: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    #[validate(nested)]
    pub options: Vec<OptionDto>,
    pub description: Option<String>,
    #[serde(default)]
    pub description_enabled: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateFormDto {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
    #[validate(length(max = 5000, message = "Description must not exceed 5000 characters"))]
    pub description: Option<String>,
    #[serde(default)]
    #[validate(nested)]
    pub questions: Vec<QuestionDto>,
}

/// Partial update of a draft form; absent fields are left untouched
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateFormDto {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,
    #[validate(length(max = 5000, message = "Description must not exceed 5000 characters"))]
    pub description: Option<String>,
    #[validate(nested)]
    pub questions: Option<Vec<QuestionDto>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct QuestionResponseDto {
    pub id: String,
    pub text: String,
    pub question_type: String,
    pub required: bool,
    pub options: Vec<OptionDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FormResponseDto {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub status: FormStatus,
    pub questions: Vec<QuestionResponseDto>,
    pub created_by: i64,
    pub published_by: Option<i64>,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<QuestionDto> for Question {
    fn from(dto: QuestionDto) -> Self {
        Question {
            id: dto.id,
            text: dto.text,
            question_type: dto.question_type,
            required: dto.required,
            options: dto
                .options
                .into_iter()
                .map(|o| QuestionOption {
                    id: o.id,
                    value: o.value,
                })
                .collect(),
            description: dto.description,
            description_enabled: dto.description_enabled,
        }
    }
}

impl From<&Question> for QuestionResponseDto {
    fn from(q: &Question) -> Self {
        QuestionResponseDto {
            id: q.id.clone(),
            text: q.text.clone(),
            question_type: q.question_type.clone(),
            required: q.required,
            options: q
                .options
                .iter()
                .map(|o| OptionDto {
                    id: o.id.clone(),
                    value: o.value.clone(),
                })
                .collect(),
            description: q.visible_description().map(str::to_string),
        }
    }
}

impl From<Form> for FormResponseDto {
    fn from(form: Form) -> Self {
        FormResponseDto {
            questions: form.questions().iter().map(Into::into).collect(),
            id: form.id,
            title: form.title,
            description: form.description,
            status: form.status,
            created_by: form.created_by,
            published_by: form.published_by,
            published_at: form.published_at,
            created_at: form.created_at,
            updated_at: form.updated_at,
        }
    }
}

/// Question ids must be unique within a form, option ids within a question
pub fn check_question_identifiers(questions: &[QuestionDto]) -> Result<(), String> {
    let mut seen_questions = std::collections::HashSet::new();
    for question in questions {
        if !seen_questions.insert(question.id.as_str()) {
            return Err(format!("Duplicate question id '{}'", question.id));
        }

        let mut seen_options = std::collections::HashSet::new();
        for option in &question.options {
            if !seen_options.insert(option.id.as_str()) {
                return Err(format!(
                    "Duplicate option id '{}' in question '{}'",
                    option.id, question.id
                ));
            }
        }
    }
    Ok(())
}
