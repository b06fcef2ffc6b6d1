#[cfg(test)]
use crate::features::auth::model::AuthenticatedUser;
#[cfg(test)]
use crate::features::forms::models::{Form, FormStatus, Question, QuestionOption};

#[cfg(test)]
use axum::{extract::Request, middleware::Next, response::Response, Router};

/// Caller whose primary identity claim is `user_id`
#[cfg(test)]
pub fn create_user(user_id: &str) -> AuthenticatedUser {
    let mut user = AuthenticatedUser::default();
    user.claims.insert("sub".to_string(), user_id.to_string());
    user
}

#[cfg(test)]
async fn inject_user_middleware(mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(create_user("42"));
    next.run(request).await
}

/// Wrap a router so every request is authenticated as user 42
#[cfg(test)]
pub fn with_test_user(router: Router) -> Router {
    router.layer(axum::middleware::from_fn(inject_user_middleware))
}

#[cfg(test)]
pub fn question(id: &str, text: &str, question_type: &str, required: bool) -> Question {
    Question {
        id: id.to_string(),
        text: text.to_string(),
        question_type: question_type.to_string(),
        required,
        options: vec![],
        description: None,
        description_enabled: false,
    }
}

#[cfg(test)]
pub fn choice_question(id: &str, question_type: &str, options: &[(&str, &str)]) -> Question {
    Question {
        options: options
            .iter()
            .map(|(option_id, value)| QuestionOption {
                id: option_id.to_string(),
                value: value.to_string(),
            })
            .collect(),
        ..question(id, "Choose", question_type, false)
    }
}

#[cfg(test)]
pub fn form_with(status: FormStatus, questions: Vec<Question>) -> Form {
    let now = chrono::Utc::now();
    Form {
        id: "f1".to_string(),
        title: "Feedback".to_string(),
        description: None,
        status,
        questions: sqlx::types::Json(questions),
        created_by: 1,
        published_by: None,
        published_at: None,
        created_at: now,
        updated_at: now,
    }
}
