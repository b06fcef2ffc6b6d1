mod form;

pub use form::{Form, FormStatus, Question, QuestionKind, QuestionOption};
