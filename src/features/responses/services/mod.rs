pub mod answer_formatter;
pub mod attachment_processor;
mod response_query_service;
mod submission_service;
mod submission_validator;

pub use response_query_service::ResponseQueryService;
pub use submission_service::{
    CleanupOutcome, SubmissionResult, SubmissionService, SubmissionState, SubmissionTrace,
};
pub use submission_validator::SubmissionValidator;
