pub mod dtos;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

pub use repositories::{FormLookup, PgSubmissionStore};
pub use routes::routes;
pub use services::{ResponseQueryService, SubmissionService, SubmissionValidator};
