mod postgres;
mod store;

#[cfg(test)]
pub mod memory;

pub use postgres::PgSubmissionStore;
pub use store::{FormLookup, StoreResult, SubmissionStore, SubmissionTransaction};
