mod form_service;

pub use form_service::{validate_form_input, FormService};
