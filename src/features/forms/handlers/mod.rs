mod form_handler;

pub use form_handler::*;
