mod response_handler;

pub use response_handler::*;
