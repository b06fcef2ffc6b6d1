mod jwks;
mod validator;

pub mod identity;
pub mod model;

pub use identity::{Identity, IdentityResolver, InvalidIdentity};
pub use jwks::JwksClient;
pub use validator::JwtValidator;
