use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Read access to the claims carried by a caller's credential
pub trait ClaimSet: Send + Sync {
    fn claim(&self, name: &str) -> Option<&str>;
}

/// Caller authenticated by the bearer token middleware
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    /// Scalar claims of the validated token, numbers rendered as strings
    pub claims: BTreeMap<String, String>,
}

impl AuthenticatedUser {
    /// Build from decoded JWT claims, keeping string, number and bool values.
    /// Nested objects and arrays are not addressable by claim name and are dropped.
    pub fn from_claims(raw: serde_json::Map<String, serde_json::Value>) -> Self {
        let claims = raw
            .into_iter()
            .filter_map(|(name, value)| {
                let value = match value {
                    serde_json::Value::String(s) => s,
                    serde_json::Value::Number(n) => n.to_string(),
                    serde_json::Value::Bool(b) => b.to_string(),
                    _ => return None,
                };
                Some((name, value))
            })
            .collect();

        Self { claims }
    }

    pub fn subject(&self) -> Option<&str> {
        self.claim("sub")
    }
}

impl ClaimSet for AuthenticatedUser {
    fn claim(&self, name: &str) -> Option<&str> {
        self.claims.get(name).map(String::as_str)
    }
}

impl ClaimSet for BTreeMap<String, String> {
    fn claim(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}
