//! Resolution of the submitting user's numeric identity from token claims.

use crate::core::config::AuthConfig;
use crate::features::auth::model::ClaimSet;

/// Numeric identity of an authenticated caller. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    user_id: i64,
}

impl Identity {
    pub fn new(user_id: i64) -> Option<Self> {
        (user_id > 0).then_some(Self { user_id })
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Invalid user ID.")]
pub struct InvalidIdentity;

/// Two-key claim lookup: the primary claim first, then the fallback claim.
#[derive(Debug, Clone)]
pub struct IdentityResolver {
    primary_claim: String,
    fallback_claim: String,
}

impl IdentityResolver {
    pub fn new(primary_claim: impl Into<String>, fallback_claim: impl Into<String>) -> Self {
        Self {
            primary_claim: primary_claim.into(),
            fallback_claim: fallback_claim.into(),
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(
            config.user_id_claim.clone(),
            config.user_id_fallback_claim.clone(),
        )
    }

    pub fn resolve(&self, claims: &dyn ClaimSet) -> Result<Identity, InvalidIdentity> {
        // The fallback is consulted only when the primary claim is absent,
        // a present but malformed primary claim is rejected as-is.
        let raw = claims
            .claim(&self.primary_claim)
            .or_else(|| claims.claim(&self.fallback_claim))
            .ok_or(InvalidIdentity)?;

        raw.trim()
            .parse::<i64>()
            .ok()
            .and_then(Identity::new)
            .ok_or(InvalidIdentity)
    }
}

impl Default for IdentityResolver {
    fn default() -> Self {
        Self::new("sub", "user_id")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn claims(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_primary_claim_wins() {
        let resolver = IdentityResolver::default();
        let identity = resolver
            .resolve(&claims(&[("sub", "7"), ("user_id", "9")]))
            .unwrap();
        assert_eq!(identity.user_id(), 7);
    }

    #[test]
    fn test_fallback_claim_used_when_primary_missing() {
        let resolver = IdentityResolver::default();
        let identity = resolver.resolve(&claims(&[("user_id", "9")])).unwrap();
        assert_eq!(identity.user_id(), 9);
    }

    #[test]
    fn test_rejects_missing_non_numeric_and_non_positive() {
        let resolver = IdentityResolver::default();
        assert_eq!(resolver.resolve(&claims(&[])), Err(InvalidIdentity));
        assert_eq!(
            resolver.resolve(&claims(&[("sub", "abc")])),
            Err(InvalidIdentity)
        );
        assert_eq!(resolver.resolve(&claims(&[("sub", "0")])), Err(InvalidIdentity));
        assert_eq!(
            resolver.resolve(&claims(&[("user_id", "-3")])),
            Err(InvalidIdentity)
        );
    }

    #[test]
    fn test_custom_claim_names() {
        let resolver = IdentityResolver::new("nameid", "uid");
        let identity = resolver.resolve(&claims(&[("uid", "12")])).unwrap();
        assert_eq!(identity.user_id(), 12);
        assert_eq!(InvalidIdentity.to_string(), "Invalid user ID.");
    }
}
