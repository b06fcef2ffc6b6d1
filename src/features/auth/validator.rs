use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::{decode, decode_header, Algorithm, Validation};
use serde_json::{Map, Value};

use super::jwks::{JwksClient, JwksError};
use super::model::AuthenticatedUser;
use crate::core::error::AppError;

/// Verifies RS256 bearer tokens against the issuer's published keys
pub struct JwtValidator {
    jwks_client: Arc<JwksClient>,
    validation: Validation,
}

impl JwtValidator {
    pub fn new(
        jwks_client: Arc<JwksClient>,
        issuer: String,
        audience: String,
        leeway: Duration,
    ) -> Self {
        Self {
            jwks_client,
            validation: token_validation(&issuer, &audience, leeway),
        }
    }

    pub async fn validate_token(&self, token: &str) -> Result<AuthenticatedUser, AppError> {
        let header = decode_header(token).map_err(|e| AppError::Auth(e.to_string()))?;

        if header.alg != Algorithm::RS256 {
            return Err(AppError::Auth(format!(
                "Unsupported algorithm: {:?}. Only RS256 is allowed",
                header.alg
            )));
        }

        let kid = header
            .kid
            .ok_or_else(|| AppError::Auth("Missing kid in token header".to_string()))?;
        let decoding_key = self.jwks_client.get_key(&kid).await?;

        // Which claim carries the user id is decided later by the identity resolver
        let token_data = decode::<Map<String, Value>>(token, &decoding_key, &self.validation)
            .map_err(|e| AppError::Auth(e.to_string()))?;

        Ok(AuthenticatedUser::from_claims(token_data.claims))
    }
}

fn token_validation(issuer: &str, audience: &str, leeway: Duration) -> Validation {
    let mut validation = Validation::new(Algorithm::RS256);
    validation.set_issuer(&[issuer]);
    validation.set_audience(&[audience]);
    validation.leeway = leeway.as_secs();
    validation.validate_nbf = true;
    validation
}

impl From<JwksError> for AppError {
    fn from(err: JwksError) -> Self {
        AppError::Auth(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_validation_settings() {
        let validation =
            token_validation("https://id.example.com", "formflow", Duration::from_secs(30));

        assert_eq!(validation.algorithms, vec![Algorithm::RS256]);
        assert_eq!(validation.leeway, 30);
        assert!(validation.validate_nbf);
        assert!(validation
            .iss
            .as_ref()
            .is_some_and(|iss| iss.contains("https://id.example.com")));
        assert!(validation
            .aud
            .as_ref()
            .is_some_and(|aud| aud.contains("formflow")));
    }

    #[tokio::test]
    async fn test_rejects_malformed_token() {
        let client = Arc::new(JwksClient::new("https://id.example.com", Duration::from_secs(60)));
        let validator = JwtValidator::new(
            client,
            "https://id.example.com".to_string(),
            "formflow".to_string(),
            Duration::from_secs(0),
        );

        let err = validator.validate_token("not-a-jwt").await.unwrap_err();
        assert!(matches!(err, AppError::Auth(_)));
    }
}
