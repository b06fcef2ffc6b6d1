use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

use crate::core::config::DatabaseConfig;

pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    tracing::debug!(
        "Connecting to database {} (max_connections={}, min_connections={})",
        redacted_url(&config.url),
        config.max_connections,
        config.min_connections
    );

    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
        .connect(&config.url)
        .await
}

/// Host part of a connection URL, credentials stripped for logging
fn redacted_url(url: &str) -> &str {
    url.rsplit('@').next().unwrap_or("***")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redacted_url_strips_credentials() {
        assert_eq!(
            redacted_url("postgres://app:secret@db:5432/formflow"),
            "db:5432/formflow"
        );
        assert_eq!(redacted_url("postgres://db/formflow"), "postgres://db/formflow");
    }
}
