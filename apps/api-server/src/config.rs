//! Application configuration loaded from environment variables.
//!
//! All external-collaborator credentials (database, token secret, image-host
//! keys) are resolved once at process start and passed down explicitly.

use std::env;

use hive_infra::database::DatabaseConfig;
use hive_infra::{JwtConfig, UploadConfig};

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseConfig>,
    pub jwt: JwtConfig,
    pub upload: UploadConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database = env::var("DATABASE_URL").ok().map(|url| DatabaseConfig {
            url,
            max_connections: env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(100),
            min_connections: env::var("DB_MIN_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
        });

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            database,
            jwt: jwt_config_from_env(),
            upload: UploadConfig::from_env(),
        }
    }
}

fn jwt_config_from_env() -> JwtConfig {
    let secret =
        env::var("JWT_SECRET").unwrap_or_else(|_| "change-me-in-production".to_string());

    if secret == "change-me-in-production" {
        let is_production = env::var("RUST_ENV")
            .map(|v| v == "production" || v == "prod")
            .unwrap_or(false);

        if is_production {
            tracing::error!(
                "SECURITY: Using default JWT secret in production! Set JWT_SECRET environment variable."
            );
        } else {
            tracing::warn!("Using default JWT secret. Set JWT_SECRET for production use.");
        }
    }

    JwtConfig {
        secret,
        expiration_hours: env::var("JWT_EXPIRATION_HOURS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(24),
        issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "hivepress-idp".to_string()),
    }
}
