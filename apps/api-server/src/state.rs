//! Application state - shared across all handlers.

use std::sync::Arc;

use hive_core::ports::{PostRepository, UploadSigner, UserRepository};
use hive_infra::{ImageKitSigner, InMemoryPostRepository, InMemoryUserRepository};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub uploads: Arc<dyn UploadSigner>,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        let uploads: Arc<dyn UploadSigner> = Arc::new(ImageKitSigner::new(config.upload.clone()));

        #[cfg(feature = "postgres")]
        {
            use hive_infra::{PostgresPostRepository, PostgresUserRepository, database};

            if let Some(db_config) = &config.database {
                match database::connect(db_config).await {
                    Ok(conn) => {
                        tracing::info!("Application state initialized (postgres)");
                        return Self {
                            users: Arc::new(PostgresUserRepository::new(conn.clone())),
                            posts: Arc::new(PostgresPostRepository::new(conn)),
                            uploads,
                        };
                    }
                    Err(e) => {
                        tracing::error!(
                            "Failed to connect to database: {}. Using in-memory fallback.",
                            e
                        );
                    }
                }
            } else {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            }
        }

        #[cfg(not(feature = "postgres"))]
        tracing::info!("Running without postgres feature - using in-memory repositories");

        Self::in_memory(uploads)
    }

    /// In-memory state, used as the no-database fallback and by tests.
    pub fn in_memory(uploads: Arc<dyn UploadSigner>) -> Self {
        Self {
            users: Arc::new(InMemoryUserRepository::new()),
            posts: Arc::new(InMemoryPostRepository::new()),
            uploads,
        }
    }

    /// In-memory state with throwaway upload credentials, for tests.
    #[cfg(test)]
    pub fn for_tests() -> Self {
        use hive_infra::UploadConfig;

        Self::in_memory(Arc::new(ImageKitSigner::new(UploadConfig {
            url_endpoint: "https://ik.example.com/test".to_string(),
            public_key: "public_test".to_string(),
            private_key: "private_test".to_string(),
            token_ttl_secs: 600,
        })))
    }
}
