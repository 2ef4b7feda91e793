use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::info;

use crate::config::AppConfig;
use crate::database::repository::StoreError;

/// Opens and prepares the Postgres connection pool
pub struct DatabaseManager;

impl DatabaseManager {
    /// Connect using the configured URL and pool limits
    pub async fn connect(config: &AppConfig) -> Result<PgPool, StoreError> {
        let url = config
            .database
            .url
            .as_deref()
            .ok_or_else(|| StoreError::Connection("DATABASE_URL is not configured".to_string()))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.database.max_connections)
            .acquire_timeout(config.connection_timeout())
            .connect(url)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        info!("Connected to database: {}", Self::redacted_url(url));
        Ok(pool)
    }

    /// Apply the embedded migrations under `migrations/`
    pub async fn migrate(pool: &PgPool) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    /// Connection string with the password removed, for logs
    pub fn redacted_url(url: &str) -> String {
        match url::Url::parse(url) {
            Ok(mut parsed) => {
                if parsed.password().is_some() {
                    // Only fails for cannot-be-a-base URLs, which have no password
                    let _ = parsed.set_password(Some("***"));
                }
                parsed.to_string()
            }
            Err(_) => "<invalid database url>".to_string(),
        }
    }
}
