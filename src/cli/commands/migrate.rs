use crate::cli::utils::{output_success, require_database};
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::DatabaseManager;

pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    require_database(&config)?;

    let pool = DatabaseManager::connect(&config).await?;
    DatabaseManager::migrate(&pool).await?;
    pool.close().await;

    output_success(output_format, "Migrations applied", None)
}
