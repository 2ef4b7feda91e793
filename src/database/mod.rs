pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod repository;

use std::sync::Arc;

use tracing::info;

pub use manager::DatabaseManager;
pub use repository::{CatRepository, StoreError, UserRepository};

use crate::config::{AppConfig, StorageBackend};

/// The repositories the application runs against
#[derive(Clone)]
pub struct Storage {
    pub cats: Arc<dyn CatRepository>,
    pub users: Arc<dyn UserRepository>,
    pool: Option<sqlx::PgPool>,
}

impl Storage {
    pub fn memory() -> Self {
        Self {
            cats: Arc::new(memory::MemoryCatRepository::new()),
            users: Arc::new(memory::MemoryUserRepository::new()),
            pool: None,
        }
    }

    pub fn postgres(pool: sqlx::PgPool) -> Self {
        Self {
            cats: Arc::new(postgres::PgCatRepository::new(pool.clone())),
            users: Arc::new(postgres::PgUserRepository::new(pool.clone())),
            pool: Some(pool),
        }
    }

    /// Build the configured backend, running migrations when enabled
    pub async fn from_config(config: &AppConfig) -> Result<Self, StoreError> {
        match config.database.storage {
            StorageBackend::Memory => {
                info!("Using in-memory storage; data is lost on restart");
                Ok(Self::memory())
            }
            StorageBackend::Postgres => {
                let pool = DatabaseManager::connect(config).await?;
                if config.database.run_migrations {
                    DatabaseManager::migrate(&pool).await?;
                }
                Ok(Self::postgres(pool))
            }
        }
    }

    pub async fn health_check(&self) -> Result<(), StoreError> {
        self.cats.ping().await?;
        self.users.ping().await
    }

    /// Wait for pooled connections to be returned and close them
    pub async fn close(&self) {
        if let Some(pool) = &self.pool {
            pool.close().await;
            info!("Database pool closed");
        }
    }
}
