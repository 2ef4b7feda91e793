//! Storage ports for cats and API users, and the errors their adapters raise.

use async_trait::async_trait;
use thiserror::Error;

use crate::database::models::{Cat, CatFields, CatFilter, CatPatch, User};

/// Errors raised by any storage adapter
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Constraint violated: {0}")]
    Constraint(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

impl StoreError {
    pub fn cat_not_found(id: i64) -> Self {
        StoreError::NotFound { entity: "cat", id: id.to_string() }
    }

    pub fn user_not_found(key: impl ToString) -> Self {
        StoreError::NotFound { entity: "user", id: key.to_string() }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

#[async_trait]
pub trait CatRepository: Send + Sync {
    /// Insert a new row and return it with its assigned id.
    async fn create(&self, fields: CatFields) -> Result<Cat, StoreError>;

    async fn get(&self, id: i64) -> Result<Cat, StoreError>;

    /// All rows matching `filter`, ordered by id.
    async fn list(&self, filter: &CatFilter) -> Result<Vec<Cat>, StoreError>;

    /// Replace name, age and gender of an existing row.
    async fn update(&self, id: i64, fields: CatFields) -> Result<Cat, StoreError>;

    /// Change only the supplied fields of an existing row.
    async fn patch(&self, id: i64, patch: CatPatch) -> Result<Cat, StoreError>;

    async fn delete(&self, id: i64) -> Result<(), StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `StoreError::Conflict` when the username is taken.
    async fn create(&self, username: &str, password_hash: &str) -> Result<User, StoreError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError>;

    /// Enable or disable login for a user. Tokens of inactive users stop working.
    async fn set_active(&self, username: &str, active: bool) -> Result<User, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}
