use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

pub const USERNAME_MAX_LEN: usize = 150;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}
