use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::models::{Cat, CatFields, CatFilter, CatPatch, User};
use crate::database::repository::{CatRepository, StoreError, UserRepository};

const CAT_COLUMNS: &str = "id, name, age, gender";
const USER_COLUMNS: &str = "id, username, password_hash, is_active, created_at";

// SQLSTATE codes surfaced as domain errors instead of generic failures
const UNIQUE_VIOLATION: &str = "23505";
const STRING_DATA_RIGHT_TRUNCATION: &str = "22001";
const NUMERIC_VALUE_OUT_OF_RANGE: &str = "22003";
const CHECK_VIOLATION: &str = "23514";
const NOT_NULL_VIOLATION: &str = "23502";

/// Translate database-level constraint failures on writes.
fn map_write_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.code().as_deref() {
            Some(UNIQUE_VIOLATION) => return StoreError::Conflict(db_err.message().to_string()),
            Some(STRING_DATA_RIGHT_TRUNCATION)
            | Some(NUMERIC_VALUE_OUT_OF_RANGE)
            | Some(CHECK_VIOLATION)
            | Some(NOT_NULL_VIOLATION) => {
                return StoreError::Constraint(db_err.message().to_string())
            }
            _ => {}
        }
    }
    StoreError::Sqlx(err)
}

#[derive(Clone)]
pub struct PgCatRepository {
    pool: PgPool,
}

impl PgCatRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatRepository for PgCatRepository {
    async fn create(&self, fields: CatFields) -> Result<Cat, StoreError> {
        let sql = format!("INSERT INTO cats (name, age, gender) VALUES ($1, $2, $3) RETURNING {CAT_COLUMNS}");
        sqlx::query_as::<_, Cat>(&sql)
            .bind(&fields.name)
            .bind(fields.age)
            .bind(&fields.gender)
            .fetch_one(&self.pool)
            .await
            .map_err(map_write_error)
    }

    async fn get(&self, id: i64) -> Result<Cat, StoreError> {
        let sql = format!("SELECT {CAT_COLUMNS} FROM cats WHERE id = $1");
        sqlx::query_as::<_, Cat>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::cat_not_found(id))
    }

    async fn list(&self, filter: &CatFilter) -> Result<Vec<Cat>, StoreError> {
        let sql = format!(
            "SELECT {CAT_COLUMNS} FROM cats \
             WHERE ($1::VARCHAR IS NULL OR name = $1) \
             AND ($2::INTEGER IS NULL OR age = $2) \
             AND ($3::VARCHAR IS NULL OR gender = $3) \
             ORDER BY id"
        );
        let rows = sqlx::query_as::<_, Cat>(&sql)
            .bind(filter.name.as_deref())
            .bind(filter.age)
            .bind(filter.gender.as_deref())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn update(&self, id: i64, fields: CatFields) -> Result<Cat, StoreError> {
        let sql = format!(
            "UPDATE cats SET name = $2, age = $3, gender = $4 WHERE id = $1 RETURNING {CAT_COLUMNS}"
        );
        sqlx::query_as::<_, Cat>(&sql)
            .bind(id)
            .bind(&fields.name)
            .bind(fields.age)
            .bind(&fields.gender)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_write_error)?
            .ok_or_else(|| StoreError::cat_not_found(id))
    }

    async fn patch(&self, id: i64, patch: CatPatch) -> Result<Cat, StoreError> {
        let sql = format!(
            "UPDATE cats SET \
             name = COALESCE($2, name), \
             age = COALESCE($3, age), \
             gender = COALESCE($4, gender) \
             WHERE id = $1 RETURNING {CAT_COLUMNS}"
        );
        sqlx::query_as::<_, Cat>(&sql)
            .bind(id)
            .bind(patch.name.as_deref())
            .bind(patch.age)
            .bind(patch.gender.as_deref())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_write_error)?
            .ok_or_else(|| StoreError::cat_not_found(id))
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM cats WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::cat_not_found(id));
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, username: &str, password_hash: &str) -> Result<User, StoreError> {
        let sql = format!(
            "INSERT INTO auth_users (username, password_hash) VALUES ($1, $2) RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .bind(password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match map_write_error(e) {
                StoreError::Conflict(_) => StoreError::Conflict(format!("username '{}' is taken", username)),
                other => other,
            })
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM auth_users WHERE username = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM auth_users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn set_active(&self, username: &str, active: bool) -> Result<User, StoreError> {
        let sql = format!("UPDATE auth_users SET is_active = $2 WHERE username = $1 RETURNING {USER_COLUMNS}");
        sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .bind(active)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::user_not_found(username))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
