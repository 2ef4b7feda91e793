//! In-process storage used for `CATS_STORAGE=memory` and in tests.
//!
//! Rows live in ordered maps behind a `tokio::sync::RwLock`, so listing is in
//! id order and writers are serialized. Ids come from a counter that only
//! moves forward, which keeps deleted ids from being handed out again.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::database::models::{Cat, CatFields, CatFilter, CatPatch, User};
use crate::database::repository::{CatRepository, StoreError, UserRepository};

struct Table<T> {
    last_id: i64,
    rows: BTreeMap<i64, T>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self { last_id: 0, rows: BTreeMap::new() }
    }
}

impl<T> Table<T> {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }
}

#[derive(Default)]
pub struct MemoryCatRepository {
    table: RwLock<Table<Cat>>,
}

impl MemoryCatRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatRepository for MemoryCatRepository {
    async fn create(&self, fields: CatFields) -> Result<Cat, StoreError> {
        let mut table = self.table.write().await;
        let id = table.next_id();
        let cat = Cat::from_fields(id, fields);
        table.rows.insert(id, cat.clone());
        Ok(cat)
    }

    async fn get(&self, id: i64) -> Result<Cat, StoreError> {
        let table = self.table.read().await;
        table.rows.get(&id).cloned().ok_or_else(|| StoreError::cat_not_found(id))
    }

    async fn list(&self, filter: &CatFilter) -> Result<Vec<Cat>, StoreError> {
        let table = self.table.read().await;
        Ok(table.rows.values().filter(|cat| filter.matches(cat)).cloned().collect())
    }

    async fn update(&self, id: i64, fields: CatFields) -> Result<Cat, StoreError> {
        let mut table = self.table.write().await;
        let row = table.rows.get_mut(&id).ok_or_else(|| StoreError::cat_not_found(id))?;
        *row = Cat::from_fields(id, fields);
        Ok(row.clone())
    }

    async fn patch(&self, id: i64, patch: CatPatch) -> Result<Cat, StoreError> {
        let mut table = self.table.write().await;
        let row = table.rows.get_mut(&id).ok_or_else(|| StoreError::cat_not_found(id))?;
        *row = Cat::from_fields(id, patch.apply_to(row));
        Ok(row.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let mut table = self.table.write().await;
        table.rows.remove(&id).map(|_| ()).ok_or_else(|| StoreError::cat_not_found(id))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryUserRepository {
    table: RwLock<Table<User>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create(&self, username: &str, password_hash: &str) -> Result<User, StoreError> {
        let mut table = self.table.write().await;
        if table.rows.values().any(|u| u.username == username) {
            return Err(StoreError::Conflict(format!("username '{}' is taken", username)));
        }
        let id = table.next_id();
        let user = User {
            id,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            is_active: true,
            created_at: Utc::now(),
        };
        table.rows.insert(id, user.clone());
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let table = self.table.read().await;
        Ok(table.rows.values().find(|u| u.username == username).cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        let table = self.table.read().await;
        Ok(table.rows.get(&id).cloned())
    }

    async fn set_active(&self, username: &str, active: bool) -> Result<User, StoreError> {
        let mut table = self.table.write().await;
        let user = table
            .rows
            .values_mut()
            .find(|u| u.username == username)
            .ok_or_else(|| StoreError::user_not_found(username))?;
        user.is_active = active;
        Ok(user.clone())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
