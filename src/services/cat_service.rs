use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::api::format::{decode_fields, decode_patch};
use crate::database::models::{Cat, CatFilter};
use crate::database::CatRepository;
use crate::error::ApiError;

/// The cat resource operations, independent of HTTP.
///
/// Callers are expected to have authenticated the request already.
#[derive(Clone)]
pub struct CatService {
    repo: Arc<dyn CatRepository>,
}

impl CatService {
    pub fn new(repo: Arc<dyn CatRepository>) -> Self {
        Self { repo }
    }

    pub async fn list(&self, filter: &CatFilter) -> Result<Vec<Cat>, ApiError> {
        Ok(self.repo.list(filter).await?)
    }

    pub async fn retrieve(&self, id: i64) -> Result<Cat, ApiError> {
        Ok(self.repo.get(id).await?)
    }

    pub async fn create(&self, body: &Value) -> Result<Cat, ApiError> {
        let fields = decode_fields(body)?;
        let cat = self.repo.create(fields).await?;
        info!(cat_id = cat.id, "Created cat");
        Ok(cat)
    }

    /// Full replacement. A missing row wins over an invalid body.
    pub async fn update(&self, id: i64, body: &Value) -> Result<Cat, ApiError> {
        self.repo.get(id).await?;
        let fields = decode_fields(body)?;
        let cat = self.repo.update(id, fields).await?;
        info!(cat_id = cat.id, "Updated cat");
        Ok(cat)
    }

    pub async fn partial_update(&self, id: i64, body: &Value) -> Result<Cat, ApiError> {
        let existing = self.repo.get(id).await?;
        let patch = decode_patch(body)?;
        if patch.is_empty() {
            return Ok(existing);
        }
        let cat = self.repo.patch(id, patch).await?;
        info!(cat_id = cat.id, "Patched cat");
        Ok(cat)
    }

    pub async fn destroy(&self, id: i64) -> Result<(), ApiError> {
        self.repo.delete(id).await?;
        info!(cat_id = id, "Deleted cat");
        Ok(())
    }
}
