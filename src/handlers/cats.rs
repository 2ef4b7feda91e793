// handlers/cats.rs - the /apps/cats resource
//
// Every route here sits behind jwt_auth_middleware, so authentication has
// already happened by the time a handler runs.

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Path, Query, State},
    Json,
};
use serde_json::Value;

use crate::api::doc::ErrorBody;
use crate::app::AppState;
use crate::database::models::{Cat, CatFields, CatFilter, CatPatch};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

use super::{json_body, parse_id};

/// GET /apps/cats - list every cat in id order
#[utoipa::path(
    get,
    path = "/apps/cats",
    tag = "cats",
    params(CatFilter),
    responses(
        (status = 200, description = "All matching cats, ordered by id", body = [Cat]),
        (status = 400, description = "Malformed filter", body = ErrorBody),
        (status = 401, description = "Not authenticated", body = ErrorBody),
    ),
    security(("bearer_auth" = []))
)]
pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<CatFilter>, QueryRejection>,
) -> ApiResult<Vec<Cat>> {
    let Query(filter) = query.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let cats = state.cats.list(&filter).await?;
    Ok(ApiResponse::success(cats))
}

/// POST /apps/cats - create a cat
#[utoipa::path(
    post,
    path = "/apps/cats",
    tag = "cats",
    request_body = CatFields,
    responses(
        (status = 201, description = "Cat created", body = Cat),
        (status = 400, description = "Invalid body", body = ErrorBody),
        (status = 401, description = "Not authenticated", body = ErrorBody),
    ),
    security(("bearer_auth" = []))
)]
pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Cat> {
    let body = json_body(body)?;
    let cat = state.cats.create(&body).await?;
    Ok(ApiResponse::created(cat))
}

/// GET /apps/cats/:id - fetch one cat
#[utoipa::path(
    get,
    path = "/apps/cats/{id}",
    tag = "cats",
    params(("id" = i64, Path, description = "Cat id")),
    responses(
        (status = 200, description = "The cat", body = Cat),
        (status = 401, description = "Not authenticated", body = ErrorBody),
        (status = 404, description = "No cat with this id", body = ErrorBody),
    ),
    security(("bearer_auth" = []))
)]
pub async fn retrieve(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Cat> {
    let id = parse_id(&id)?;
    let cat = state.cats.retrieve(id).await?;
    Ok(ApiResponse::success(cat))
}

/// PUT /apps/cats/:id - replace name, age and gender
#[utoipa::path(
    put,
    path = "/apps/cats/{id}",
    tag = "cats",
    params(("id" = i64, Path, description = "Cat id")),
    request_body = CatFields,
    responses(
        (status = 200, description = "Cat updated", body = Cat),
        (status = 400, description = "Invalid body", body = ErrorBody),
        (status = 401, description = "Not authenticated", body = ErrorBody),
        (status = 404, description = "No cat with this id", body = ErrorBody),
    ),
    security(("bearer_auth" = []))
)]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Cat> {
    let id = parse_id(&id)?;
    let body = json_body(body)?;
    let cat = state.cats.update(id, &body).await?;
    Ok(ApiResponse::success(cat))
}

/// PATCH /apps/cats/:id - change only the supplied fields
#[utoipa::path(
    patch,
    path = "/apps/cats/{id}",
    tag = "cats",
    params(("id" = i64, Path, description = "Cat id")),
    request_body = CatPatch,
    responses(
        (status = 200, description = "Cat updated", body = Cat),
        (status = 400, description = "Invalid body", body = ErrorBody),
        (status = 401, description = "Not authenticated", body = ErrorBody),
        (status = 404, description = "No cat with this id", body = ErrorBody),
    ),
    security(("bearer_auth" = []))
)]
pub async fn partial_update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Cat> {
    let id = parse_id(&id)?;
    let body = json_body(body)?;
    let cat = state.cats.partial_update(id, &body).await?;
    Ok(ApiResponse::success(cat))
}

/// DELETE /apps/cats/:id - remove the row
#[utoipa::path(
    delete,
    path = "/apps/cats/{id}",
    tag = "cats",
    params(("id" = i64, Path, description = "Cat id")),
    responses(
        (status = 204, description = "Cat deleted"),
        (status = 401, description = "Not authenticated", body = ErrorBody),
        (status = 404, description = "No cat with this id", body = ErrorBody),
    ),
    security(("bearer_auth" = []))
)]
pub async fn destroy(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    let id = parse_id(&id)?;
    state.cats.destroy(id).await?;
    Ok(ApiResponse::no_content())
}
