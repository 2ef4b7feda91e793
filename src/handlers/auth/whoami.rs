// handlers/auth/whoami.rs - GET /auth/whoami handler

use axum::Extension;
use serde::Serialize;
use utoipa::ToSchema;

use crate::api::doc::ErrorBody;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

#[derive(Debug, Serialize, ToSchema)]
pub struct WhoamiResponse {
    pub id: i64,
    pub username: String,
}

/// The user the bearer token belongs to
#[utoipa::path(
    get,
    path = "/auth/whoami",
    tag = "auth",
    responses(
        (status = 200, description = "Authenticated user", body = WhoamiResponse),
        (status = 401, description = "Not authenticated", body = ErrorBody),
    ),
    security(("bearer_auth" = []))
)]
pub async fn whoami_get(Extension(user): Extension<AuthUser>) -> ApiResult<WhoamiResponse> {
    Ok(ApiResponse::success(WhoamiResponse {
        id: user.id,
        username: user.username,
    }))
}
