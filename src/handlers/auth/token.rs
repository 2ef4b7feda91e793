// handlers/auth/token.rs - POST /auth/token handler

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::doc::ErrorBody;
use crate::app::AppState;
use crate::auth::{authenticate, AuthError};
use crate::error::ApiError;
use crate::handlers::json_body;
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Deserialize, ToSchema)]
pub struct TokenRequest {
    #[schema(example = "admin")]
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
    /// Always `Bearer`
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Seconds until the token expires
    #[schema(example = 86400)]
    pub expires_in: u64,
}

/// Exchange a username and password for a bearer token
#[utoipa::path(
    post,
    path = "/auth/token",
    tag = "auth",
    request_body = TokenRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 400, description = "Malformed request", body = ErrorBody),
        (status = 401, description = "Invalid credentials", body = ErrorBody),
    )
)]
pub async fn token_post(
    State(state): State<AppState>,
    body: Result<Json<TokenRequest>, JsonRejection>,
) -> ApiResult<TokenResponse> {
    let request = json_body(body)?;

    let user = match authenticate(state.storage.users.as_ref(), &request.username, &request.password).await {
        Ok(user) => user,
        Err(e @ (AuthError::InvalidCredentials | AuthError::InactiveUser)) => {
            tracing::warn!(username = %request.username, "Token request rejected: {}", e);
            return Err(ApiError::unauthorized(AuthError::InvalidCredentials.to_string()));
        }
        Err(e) => return Err(e.into()),
    };

    let token = state.jwt.issue(&user)?;
    tracing::info!(user_id = user.id, "Issued token");

    Ok(ApiResponse::success(TokenResponse {
        token,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt.expires_in_secs(),
    }))
}
