use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::app::AppState;
use crate::auth::AuthError;
use crate::error::ApiError;

/// Authenticated caller, injected into request extensions
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
}

/// Rejects the request with 401 unless it carries a valid bearer token for an active user
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_user = match authenticate_request(&state, request.headers()).await {
        Ok(user) => user,
        Err(AuthError::Store(e)) => return Err(e.into()),
        Err(e) => {
            tracing::warn!(
                method = %request.method(),
                path = %request.uri().path(),
                "Authentication failed: {}",
                e
            );
            return Err(e.into());
        }
    };

    tracing::debug!("Authenticated request for user '{}'", auth_user.username);
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

async fn authenticate_request(state: &AppState, headers: &HeaderMap) -> Result<AuthUser, AuthError> {
    let token = extract_bearer_token(headers)?;
    let claims = state.jwt.verify(&token)?;

    // Deleted, renamed or deactivated users lose access immediately
    let user = state
        .storage
        .users
        .find_by_id(claims.uid)
        .await?
        .filter(|user| user.is_active && user.username == claims.sub)
        .ok_or(AuthError::InactiveUser)?;

    Ok(AuthUser { id: user.id, username: user.username })
}

/// Extract JWT token from Authorization header
fn extract_bearer_token(headers: &HeaderMap) -> Result<String, AuthError> {
    let auth_header = headers.get(header::AUTHORIZATION).ok_or(AuthError::MissingToken)?;

    let auth_str = auth_header.to_str().map_err(|_| AuthError::MalformedHeader)?;

    let (scheme, token) = auth_str.split_once(' ').ok_or(AuthError::MalformedHeader)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::MalformedHeader);
    }
    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::MalformedHeader);
    }
    Ok(token.to_string())
}
