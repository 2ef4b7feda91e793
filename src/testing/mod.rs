//! Router test helpers: an in-memory application with one active user and
//! a token for it, driven through `tower::ServiceExt::oneshot`.

use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use crate::app::{router, AppState};
use crate::auth::register_user;
use crate::config::AppConfig;
use crate::database::models::User;
use crate::database::Storage;

pub const TEST_USERNAME: &str = "tester";
pub const TEST_PASSWORD: &str = "correct horse battery staple";

/// Development preset with memory storage and request logging off
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::from_lookup(|_| None).expect("development config");
    config.api.enable_request_logging = false;
    config.security.jwt_secret = "test-secret".to_string();
    config
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub user: User,
    pub token: String,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    pub async fn with_config(config: AppConfig) -> Self {
        let state = AppState::new(config, Storage::memory());
        let user = register_user(state.storage.users.as_ref(), TEST_USERNAME, TEST_PASSWORD)
            .await
            .expect("register test user");
        let token = state.jwt.issue(&user).expect("issue test token");
        Self {
            router: router(state.clone()),
            state,
            user,
            token,
        }
    }

    /// Authenticated request with an optional JSON body
    pub async fn call(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let (status, _, body) = send(&self.router, method, uri, Some(&self.token), body).await;
        (status, body)
    }

    /// Authenticated request with a raw body sent as JSON
    pub async fn call_raw(&self, method: Method, uri: &str, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.token))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let (status, _, body) = dispatch(&self.router, request).await;
        (status, body)
    }
}

/// One request through the router. Empty or non-JSON responses decode to `Value::Null`.
pub async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, HeaderMap, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    dispatch(router, request).await
}

async fn dispatch(router: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, headers, body)
}
