// app.rs - shared state, router assembly and the server loop

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::get,
    Json, Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info, warn};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{ApiDoc, DOCS_PATH, SCHEMA_PATH};
use crate::auth::{ensure_user, JwtKeys};
use crate::config::AppConfig;
use crate::database::Storage;
use crate::error::ApiError;
use crate::handlers;
use crate::middleware::jwt_auth_middleware;
use crate::services::CatService;

/// Everything a handler can reach
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub storage: Storage,
    pub cats: CatService,
    pub jwt: JwtKeys,
}

impl AppState {
    pub fn new(config: AppConfig, storage: Storage) -> Self {
        let jwt = JwtKeys::from_config(&config.security);
        let cats = CatService::new(storage.cats.clone());
        Self {
            config: Arc::new(config),
            storage,
            cats,
            jwt,
        }
    }
}

pub fn router(state: AppState) -> Router {
    let api = &state.config.api;

    let mut app = Router::new()
        // Public
        .route("/", get(handlers::health::root))
        .route("/health", get(handlers::health::health))
        .route("/auth/token", axum::routing::post(handlers::auth::token_post))
        // Protected
        .merge(protected_routes(state.clone()));

    if api.enable_docs {
        app = app.merge(SwaggerUi::new(DOCS_PATH).url(SCHEMA_PATH, ApiDoc::openapi()));
    } else {
        app = app.route(SCHEMA_PATH, get(|| async { Json(ApiDoc::openapi()) }));
    }

    let mut app = app
        .fallback(|| async { ApiError::not_found("Not found.") })
        .layer(DefaultBodyLimit::max(api.max_request_size_bytes));

    if let Some(cors) = cors_layer(&state.config) {
        app = app.layer(cors);
    }
    if api.enable_request_logging {
        app = app.layer(TraceLayer::new_for_http());
    }

    app.with_state(state)
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use handlers::cats;

    Router::new()
        .route("/apps/cats", get(cats::list).post(cats::create))
        .route("/apps/cats/", get(cats::list).post(cats::create))
        .route(
            "/apps/cats/:id",
            get(cats::retrieve).put(cats::update).patch(cats::partial_update).delete(cats::destroy),
        )
        .route(
            "/apps/cats/:id/",
            get(cats::retrieve).put(cats::update).patch(cats::partial_update).delete(cats::destroy),
        )
        .route("/auth/whoami", get(handlers::auth::whoami_get))
        .route_layer(from_fn_with_state(state, jwt_auth_middleware))
}

fn cors_layer(config: &AppConfig) -> Option<CorsLayer> {
    let security = &config.security;
    if !security.enable_cors {
        return None;
    }

    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE])
        .allow_headers(Any);

    if security.cors_origins.iter().any(|o| o == "*") {
        return Some(layer.allow_origin(Any));
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    Some(layer.allow_origin(AllowOrigin::list(origins)))
}

/// Create the bootstrap user when configured and missing
pub async fn bootstrap(state: &AppState) -> anyhow::Result<()> {
    let Some(user) = &state.config.bootstrap else {
        return Ok(());
    };
    let created = ensure_user(state.storage.users.as_ref(), &user.username, &user.password)
        .await
        .with_context(|| format!("failed to create bootstrap user '{}'", user.username))?;
    if created {
        info!(username = %user.username, "Created bootstrap user");
    }
    Ok(())
}

/// Build storage, bind and serve until Ctrl-C or SIGTERM
pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    info!("Starting cats-api in {:?} mode", config.environment);

    let storage = Storage::from_config(&config)
        .await
        .context("failed to initialise storage")?;
    let bind_addr = format!("{}:{}", config.server.bind_addr, config.server.port);
    let docs_enabled = config.api.enable_docs;

    let state = AppState::new(config, storage.clone());
    bootstrap(&state).await?;

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    let local: SocketAddr = listener.local_addr()?;

    info!("Listening on http://{}", local);
    if docs_enabled {
        info!("API explorer at http://{}{}", local, DOCS_PATH);
    }

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    storage.close().await;
    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{send, test_config, TestApp};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn schema_is_served_without_auth() {
        let app = TestApp::new().await;
        let (status, _, body) = send(&app.router, Method::GET, "/api/schema", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"]["/apps/cats"].is_object());
    }

    #[tokio::test]
    async fn schema_is_served_with_docs_disabled() {
        let mut config = test_config();
        config.api.enable_docs = false;
        let app = TestApp::with_config(config).await;
        let (status, _, body) = send(&app.router, Method::GET, "/api/schema", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["info"]["title"], "Cats API");
    }

    #[tokio::test]
    async fn unknown_paths_get_a_json_404() {
        let app = TestApp::new().await;
        let (status, _, body) = send(&app.router, Method::GET, "/nope", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], true);
    }

    #[tokio::test]
    async fn unsupported_methods_are_405() {
        let app = TestApp::new().await;
        let (status, _) = app.call(Method::DELETE, "/apps/cats", None).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn oversized_bodies_are_rejected() {
        let mut config = test_config();
        config.api.max_request_size_bytes = 64;
        let app = TestApp::with_config(config).await;
        let body = serde_json::json!({"name": "x".repeat(200), "age": 1, "gender": "f"});
        let (status, body) = app.call(Method::POST, "/apps/cats", Some(body)).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["code"], "PAYLOAD_TOO_LARGE");
    }

    #[tokio::test]
    async fn bootstrap_user_is_created_once() {
        let mut config = test_config();
        config.bootstrap = Some(crate::config::BootstrapUser {
            username: "root".to_string(),
            password: "pw".to_string(),
        });
        let state = AppState::new(config, Storage::memory());
        bootstrap(&state).await.unwrap();
        bootstrap(&state).await.unwrap();
        assert!(state.storage.users.find_by_username("root").await.unwrap().is_some());
    }
}
