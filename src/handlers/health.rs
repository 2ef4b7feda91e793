// handlers/health.rs - GET / and GET /health

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Serialize, ToSchema)]
pub struct ServiceInfo {
    #[schema(example = "cats-api")]
    pub name: &'static str,
    pub version: &'static str,
    /// Path of the OpenAPI document
    pub schema: &'static str,
    /// Path of the interactive explorer, absent when disabled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docs: Option<&'static str>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthStatus {
    #[schema(example = "ok")]
    pub status: &'static str,
    #[schema(example = "connected")]
    pub storage: &'static str,
}

/// Service name and where to find the API description
#[utoipa::path(
    get,
    path = "/",
    tag = "health",
    responses((status = 200, description = "Service information", body = ServiceInfo))
)]
pub async fn root(State(state): State<AppState>) -> ApiResult<ServiceInfo> {
    Ok(ApiResponse::success(ServiceInfo {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        schema: crate::api::SCHEMA_PATH,
        docs: state.config.api.enable_docs.then_some(crate::api::DOCS_PATH),
    }))
}

/// Liveness plus a storage round trip
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service and storage are up", body = HealthStatus),
        (status = 503, description = "Storage is unreachable", body = HealthStatus),
    )
)]
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthStatus>) {
    match state.storage.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthStatus { status: "ok", storage: "connected" }),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthStatus { status: "degraded", storage: "unavailable" }),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::{send, TestApp};
    use axum::http::{Method, StatusCode};

    #[tokio::test]
    async fn health_is_public() {
        let app = TestApp::new().await;
        let (status, _, body) = send(&app.router, Method::GET, "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn root_points_at_the_schema() {
        let app = TestApp::new().await;
        let (status, _, body) = send(&app.router, Method::GET, "/", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "cats-api");
        assert_eq!(body["schema"], "/api/schema");
    }
}
