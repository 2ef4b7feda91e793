//! OpenAPI document for the cats API.
//!
//! Registers every handler annotated with `#[utoipa::path]`, the cat and
//! token schemas, and the `bearer_auth` scheme that protected operations
//! reference. Served at [`super::SCHEMA_PATH`] and printed by `cats schema`.

use std::collections::BTreeMap;

use serde::Serialize;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};

use crate::database::models::{Cat, CatFields, CatPatch};
use crate::handlers::auth::{TokenRequest, TokenResponse, WhoamiResponse};
use crate::handlers::health::{HealthStatus, ServiceInfo};

/// Body of every error response
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Always `true`
    pub error: bool,
    #[schema(example = "NOT_FOUND")]
    pub code: String,
    #[schema(example = "Not found.")]
    pub message: String,
    /// Messages per offending field, validation failures only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_errors: Option<BTreeMap<String, Vec<String>>>,
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("Token issued by POST /auth/token"))
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Cats API",
        description = "Create, list, fetch, update and delete cats. Every cat operation requires a bearer token."
    ),
    servers((url = "/", description = "Relative to the deployment base URL")),
    paths(
        crate::handlers::cats::list,
        crate::handlers::cats::create,
        crate::handlers::cats::retrieve,
        crate::handlers::cats::update,
        crate::handlers::cats::partial_update,
        crate::handlers::cats::destroy,
        crate::handlers::auth::token::token_post,
        crate::handlers::auth::whoami::whoami_get,
        crate::handlers::health::root,
        crate::handlers::health::health,
    ),
    components(schemas(
        Cat,
        CatFields,
        CatPatch,
        TokenRequest,
        TokenResponse,
        WhoamiResponse,
        ServiceInfo,
        HealthStatus,
        ErrorBody
    )),
    tags(
        (name = "cats", description = "The cat resource"),
        (name = "auth", description = "Bearer token issue and inspection"),
        (name = "health", description = "Service information and health checks")
    )
)]
pub struct ApiDoc;

impl ApiDoc {
    pub fn to_pretty_json() -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&Self::openapi())
    }
}
