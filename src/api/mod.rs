//! Wire formats and the published API description.

pub mod doc;
pub mod format;

pub use doc::ApiDoc;

/// Where the OpenAPI document is served
pub const SCHEMA_PATH: &str = "/api/schema";

/// Where the interactive explorer is served when enabled
pub const DOCS_PATH: &str = "/api/docs";
