//! OpenAPI document for the HTTP surface.

use utoipa::OpenApi;

use super::handlers;
use crate::app::AppInfo;

#[derive(OpenApi)]
#[openapi(
    paths(handlers::read_root),
    components(schemas(handlers::HealthResponse)),
    tags(
        (name = "health", description = "Liveness check used by operators and load balancers")
    )
)]
pub struct ApiDoc;

/// Path serving the OpenAPI JSON document.
pub const OPENAPI_PATH: &str = "/openapi.json";
/// Path serving Swagger UI.
pub const DOCS_PATH: &str = "/docs";

/// Build the document with the application's title, description and version.
pub fn openapi_for(info: &AppInfo) -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    doc.info.title = info.title.to_string();
    doc.info.description = Some(info.description.to_string());
    doc.info.version = info.version.to_string();
    doc
}
