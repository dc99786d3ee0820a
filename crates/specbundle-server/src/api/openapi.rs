//! OpenAPI description of the specbundle HTTP API itself.
//!
//! Served at `/api/openapi.json` and written to disk by the `gen-openapi`
//! binary.

use axum::Json;
use specbundle_core::GroupedPath;
use utoipa::OpenApi;

use super::build::BuildRequest;
use super::bundle::BundleRequest;
use super::error::ErrorResponse;
use super::health::HealthResponse;
use super::paths::PathsResponse;
use super::split::SplitResponse;

/// Serve the OpenAPI specification as JSON.
pub async fn get_openapi_spec() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Returns the OpenAPI specification as pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if the document cannot be serialized.
pub fn get_openapi_json() -> serde_json::Result<String> {
    ApiDoc::openapi().to_pretty_json()
}

/// Main OpenAPI document structure for specbundle.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "specbundle API",
        version = "0.1.0",
        description = r#"
# specbundle API

specbundle manages an OpenAPI project whose root specification keeps every
path item in its own file (`$ref: paths/users.yaml`).

## Workflow

1. **Split**: upload a monolithic specification; it is split into the project tree.
2. **Browse**: list every path grouped by the first tag of its operations.
3. **Bundle**: pick paths and download a self-contained specification holding
   only those paths and the tags they use.
4. **Document**: render a bundled specification as a standalone HTML page.

Bundling, splitting and rendering are performed by Redocly CLI, which must be
installed on the host (`npm i -g @redocly/cli`, or available through `npx`).
"#,
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "/", description = "Local specbundle server")
    ),
    tags(
        (name = "system", description = "Health checks"),
        (name = "paths", description = "Browse the project's paths"),
        (name = "bundle", description = "Bundle a subset of paths"),
        (name = "split", description = "Split a monolithic specification into the project"),
        (name = "docs", description = "Render HTML documentation")
    ),
    paths(
        super::health::health_check,
        super::paths::get_paths,
        super::bundle::bundle,
        super::split::split,
        super::build::build_docs,
    ),
    components(
        schemas(
            ErrorResponse,
            HealthResponse,
            GroupedPath,
            PathsResponse,
            BundleRequest,
            SplitResponse,
            BuildRequest,
        )
    )
)]
pub struct ApiDoc;
