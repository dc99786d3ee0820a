//! Bundling endpoint.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::Response;
use axum::Json;
use serde::{Deserialize, Serialize};
use specbundle_core::OutputKind;
use utoipa::ToSchema;

use crate::api::attachment::attachment;
use crate::api::error::ApiResult;
use crate::state::AppState;

/// Paths to bundle and the name of the download.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "filename": "users-api.yaml",
    "paths": ["/users", "/users/{id}"]
}))]
pub struct BundleRequest {
    /// Download name, ending in `.yaml` or `.yml`. Defaults to `bundled.yaml`.
    #[serde(default)]
    #[schema(example = "users-api.yaml")]
    pub filename: Option<String>,

    /// Path keys from the root specification. Unknown keys are ignored.
    #[serde(default)]
    pub paths: Vec<String>,
}

/// Bundle the selected paths into one YAML file.
#[utoipa::path(
    post,
    path = "/api/bundle",
    tag = "bundle",
    operation_id = "bundlePaths",
    summary = "Bundle selected paths",
    description = "Builds a specification containing only the selected paths and the tags \
        their operations use, resolves every `$ref` with Redocly CLI, and returns the \
        result as a YAML download.",
    request_body = BundleRequest,
    responses(
        (status = 200, description = "Bundled specification", content_type = "application/yaml", body = String),
        (status = 400, description = "Invalid filename or request body", body = super::error::ErrorResponse),
        (status = 500, description = "Root specification missing or bundling failed", body = super::error::ErrorResponse),
        (status = 503, description = "Redocly CLI is not installed", body = super::error::ErrorResponse)
    )
)]
pub async fn bundle(
    State(state): State<AppState>,
    payload: Result<Json<BundleRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(request) = payload?;
    let filename = request
        .filename
        .unwrap_or_else(|| OutputKind::Bundle.default_filename().to_string());

    tracing::info!(filename = %filename, selected = request.paths.len(), "Bundle requested");

    let bundled = state.service().bundle(&filename, &request.paths).await?;
    Ok(attachment(OutputKind::Bundle, &filename, bundled))
}
