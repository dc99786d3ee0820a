//! Documentation build endpoint.

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

/// Specification to render and the name of the download.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "filename": "api-docs.html",
    "spec_content": { "openapi": "3.1.0", "info": { "title": "Shop", "version": "1.0.0" }, "paths": {} }
}))]
pub struct BuildRequest {
    /// Download name, ending in `.html` or `.htm`. Defaults to `api-docs.html`.
    #[serde(default)]
    pub filename: Option<String>,

    /// The specification, usually a previously bundled document.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub spec_content: Option<serde_json::Value>,
}

/// Render a specification as standalone HTML.
#[utoipa::path(
    post,
    path = "/api/build",
    tag = "docs",
    operation_id = "buildDocs",
    summary = "Build HTML documentation",
    description = "Renders `spec_content` with `redocly build-docs` and returns a single \
        self-contained HTML file as a download.",
    request_body = BuildRequest,
    responses(
        (status = 200, description = "Rendered documentation", content_type = "text/html", body = String),
        (status = 400, description = "Invalid filename or missing content", body = super::error::ErrorResponse),
        (status = 500, description = "Rendering failed", body = super::error::ErrorResponse),
        (status = 503, description = "Redocly CLI is not installed", body = super::error::ErrorResponse)
    )
)]
pub async fn build_docs(
    State(state): State<AppState>,
    payload: Result<Json<BuildRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(request) = payload?;
    let filename = request
        .filename
        .unwrap_or_else(|| OutputKind::Docs.default_filename().to_string());

    tracing::info!(filename = %filename, "Docs build requested");

    let html = state
        .service()
        .build_docs(&filename, request.spec_content.as_ref())
        .await?;
    Ok(attachment(OutputKind::Docs, &filename, html))
}
