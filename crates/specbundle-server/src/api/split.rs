//! Split endpoint.
//!
//! Takes a monolithic specification as the raw request body and replaces the
//! project tree with Redocly's split output.

use axum::extract::rejection::StringRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::error::ApiResult;
use crate::state::AppState;

/// Message returned after a successful split.
pub const SPLIT_SUCCESS_MESSAGE: &str = "Project updated! Refresh this page to load the new paths.";

/// Result of a split.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "success": true,
    "message": "Project updated! Refresh this page to load the new paths.",
    "written": ["openapi.yaml", "paths"]
}))]
pub struct SplitResponse {
    /// Always `true`.
    pub success: bool,

    /// Human-readable status.
    pub message: String,

    /// Top-level files and directories written into the project root.
    pub written: Vec<String>,
}

/// Split a monolithic specification into the project tree.
#[utoipa::path(
    post,
    path = "/api/split",
    tag = "split",
    operation_id = "splitSpec",
    summary = "Split a monolithic specification",
    description = "Runs `redocly split` on the request body and moves every produced \
        top-level entry into the project root, replacing files and directories with \
        the same name. The next call to `/api/paths` reflects the new tree.",
    request_body(content = String, content_type = "application/yaml", description = "OpenAPI document in YAML"),
    responses(
        (status = 200, description = "Project updated", body = SplitResponse),
        (status = 400, description = "Empty or non UTF-8 request body", body = super::error::ErrorResponse),
        (status = 500, description = "Splitting failed", body = super::error::ErrorResponse),
        (status = 503, description = "Redocly CLI is not installed", body = super::error::ErrorResponse)
    )
)]
pub async fn split(
    State(state): State<AppState>,
    body: Result<String, StringRejection>,
) -> ApiResult<Json<SplitResponse>> {
    let body = body?;
    tracing::info!(bytes = body.len(), "Split requested");

    let written = state
        .service()
        .split(&body)
        .await?
        .into_iter()
        .map(|name| name.to_string_lossy().into_owned())
        .collect();

    Ok(Json(SplitResponse {
        success: true,
        message: SPLIT_SUCCESS_MESSAGE.to_string(),
        written,
    }))
}
