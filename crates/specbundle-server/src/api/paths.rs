//! Path listing endpoint.
//!
//! Drives the path picker in the UI: every `$ref` path of the root
//! specification, grouped under the primary tag of its fragment.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use specbundle_core::TagGroups;
use utoipa::ToSchema;

use crate::api::error::ApiResult;
use crate::state::AppState;

/// Paths grouped by primary tag.
#[derive(Debug, Serialize, ToSchema)]
#[schema(example = json!({
    "groups": {
        "Users": [
            { "path": "/users", "summary": "List users" }
        ],
        "Orders": [
            { "path": "/orders", "summary": "List orders" }
        ]
    }
}))]
pub struct PathsResponse {
    /// Tag name to the paths filed under it, in first-seen order.
    #[schema(value_type = Object)]
    pub groups: TagGroups,
}

/// List paths grouped by tag.
#[utoipa::path(
    get,
    path = "/api/paths",
    tag = "paths",
    operation_id = "getPaths",
    summary = "List paths grouped by tag",
    description = "Reads the root specification and every path fragment it references, \
        and returns the paths grouped under the first tag of each fragment's first \
        operation. Fragments without tags are grouped under `Untagged`. Inline path \
        items are not listed.",
    responses(
        (status = 200, description = "Grouped paths", body = PathsResponse),
        (status = 500, description = "Root specification missing or unreadable", body = super::error::ErrorResponse)
    )
)]
pub async fn get_paths(State(state): State<AppState>) -> ApiResult<Json<PathsResponse>> {
    let groups = state.service().grouped_paths()?;
    tracing::debug!(tags = groups.len(), "Listed grouped paths");
    Ok(Json(PathsResponse { groups }))
}
