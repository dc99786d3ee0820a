//! HTTP API routes and handlers.
//!
//! - `paths` - Tag-grouped path listing
//! - `bundle` - Bundle selected paths into one YAML file
//! - `split` - Split a monolithic specification into the project
//! - `build` - Render HTML documentation
//! - `health` - Service health checks
//! - `error` - API error types
//! - `openapi` - OpenAPI specification generation

use std::path::Path;

use axum::extract::{DefaultBodyLimit, Request};
use axum::routing::{get, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::state::AppState;

pub mod attachment;
pub mod build;
pub mod bundle;
pub mod error;
pub mod health;
pub mod openapi;
pub mod paths;
pub mod split;

pub use error::{ApiError, ApiResult, ErrorResponse};
pub use openapi::get_openapi_json;

/// Largest request body accepted. Monolithic specifications get big.
pub const MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

/// Creates the combined router.
///
/// # Route Structure
///
/// ```text
/// /health                - Health check
/// /api
/// ├── /paths             - Paths grouped by tag
/// ├── /bundle            - Bundle selected paths (YAML download)
/// ├── /split             - Split a monolithic spec into the project
/// ├── /build             - Render HTML docs (HTML download)
/// └── /openapi.json      - OpenAPI specification
/// /*                     - Static UI files, when `ui_dir` is set
/// ```
pub fn create_router(state: AppState, ui_dir: Option<&Path>) -> Router {
    let api = Router::new()
        .route("/paths", get(paths::get_paths))
        .route("/bundle", post(bundle::bundle))
        .route("/split", post(split::split))
        .route("/build", post(build::build_docs))
        .route("/openapi.json", get(openapi::get_openapi_spec));

    let mut router = Router::new()
        .nest("/health", health::router())
        .nest("/api", api);

    if let Some(dir) = ui_dir {
        tracing::info!(dir = %dir.display(), "Serving static UI");
        router = router.fallback_service(ServeDir::new(dir));
    }

    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
            tracing::info_span!(
                "http",
                id = %Uuid::new_v4(),
                method = %request.method(),
                uri = %request.uri()
            )
        }))
        .layer(CompressionLayer::new())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES));

    router.layer(middleware).with_state(state)
}
