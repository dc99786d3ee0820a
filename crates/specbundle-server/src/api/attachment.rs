//! File download responses.

use axum::http::header;
use axum::response::{IntoResponse, Response};
use specbundle_core::OutputKind;

/// Respond with `body` as a download named `filename`.
pub fn attachment(kind: OutputKind, filename: &str, body: Vec<u8>) -> Response {
    let disposition = format!(
        "attachment; filename=\"{}\"",
        filename.replace('\\', "\\\\").replace('"', "\\\"")
    );

    (
        [
            (header::CONTENT_TYPE, kind.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response()
}
