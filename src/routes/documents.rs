use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
};
use std::path::Path as StdPath;

use crate::dto::application_dto::DocumentQuery;
use crate::error::Result;
use crate::AppState;

fn content_type(path: &str) -> &'static str {
    let ext = StdPath::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => "application/pdf",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "txt" => "text/plain; charset=utf-8",
        "rtf" => "application/rtf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => "application/octet-stream",
    }
}

#[utoipa::path(
    get,
    path = "/api/documents",
    params(
        ("path" = String, Query, description = "Storage path"),
        ("expires" = i64, Query, description = "Unix expiry of the link"),
        ("signature" = String, Query, description = "HMAC-SHA256 signature")
    ),
    responses(
        (status = 200, description = "Document bytes"),
        (status = 403, description = "Signature invalid or link expired")
    )
)]
#[axum::debug_handler]
pub async fn download_document(
    State(state): State<AppState>,
    Query(query): Query<DocumentQuery>,
) -> Result<impl IntoResponse> {
    state
        .storage
        .verify_signed(&query.path, query.expires, &query.signature)?;
    let data = state.storage.download(&query.path).await?;
    Ok((
        [
            (header::CONTENT_TYPE, content_type(&query.path)),
            (header::CONTENT_DISPOSITION, "inline"),
        ],
        data,
    ))
}
