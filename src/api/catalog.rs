use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;

use crate::domain::Session;
use crate::infrastructure::AppState;
use crate::services::CatalogError;

fn catalog_error(e: CatalogError) -> (StatusCode, Json<serde_json::Value>) {
    let status = match &e {
        CatalogError::Unauthorized => StatusCode::UNAUTHORIZED,
        CatalogError::Invalid(_) => StatusCode::BAD_REQUEST,
        CatalogError::SourceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status, Json(json!({ "error": e.to_string() })))
}

/// Replace the whole catalog with the uploaded CSV (multipart field `file`)
pub async fn upload_catalog(
    State(state): State<AppState>,
    session: Session,
    mut multipart: Multipart,
) -> impl IntoResponse {
    while let Some(field) = multipart.next_field().await.unwrap_or(None) {
        if field.name() == Some("file") {
            let data = match field.bytes().await {
                Ok(data) => data,
                Err(e) => {
                    return (
                        StatusCode::BAD_REQUEST,
                        Json(json!({ "error": format!("Upload failed: {}", e) })),
                    )
                        .into_response();
                }
            };
            return match state.library.replace_catalog(&session, &data).await {
                Ok(count) => (StatusCode::OK, Json(json!({ "imported": count }))).into_response(),
                Err(e) => catalog_error(e).into_response(),
            };
        }
    }
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": "No file uploaded" })),
    )
        .into_response()
}
