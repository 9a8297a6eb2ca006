use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use crate::infrastructure::AppState;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// Free-text search over code, title and author, with availability.
/// An unreadable catalog yields zero results rather than an error.
pub async fn search_books(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> impl IntoResponse {
    let query = params.q.unwrap_or_default();
    let results = state.library.search(&query).await;
    (StatusCode::OK, Json(results)).into_response()
}

/// Availability of every catalog entry plus integrity warnings
pub async fn get_availability(State(state): State<AppState>) -> impl IntoResponse {
    let overview = state.library.availability().await;
    (StatusCode::OK, Json(overview)).into_response()
}
