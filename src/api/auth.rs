use crate::infrastructure::auth::AuthError;
use crate::infrastructure::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

#[derive(Deserialize)]
pub struct LoginRequest {
    username: String,
    password: String,
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> impl IntoResponse {
    tracing::info!("Login attempt for user: {}", payload.username);

    match state
        .gate
        .login(&payload.username, &payload.password, Utc::now())
    {
        Ok(issued) => {
            tracing::info!(
                "Admin session opened for {} until {}",
                payload.username,
                issued.expires_at
            );
            (StatusCode::OK, Json(json!(issued))).into_response()
        }
        Err(AuthError::InvalidCredentials) => {
            tracing::warn!("Login failed for user: {}", payload.username);
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Invalid credentials" })),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!("Login error: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}
