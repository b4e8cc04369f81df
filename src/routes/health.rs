use axum::{http::StatusCode, response::IntoResponse, Json};

use crate::dto::interview_dto::HealthResponse;

#[axum::debug_handler]
pub async fn health() -> impl IntoResponse {
    let body = HealthResponse {
        ok: true,
        message: "Interview AI proxy running",
    };
    (StatusCode::OK, Json(body))
}
