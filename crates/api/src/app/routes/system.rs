use axum::{Json, http::StatusCode, response::IntoResponse};

use crate::context::CurrentUser;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(
    axum::extract::Extension(current): axum::extract::Extension<CurrentUser>,
) -> impl IntoResponse {
    Json(serde_json::json!({
        "user_id": current.user_id().as_i64(),
        "username": current.username(),
    }))
}
