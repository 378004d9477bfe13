use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use stashpad_store::StoreError;

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    match err {
        StoreError::DuplicateUsername => json_error(
            StatusCode::CONFLICT,
            "duplicate_identity",
            "username already taken",
        ),
        StoreError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        StoreError::Storage(cause) => {
            // The cause goes to the logs, never into the response body.
            tracing::error!("storage failure: {cause}");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal",
                "internal error",
            )
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
