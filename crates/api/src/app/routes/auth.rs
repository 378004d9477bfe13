use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};

use stashpad_auth::{PasswordHasher, TokenService};
use stashpad_store::StoreError;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(hasher): Extension<Arc<dyn PasswordHasher>>,
    Extension(tokens): Extension<Arc<dyn TokenService>>,
    Json(body): Json<dto::RegisterRequest>,
) -> axum::response::Response {
    let username = body.username.trim().to_string();
    if username.is_empty() || body.password.is_empty() {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "username and password are required",
        );
    }

    // Argon2 is CPU-bound; keep it off the async workers.
    let digest = {
        let hasher = hasher.clone();
        let password = body.password;
        tokio::task::spawn_blocking(move || hasher.hash(&password)).await
    };
    let digest = match digest {
        Ok(Ok(d)) => d,
        Ok(Err(e)) => {
            tracing::error!("password hashing failed: {e}");
            return internal();
        }
        Err(e) => {
            tracing::error!("hashing task failed: {e}");
            return internal();
        }
    };

    let user = match services.users_create(&username, &digest).await {
        Ok(u) => u,
        Err(StoreError::DuplicateUsername) => {
            return errors::json_error(
                StatusCode::CONFLICT,
                "duplicate_identity",
                "username already taken",
            );
        }
        Err(e) => return errors::store_error_to_response(e),
    };

    let token = match tokens.issue(user.id, &user.username) {
        Ok(t) => t,
        Err(e) => {
            tracing::error!("token issue failed: {e}");
            return internal();
        }
    };

    (
        StatusCode::CREATED,
        Json(serde_json::json!({
            "user": dto::user_to_json(&user),
            "token": token,
        })),
    )
        .into_response()
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(hasher): Extension<Arc<dyn PasswordHasher>>,
    Extension(tokens): Extension<Arc<dyn TokenService>>,
    Json(body): Json<dto::LoginRequest>,
) -> axum::response::Response {
    let user = match services.users_find_by_username(&body.username).await {
        Ok(u) => u,
        Err(e) => return errors::store_error_to_response(e),
    };

    let verified = {
        let hasher = hasher.clone();
        let password = body.password;
        let digest = user.as_ref().map(|u| u.password_hash.clone());
        tokio::task::spawn_blocking(move || match digest {
            Some(d) => hasher.verify(&password, &d),
            // Unknown username still costs one hashing round.
            None => {
                let _ = hasher.hash(&password);
                false
            }
        })
        .await
    };
    let verified = match verified {
        Ok(v) => v,
        Err(e) => {
            tracing::error!("verification task failed: {e}");
            return internal();
        }
    };

    // Identical response for unknown username and wrong password.
    let user = match (verified, user) {
        (true, Some(u)) => u,
        _ => {
            return errors::json_error(
                StatusCode::UNAUTHORIZED,
                "invalid_credentials",
                "invalid username or password",
            );
        }
    };

    let token = match tokens.issue(user.id, &user.username) {
        Ok(t) => t,
        Err(e) => {
            tracing::error!("token issue failed: {e}");
            return internal();
        }
    };

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "user": dto::user_to_json(&user),
            "token": token,
        })),
    )
        .into_response()
}

fn internal() -> axum::response::Response {
    errors::json_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal",
        "internal error",
    )
}
