use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use stashpad_auth::TokenService;

use crate::app::errors;
use crate::context::CurrentUser;

#[derive(Clone)]
pub struct AuthState {
    pub tokens: Arc<dyn TokenService>,
}

pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let token = match extract_bearer(req.headers()) {
        Ok(t) => t,
        Err(status) => {
            return errors::json_error(status, "unauthorized", "missing or malformed bearer token");
        }
    };

    match state.tokens.verify(token, Utc::now()) {
        Ok(claims) => {
            req.extensions_mut()
                .insert(CurrentUser::new(claims.sub, claims.username));
            next.run(req).await
        }
        Err(e) => {
            // The rejection reason stays in the logs; clients get one answer.
            tracing::debug!("bearer token rejected: {e}");
            errors::json_error(
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "invalid or expired token",
            )
        }
    }
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, StatusCode> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let header = header.to_str().map_err(|_| StatusCode::UNAUTHORIZED)?;

    let header = header
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = header.trim();
    if token.is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(token)
}
