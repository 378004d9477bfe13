//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: storage backend wiring (in-memory or Postgres)
//! - `routes/`: HTTP routes + handlers (one file per domain area)
//! - `dto.rs`: request/response DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router};
use tower::ServiceBuilder;

use stashpad_auth::{
    Argon2PasswordHasher, Hs256TokenService, PasswordHasher, TokenConfig, TokenService,
};

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(token_config: TokenConfig) -> Router {
    let tokens: Arc<dyn TokenService> = Arc::new(Hs256TokenService::new(token_config));
    let hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2PasswordHasher::new());
    let auth_state = middleware::AuthState {
        tokens: tokens.clone(),
    };

    let services = Arc::new(services::build_services().await);

    // Protected routes: require a verified bearer token.
    let protected = routes::router().layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::auth_middleware,
    ));

    Router::new()
        .merge(routes::public_router())
        .merge(protected)
        .layer(
            ServiceBuilder::new()
                .layer(Extension(services))
                .layer(Extension(tokens))
                .layer(Extension(hasher)),
        )
}
