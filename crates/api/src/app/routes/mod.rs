use axum::{Router, routing::get};

pub mod auth;
pub mod items;
pub mod posts;
pub mod system;

/// Router for unauthenticated endpoints (health + credential issuance).
pub fn public_router() -> Router {
    Router::new()
        .route("/health", get(system::health))
        .nest("/auth", auth::router())
}

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .nest("/items", items::router())
        .nest("/posts", posts::router())
}
