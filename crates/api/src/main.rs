use chrono::Duration;

use stashpad_auth::TokenConfig;

#[tokio::main]
async fn main() {
    stashpad_observability::init();

    let secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
        tracing::warn!("JWT_SECRET not set; using insecure dev default");
        "dev-secret".to_string()
    });

    let lifetime_secs = std::env::var("TOKEN_LIFETIME_SECS")
        .ok()
        .and_then(|v| v.parse::<i64>().ok())
        .unwrap_or(86_400);

    let config = TokenConfig::new(secret, Duration::seconds(lifetime_secs));
    let app = stashpad_api::app::build_app(config).await;

    let listener = tokio::net::TcpListener::bind("0.0.0.0:8080")
        .await
        .expect("failed to bind 0.0.0.0:8080");

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
