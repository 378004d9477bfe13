use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::json;

use stashpad_auth::TokenConfig;

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(secret: &str) -> Self {
        // Build app (same router as prod), but bind to an ephemeral port.
        let config = TokenConfig::new(secret, ChronoDuration::minutes(10));
        let app = stashpad_api::app::build_app(config).await;
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn register(
    client: &reqwest::Client,
    base_url: &str,
    username: &str,
    password: &str,
) -> (serde_json::Value, String) {
    let res = client
        .post(format!("{base_url}/auth/register"))
        .json(&json!({ "username": username, "password": password }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: serde_json::Value = res.json().await.unwrap();
    let token = body["token"].as_str().unwrap().to_string();
    (body["user"].clone(), token)
}

fn mint_expired(secret: &str, user_id: i64, username: &str) -> String {
    let claims = json!({
        "sub": user_id,
        "username": username,
        "jti": uuid::Uuid::now_v7(),
        "iat": (Utc::now() - ChronoDuration::hours(2)).timestamp(),
        "exp": (Utc::now() - ChronoDuration::hours(1)).timestamp(),
    });

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("failed to encode jwt")
}

#[tokio::test]
async fn auth_required_for_protected_endpoints() {
    let srv = TestServer::spawn("test-secret").await;

    let client = reqwest::Client::new();
    let res = client
        .get(format!("{}/whoami", srv.base_url))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn register_issues_a_working_token() {
    let srv = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();

    let (user, token) = register(&client, &srv.base_url, "alice", "s3cret-pw").await;
    assert_eq!(user["username"], "alice");

    let res = client
        .get(format!("{}/whoami", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["username"], "alice");
    assert_eq!(body["user_id"], user["id"]);
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let srv = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();

    register(&client, &srv.base_url, "alice", "s3cret-pw").await;

    let res = client
        .post(format!("{}/auth/register", srv.base_url))
        .json(&json!({ "username": "alice", "password": "another-pw" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "duplicate_identity");
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let srv = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();

    register(&client, &srv.base_url, "alice", "s3cret-pw").await;

    let wrong_password = client
        .post(format!("{}/auth/login", srv.base_url))
        .json(&json!({ "username": "alice", "password": "wrong-pw" }))
        .send()
        .await
        .unwrap();
    let unknown_user = client
        .post(format!("{}/auth/login", srv.base_url))
        .json(&json!({ "username": "nobody", "password": "wrong-pw" }))
        .send()
        .await
        .unwrap();

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_user.status(), StatusCode::UNAUTHORIZED);

    // Byte-identical bodies: the response must not reveal which part failed.
    let a = wrong_password.text().await.unwrap();
    let b = unknown_user.text().await.unwrap();
    assert_eq!(a, b);
}

#[tokio::test]
async fn login_returns_a_fresh_working_token() {
    let srv = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();

    register(&client, &srv.base_url, "alice", "s3cret-pw").await;

    let res = client
        .post(format!("{}/auth/login", srv.base_url))
        .json(&json!({ "username": "alice", "password": "s3cret-pw" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    let token = body["token"].as_str().unwrap();

    let res = client
        .get(format!("{}/whoami", srv.base_url))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn tampered_token_is_rejected() {
    let srv = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();

    let (_, token) = register(&client, &srv.base_url, "alice", "s3cret-pw").await;
    let tampered = format!("{token}x");

    let res = client
        .get(format!("{}/whoami", srv.base_url))
        .bearer_auth(&tampered)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expired_token_is_rejected() {
    let secret = "test-secret";
    let srv = TestServer::spawn(secret).await;
    let client = reqwest::Client::new();

    // Correctly signed, but past its expiry.
    let token = mint_expired(secret, 1, "alice");

    let res = client
        .get(format!("{}/whoami", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn items_are_private_to_their_owner() {
    let srv = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();

    let (_, token_a) = register(&client, &srv.base_url, "alice", "pw-alice").await;
    let (_, token_b) = register(&client, &srv.base_url, "bob", "pw-bob").await;

    // Alice creates an item.
    let res = client
        .post(format!("{}/items", srv.base_url))
        .bearer_auth(&token_a)
        .json(&json!({ "name": "Widget", "stock": 5 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let item: serde_json::Value = res.json().await.unwrap();
    let id = item["id"].as_i64().unwrap();
    assert_eq!(item["name"], "Widget");
    assert_eq!(item["stock"], 5);

    // Bob cannot see it: not in his listing, and a direct read is 404.
    let res = client
        .get(format!("{}/items", srv.base_url))
        .bearer_auth(&token_b)
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body["items"].as_array().unwrap().is_empty());

    let res = client
        .get(format!("{}/items/{id}", srv.base_url))
        .bearer_auth(&token_b)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // Bob cannot delete it either, and the denial is explicit.
    let res = client
        .delete(format!("{}/items/{id}", srv.base_url))
        .bearer_auth(&token_b)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "forbidden");

    // Alice deletes it; a second read is 404 for her too.
    let res = client
        .delete(format!("{}/items/{id}", srv.base_url))
        .bearer_auth(&token_a)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(format!("{}/items/{id}", srv.base_url))
        .bearer_auth(&token_a)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn item_partial_update_keeps_untouched_fields() {
    let srv = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();

    let (_, token) = register(&client, &srv.base_url, "alice", "pw-alice").await;

    let res = client
        .post(format!("{}/items", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "name": "Widget", "stock": 5 }))
        .send()
        .await
        .unwrap();
    let item: serde_json::Value = res.json().await.unwrap();
    let id = item["id"].as_i64().unwrap();

    let res = client
        .put(format!("{}/items/{id}", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "stock": 12 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let updated: serde_json::Value = res.json().await.unwrap();
    assert_eq!(updated["name"], "Widget");
    assert_eq!(updated["stock"], 12);
}

#[tokio::test]
async fn item_validation_rejects_bad_input() {
    let srv = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();

    let (_, token) = register(&client, &srv.base_url, "alice", "pw-alice").await;

    let res = client
        .post(format!("{}/items", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "name": "  ", "stock": 5 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "validation_error");

    let res = client
        .get(format!("{}/items/not-a-number", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn posts_are_readable_by_everyone_but_owner_mutable() {
    let srv = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();

    let (_, token_a) = register(&client, &srv.base_url, "alice", "pw-alice").await;
    let (_, token_b) = register(&client, &srv.base_url, "bob", "pw-bob").await;

    // Alice creates a post with only the required fields.
    let res = client
        .post(format!("{}/posts", srv.base_url))
        .bearer_auth(&token_a)
        .json(&json!({
            "title": "Hello",
            "content": "First post",
            "category": "General",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let post: serde_json::Value = res.json().await.unwrap();
    let id = post["id"].as_i64().unwrap();

    // Defaults applied server-side.
    assert_eq!(post["status"], "draft");
    assert_eq!(post["tags"], "");
    assert_eq!(post["author"], "alice");

    // Bob can read it directly and sees it in the shared listing.
    let res = client
        .get(format!("{}/posts/{id}", srv.base_url))
        .bearer_auth(&token_b)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(format!("{}/posts", srv.base_url))
        .bearer_auth(&token_b)
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["items"].as_array().unwrap().len(), 1);

    // But Bob cannot change or delete it.
    let res = client
        .put(format!("{}/posts/{id}", srv.base_url))
        .bearer_auth(&token_b)
        .json(&json!({ "title": "Hijacked" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .delete(format!("{}/posts/{id}", srv.base_url))
        .bearer_auth(&token_b)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // Alice publishes it, then deletes it.
    let res = client
        .put(format!("{}/posts/{id}", srv.base_url))
        .bearer_auth(&token_a)
        .json(&json!({ "status": "published" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let updated: serde_json::Value = res.json().await.unwrap();
    assert_eq!(updated["status"], "published");
    assert_eq!(updated["title"], "Hello");

    let res = client
        .delete(format!("{}/posts/{id}", srv.base_url))
        .bearer_auth(&token_a)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(format!("{}/posts/{id}", srv.base_url))
        .bearer_auth(&token_b)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn post_requires_title_content_and_category() {
    let srv = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();

    let (_, token) = register(&client, &srv.base_url, "alice", "pw-alice").await;

    let res = client
        .post(format!("{}/posts", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "title": "Hello", "content": "body", "category": "" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn blank_credentials_are_rejected_at_registration() {
    let srv = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();

    for payload in [
        json!({ "username": "  ", "password": "pw" }),
        json!({ "username": "alice", "password": "" }),
    ] {
        let res = client
            .post(format!("{}/auth/register", srv.base_url))
            .json(&payload)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = res.json().await.unwrap();
        assert_eq!(body["error"], "validation_error");
    }
}
