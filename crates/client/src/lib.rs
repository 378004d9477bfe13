//! Typed HTTP client with local session handling.
//!
//! The session is the bearer token plus the user summary returned at
//! registration or login. It lives only in this struct; logout is a local
//! operation and the server keeps no session state to revoke. A 401 from any
//! authenticated call drops the stored session, since the server will never
//! accept that token again.

use serde::Deserialize;
use thiserror::Error;

use stashpad_core::{ItemId, PostId, UserId};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Non-2xx response other than 401, with the server's message if any.
    #[error("api error {status}: {message}")]
    Api { status: u16, message: String },

    /// An authenticated call was attempted without a session.
    #[error("not authenticated")]
    NotAuthenticated,

    /// The server rejected the stored token; the session has been cleared.
    #[error("session rejected by server")]
    Unauthorized,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserSummary {
    pub id: UserId,
    pub username: String,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user: UserSummary,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ItemView {
    pub id: ItemId,
    pub name: String,
    pub stock: i64,
    pub owner: UserId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostView {
    pub id: PostId,
    pub title: String,
    pub content: String,
    pub category: String,
    pub tags: String,
    pub status: String,
    pub author: String,
    pub owner: UserId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WhoAmI {
    pub user_id: UserId,
    pub username: String,
}

/// New post payload. Optional fields are defaulted server-side.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

/// Partial post update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct PostPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

/// Partial item update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct ItemPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct AuthResponse {
    user: UserSummary,
    token: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct ItemsPage {
    items: Vec<ItemView>,
}

#[derive(Debug, Deserialize)]
struct PostsPage {
    items: Vec<PostView>,
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Option<Session>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
            session: None,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Drop the stored session. Local only; the token itself stays valid
    /// until it expires.
    pub fn logout(&mut self) {
        self.session = None;
    }

    pub async fn register(
        &mut self,
        username: &str,
        password: &str,
    ) -> Result<UserSummary, ClientError> {
        let res = self
            .http
            .post(self.url("/auth/register"))
            .json(&serde_json::json!({ "username": username, "password": password }))
            .send()
            .await?;
        self.store_session(res).await
    }

    pub async fn login(
        &mut self,
        username: &str,
        password: &str,
    ) -> Result<UserSummary, ClientError> {
        let res = self
            .http
            .post(self.url("/auth/login"))
            .json(&serde_json::json!({ "username": username, "password": password }))
            .send()
            .await?;
        self.store_session(res).await
    }

    pub async fn whoami(&mut self) -> Result<WhoAmI, ClientError> {
        let token = self.bearer()?;
        let res = self
            .http
            .get(self.url("/whoami"))
            .bearer_auth(token)
            .send()
            .await?;
        self.parse_authed(res).await
    }

    // ── Items ────────────────────────────────────────────────────────────

    pub async fn create_item(&mut self, name: &str, stock: i64) -> Result<ItemView, ClientError> {
        let token = self.bearer()?;
        let res = self
            .http
            .post(self.url("/items"))
            .bearer_auth(token)
            .json(&serde_json::json!({ "name": name, "stock": stock }))
            .send()
            .await?;
        self.parse_authed(res).await
    }

    pub async fn list_items(&mut self) -> Result<Vec<ItemView>, ClientError> {
        let token = self.bearer()?;
        let res = self
            .http
            .get(self.url("/items"))
            .bearer_auth(token)
            .send()
            .await?;
        let page: ItemsPage = self.parse_authed(res).await?;
        Ok(page.items)
    }

    pub async fn get_item(&mut self, id: ItemId) -> Result<ItemView, ClientError> {
        let token = self.bearer()?;
        let res = self
            .http
            .get(self.url(&format!("/items/{id}")))
            .bearer_auth(token)
            .send()
            .await?;
        self.parse_authed(res).await
    }

    pub async fn update_item(
        &mut self,
        id: ItemId,
        patch: &ItemPatch,
    ) -> Result<ItemView, ClientError> {
        let token = self.bearer()?;
        let res = self
            .http
            .put(self.url(&format!("/items/{id}")))
            .bearer_auth(token)
            .json(patch)
            .send()
            .await?;
        self.parse_authed(res).await
    }

    pub async fn delete_item(&mut self, id: ItemId) -> Result<(), ClientError> {
        let token = self.bearer()?;
        let res = self
            .http
            .delete(self.url(&format!("/items/{id}")))
            .bearer_auth(token)
            .send()
            .await?;
        let _: serde_json::Value = self.parse_authed(res).await?;
        Ok(())
    }

    // ── Posts ────────────────────────────────────────────────────────────

    pub async fn create_post(&mut self, draft: &PostDraft) -> Result<PostView, ClientError> {
        let token = self.bearer()?;
        let res = self
            .http
            .post(self.url("/posts"))
            .bearer_auth(token)
            .json(draft)
            .send()
            .await?;
        self.parse_authed(res).await
    }

    pub async fn list_posts(&mut self) -> Result<Vec<PostView>, ClientError> {
        let token = self.bearer()?;
        let res = self
            .http
            .get(self.url("/posts"))
            .bearer_auth(token)
            .send()
            .await?;
        let page: PostsPage = self.parse_authed(res).await?;
        Ok(page.items)
    }

    pub async fn get_post(&mut self, id: PostId) -> Result<PostView, ClientError> {
        let token = self.bearer()?;
        let res = self
            .http
            .get(self.url(&format!("/posts/{id}")))
            .bearer_auth(token)
            .send()
            .await?;
        self.parse_authed(res).await
    }

    pub async fn update_post(
        &mut self,
        id: PostId,
        patch: &PostPatch,
    ) -> Result<PostView, ClientError> {
        let token = self.bearer()?;
        let res = self
            .http
            .put(self.url(&format!("/posts/{id}")))
            .bearer_auth(token)
            .json(patch)
            .send()
            .await?;
        self.parse_authed(res).await
    }

    pub async fn delete_post(&mut self, id: PostId) -> Result<(), ClientError> {
        let token = self.bearer()?;
        let res = self
            .http
            .delete(self.url(&format!("/posts/{id}")))
            .bearer_auth(token)
            .send()
            .await?;
        let _: serde_json::Value = self.parse_authed(res).await?;
        Ok(())
    }

    // ── Internals ────────────────────────────────────────────────────────

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn bearer(&self) -> Result<String, ClientError> {
        self.session
            .as_ref()
            .map(|s| s.token.clone())
            .ok_or(ClientError::NotAuthenticated)
    }

    async fn store_session(
        &mut self,
        res: reqwest::Response,
    ) -> Result<UserSummary, ClientError> {
        let status = res.status();
        if !status.is_success() {
            return Err(Self::api_error(res).await);
        }

        let auth: AuthResponse = res.json().await?;
        let user = auth.user.clone();
        self.session = Some(Session {
            token: auth.token,
            user: auth.user,
        });
        Ok(user)
    }

    async fn parse_authed<T: serde::de::DeserializeOwned>(
        &mut self,
        res: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = res.status();
        if status.is_success() {
            return Ok(res.json().await?);
        }
        if status == reqwest::StatusCode::UNAUTHORIZED {
            self.session = None;
            return Err(ClientError::Unauthorized);
        }
        Err(Self::api_error(res).await)
    }

    async fn api_error(res: reqwest::Response) -> ClientError {
        let status = res.status().as_u16();
        let message = res
            .json::<ErrorBody>()
            .await
            .map(|b| b.message)
            .unwrap_or_default();
        ClientError::Api { status, message }
    }
}
