use serde::Deserialize;
use serde_json::json;

use stashpad_store::{Item, Post, PostStatus, User};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateItemRequest {
    pub name: String,
    pub stock: i64,
}

#[derive(Debug, Deserialize, Default)]
pub struct UpdateItemRequest {
    pub name: Option<String>,
    pub stock: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    pub category: String,
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    pub status: Option<PostStatus>,
    #[serde(default)]
    pub author: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub tags: Option<String>,
    pub status: Option<PostStatus>,
    pub author: Option<String>,
}

/// Public shape of a user. The password digest never appears here.
pub fn user_to_json(user: &User) -> serde_json::Value {
    json!({
        "id": user.id.as_i64(),
        "username": user.username,
    })
}

pub fn item_to_json(item: Item) -> serde_json::Value {
    json!({
        "id": item.id.as_i64(),
        "name": item.name,
        "stock": item.stock,
        "owner": item.owner.as_i64(),
        "created_at": item.created_at,
        "updated_at": item.updated_at,
    })
}

pub fn post_to_json(post: Post) -> serde_json::Value {
    json!({
        "id": post.id.as_i64(),
        "title": post.title,
        "content": post.content,
        "category": post.category,
        "tags": post.tags,
        "status": post.status.as_str(),
        "author": post.author,
        "owner": post.owner.as_i64(),
        "created_at": post.created_at,
        "updated_at": post.updated_at,
    })
}
