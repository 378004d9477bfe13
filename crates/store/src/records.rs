//! Typed record shapes for the three persisted kinds.
//!
//! Explicit structs (including the owner reference) are checked at the
//! boundary before anything reaches business logic; there are no loosely
//! shaped rows anywhere downstream.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use stashpad_core::{ItemId, PostId, UserId};

/// Store operation error.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Username uniqueness violated at creation.
    #[error("username already taken")]
    DuplicateUsername,

    /// The targeted record does not exist.
    #[error("not found")]
    NotFound,

    /// Infrastructure fault (connection, query). Never retried here.
    #[error("storage failure: {0}")]
    Storage(String),
}

/// A registered account.
///
/// `password_hash` is verifiable only; no authorization decision reads it,
/// and it is never serialized into API responses.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An inventory item. Owned by exactly one user; ownership never changes.
#[derive(Debug, Clone, Serialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub stock: i64,
    pub owner: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewItem {
    pub name: String,
    pub stock: i64,
    pub owner: UserId,
}

/// Partial update for an item. Absent fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct ItemChanges {
    pub name: Option<String>,
    pub stock: Option<i64>,
}

/// Publication state of a post.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Draft,
    Published,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(PostStatus::Draft),
            "published" => Some(PostStatus::Published),
            _ => None,
        }
    }
}

/// A post. Owned by exactly one user; `author` is a display string and is
/// distinct from the owner reference.
#[derive(Debug, Clone, Serialize)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub content: String,
    pub category: String,
    pub tags: String,
    pub status: PostStatus,
    pub author: String,
    pub owner: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub category: String,
    pub tags: String,
    pub status: PostStatus,
    pub author: String,
    pub owner: UserId,
}

/// Partial update for a post. The owner reference is deliberately absent:
/// ownership is immutable after creation.
#[derive(Debug, Clone, Default)]
pub struct PostChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub tags: Option<String>,
    pub status: Option<PostStatus>,
    pub author: Option<String>,
}
