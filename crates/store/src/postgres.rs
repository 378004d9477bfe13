//! Postgres-backed stores.
//!
//! Username uniqueness is enforced by a UNIQUE constraint; the unique
//! violation error code is mapped back to `StoreError::DuplicateUsername`.
//! Every other SQLx error surfaces as `StoreError::Storage` and is never
//! retried here.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use tracing::instrument;

use stashpad_core::{ItemId, PostId, UserId};

use crate::records::{
    Item, ItemChanges, NewItem, NewPost, Post, PostChanges, PostStatus, StoreError, User,
};

/// Postgres-backed user/item/post stores sharing one connection pool.
#[derive(Debug, Clone)]
pub struct PostgresStores {
    pool: PgPool,
}

impl PostgresStores {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the schema if it does not exist yet.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id BIGSERIAL PRIMARY KEY,
                username TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(storage)?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS items (
                id BIGSERIAL PRIMARY KEY,
                name TEXT NOT NULL,
                stock BIGINT NOT NULL,
                owner_id BIGINT NOT NULL REFERENCES users(id),
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(storage)?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS posts (
                id BIGSERIAL PRIMARY KEY,
                title TEXT NOT NULL,
                content TEXT NOT NULL,
                category TEXT NOT NULL,
                tags TEXT NOT NULL DEFAULT '',
                status TEXT NOT NULL DEFAULT 'draft',
                author TEXT NOT NULL,
                owner_id BIGINT NOT NULL REFERENCES users(id),
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(storage)?;

        Ok(())
    }

    // ── Users ────────────────────────────────────────────────────────────

    #[instrument(skip(self), err)]
    pub async fn users_find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(
            "SELECT id, username, password_hash, created_at, updated_at
             FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?;

        row.map(user_from_row).transpose()
    }

    #[instrument(skip(self, password_hash), err)]
    pub async fn users_create(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<User, StoreError> {
        let row = sqlx::query(
            "INSERT INTO users (username, password_hash)
             VALUES ($1, $2)
             RETURNING id, username, password_hash, created_at, updated_at",
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::DuplicateUsername,
            _ => storage(e),
        })?;

        user_from_row(row)
    }

    // ── Items ────────────────────────────────────────────────────────────

    pub async fn items_create(&self, new: NewItem) -> Result<Item, StoreError> {
        let row = sqlx::query(
            "INSERT INTO items (name, stock, owner_id)
             VALUES ($1, $2, $3)
             RETURNING id, name, stock, owner_id, created_at, updated_at",
        )
        .bind(&new.name)
        .bind(new.stock)
        .bind(new.owner.as_i64())
        .fetch_one(&self.pool)
        .await
        .map_err(storage)?;

        item_from_row(row)
    }

    pub async fn items_get(&self, id: ItemId) -> Result<Option<Item>, StoreError> {
        let row = sqlx::query(
            "SELECT id, name, stock, owner_id, created_at, updated_at
             FROM items WHERE id = $1",
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?;

        row.map(item_from_row).transpose()
    }

    pub async fn items_list_for_owner(&self, owner: UserId) -> Result<Vec<Item>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, name, stock, owner_id, created_at, updated_at
             FROM items WHERE owner_id = $1 ORDER BY id",
        )
        .bind(owner.as_i64())
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;

        rows.into_iter().map(item_from_row).collect()
    }

    pub async fn items_update(&self, id: ItemId, changes: ItemChanges) -> Result<Item, StoreError> {
        let row = sqlx::query(
            "UPDATE items
             SET name = COALESCE($2, name),
                 stock = COALESCE($3, stock),
                 updated_at = now()
             WHERE id = $1
             RETURNING id, name, stock, owner_id, created_at, updated_at",
        )
        .bind(id.as_i64())
        .bind(changes.name)
        .bind(changes.stock)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?;

        row.map(item_from_row).transpose()?.ok_or(StoreError::NotFound)
    }

    pub async fn items_delete(&self, id: ItemId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await
            .map_err(storage)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    // ── Posts ────────────────────────────────────────────────────────────

    pub async fn posts_create(&self, new: NewPost) -> Result<Post, StoreError> {
        let row = sqlx::query(
            "INSERT INTO posts (title, content, category, tags, status, author, owner_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING id, title, content, category, tags, status, author, owner_id, created_at, updated_at",
        )
        .bind(&new.title)
        .bind(&new.content)
        .bind(&new.category)
        .bind(&new.tags)
        .bind(new.status.as_str())
        .bind(&new.author)
        .bind(new.owner.as_i64())
        .fetch_one(&self.pool)
        .await
        .map_err(storage)?;

        post_from_row(row)
    }

    pub async fn posts_get(&self, id: PostId) -> Result<Option<Post>, StoreError> {
        let row = sqlx::query(
            "SELECT id, title, content, category, tags, status, author, owner_id, created_at, updated_at
             FROM posts WHERE id = $1",
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?;

        row.map(post_from_row).transpose()
    }

    pub async fn posts_list_all(&self) -> Result<Vec<Post>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, title, content, category, tags, status, author, owner_id, created_at, updated_at
             FROM posts ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;

        rows.into_iter().map(post_from_row).collect()
    }

    pub async fn posts_update(&self, id: PostId, changes: PostChanges) -> Result<Post, StoreError> {
        let row = sqlx::query(
            "UPDATE posts
             SET title = COALESCE($2, title),
                 content = COALESCE($3, content),
                 category = COALESCE($4, category),
                 tags = COALESCE($5, tags),
                 status = COALESCE($6, status),
                 author = COALESCE($7, author),
                 updated_at = now()
             WHERE id = $1
             RETURNING id, title, content, category, tags, status, author, owner_id, created_at, updated_at",
        )
        .bind(id.as_i64())
        .bind(changes.title)
        .bind(changes.content)
        .bind(changes.category)
        .bind(changes.tags)
        .bind(changes.status.map(|s| s.as_str().to_string()))
        .bind(changes.author)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?;

        row.map(post_from_row).transpose()?.ok_or(StoreError::NotFound)
    }

    pub async fn posts_delete(&self, id: PostId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await
            .map_err(storage)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

fn storage(e: sqlx::Error) -> StoreError {
    StoreError::Storage(e.to_string())
}

fn user_from_row(row: sqlx::postgres::PgRow) -> Result<User, StoreError> {
    Ok(User {
        id: UserId::from_i64(row.try_get::<i64, _>("id").map_err(storage)?),
        username: row.try_get("username").map_err(storage)?,
        password_hash: row.try_get("password_hash").map_err(storage)?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at").map_err(storage)?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at").map_err(storage)?,
    })
}

fn item_from_row(row: sqlx::postgres::PgRow) -> Result<Item, StoreError> {
    Ok(Item {
        id: ItemId::from_i64(row.try_get::<i64, _>("id").map_err(storage)?),
        name: row.try_get("name").map_err(storage)?,
        stock: row.try_get("stock").map_err(storage)?,
        owner: UserId::from_i64(row.try_get::<i64, _>("owner_id").map_err(storage)?),
        created_at: row.try_get::<DateTime<Utc>, _>("created_at").map_err(storage)?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at").map_err(storage)?,
    })
}

fn post_from_row(row: sqlx::postgres::PgRow) -> Result<Post, StoreError> {
    let status: String = row.try_get("status").map_err(storage)?;
    Ok(Post {
        id: PostId::from_i64(row.try_get::<i64, _>("id").map_err(storage)?),
        title: row.try_get("title").map_err(storage)?,
        content: row.try_get("content").map_err(storage)?,
        category: row.try_get("category").map_err(storage)?,
        tags: row.try_get("tags").map_err(storage)?,
        status: PostStatus::parse(&status)
            .ok_or_else(|| StoreError::Storage(format!("unknown post status '{status}'")))?,
        author: row.try_get("author").map_err(storage)?,
        owner: UserId::from_i64(row.try_get::<i64, _>("owner_id").map_err(storage)?),
        created_at: row.try_get::<DateTime<Utc>, _>("created_at").map_err(storage)?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at").map_err(storage)?,
    })
}
