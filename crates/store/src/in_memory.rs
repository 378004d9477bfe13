use std::collections::BTreeMap;
use std::sync::RwLock;

use chrono::Utc;

use stashpad_core::{ItemId, PostId, UserId};

use crate::records::{
    Item, ItemChanges, NewItem, NewPost, Post, PostChanges, StoreError, User,
};

#[derive(Debug, Default)]
struct Tables {
    next_user_id: i64,
    next_item_id: i64,
    next_post_id: i64,
    users: BTreeMap<UserId, User>,
    items: BTreeMap<ItemId, Item>,
    posts: BTreeMap<PostId, Post>,
}

/// In-memory backing store.
///
/// Intended for tests/dev. Not optimized for performance.
#[derive(Debug, Default)]
pub struct InMemoryStores {
    tables: RwLock<Tables>,
}

impl InMemoryStores {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Tables>, StoreError> {
        self.tables
            .read()
            .map_err(|_| StoreError::Storage("lock poisoned".to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Tables>, StoreError> {
        self.tables
            .write()
            .map_err(|_| StoreError::Storage("lock poisoned".to_string()))
    }

    // ── Users ────────────────────────────────────────────────────────────

    /// Case-sensitive exact match on username.
    pub fn users_find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let tables = self.read()?;
        Ok(tables
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    pub fn users_create(&self, username: &str, password_hash: &str) -> Result<User, StoreError> {
        let mut tables = self.write()?;
        if tables.users.values().any(|u| u.username == username) {
            return Err(StoreError::DuplicateUsername);
        }

        tables.next_user_id += 1;
        let now = Utc::now();
        let user = User {
            id: UserId::from_i64(tables.next_user_id),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    // ── Items ────────────────────────────────────────────────────────────

    pub fn items_create(&self, new: NewItem) -> Result<Item, StoreError> {
        let mut tables = self.write()?;
        tables.next_item_id += 1;
        let now = Utc::now();
        let item = Item {
            id: ItemId::from_i64(tables.next_item_id),
            name: new.name,
            stock: new.stock,
            owner: new.owner,
            created_at: now,
            updated_at: now,
        };
        tables.items.insert(item.id, item.clone());
        Ok(item)
    }

    pub fn items_get(&self, id: ItemId) -> Result<Option<Item>, StoreError> {
        Ok(self.read()?.items.get(&id).cloned())
    }

    pub fn items_list_for_owner(&self, owner: UserId) -> Result<Vec<Item>, StoreError> {
        let tables = self.read()?;
        Ok(tables
            .items
            .values()
            .filter(|i| i.owner == owner)
            .cloned()
            .collect())
    }

    pub fn items_update(&self, id: ItemId, changes: ItemChanges) -> Result<Item, StoreError> {
        let mut tables = self.write()?;
        let item = tables.items.get_mut(&id).ok_or(StoreError::NotFound)?;
        if let Some(name) = changes.name {
            item.name = name;
        }
        if let Some(stock) = changes.stock {
            item.stock = stock;
        }
        item.updated_at = Utc::now();
        Ok(item.clone())
    }

    pub fn items_delete(&self, id: ItemId) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        tables.items.remove(&id).map(|_| ()).ok_or(StoreError::NotFound)
    }

    // ── Posts ────────────────────────────────────────────────────────────

    pub fn posts_create(&self, new: NewPost) -> Result<Post, StoreError> {
        let mut tables = self.write()?;
        tables.next_post_id += 1;
        let now = Utc::now();
        let post = Post {
            id: PostId::from_i64(tables.next_post_id),
            title: new.title,
            content: new.content,
            category: new.category,
            tags: new.tags,
            status: new.status,
            author: new.author,
            owner: new.owner,
            created_at: now,
            updated_at: now,
        };
        tables.posts.insert(post.id, post.clone());
        Ok(post)
    }

    pub fn posts_get(&self, id: PostId) -> Result<Option<Post>, StoreError> {
        Ok(self.read()?.posts.get(&id).cloned())
    }

    /// All posts across owners, newest first.
    pub fn posts_list_all(&self) -> Result<Vec<Post>, StoreError> {
        let tables = self.read()?;
        let mut posts: Vec<Post> = tables.posts.values().cloned().collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(posts)
    }

    pub fn posts_update(&self, id: PostId, changes: PostChanges) -> Result<Post, StoreError> {
        let mut tables = self.write()?;
        let post = tables.posts.get_mut(&id).ok_or(StoreError::NotFound)?;
        if let Some(title) = changes.title {
            post.title = title;
        }
        if let Some(content) = changes.content {
            post.content = content;
        }
        if let Some(category) = changes.category {
            post.category = category;
        }
        if let Some(tags) = changes.tags {
            post.tags = tags;
        }
        if let Some(status) = changes.status {
            post.status = status;
        }
        if let Some(author) = changes.author {
            post.author = author;
        }
        post.updated_at = Utc::now();
        Ok(post.clone())
    }

    pub fn posts_delete(&self, id: PostId) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        tables.posts.remove(&id).map(|_| ()).ok_or(StoreError::NotFound)
    }
}
