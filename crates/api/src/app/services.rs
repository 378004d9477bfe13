use stashpad_core::{ItemId, PostId, UserId};
use stashpad_store::{
    InMemoryStores, Item, ItemChanges, NewItem, NewPost, Post, PostChanges, StoreError, User,
};

#[cfg(feature = "postgres")]
use sqlx::PgPool;
#[cfg(feature = "postgres")]
use stashpad_store::PostgresStores;

/// Storage backend behind the HTTP handlers.
///
/// Handlers call the methods below and never see which backend is active.
pub enum AppServices {
    InMemory {
        stores: InMemoryStores,
    },
    #[cfg(feature = "postgres")]
    Persistent {
        stores: PostgresStores,
    },
}

pub async fn build_services() -> AppServices {
    let use_persistent = std::env::var("USE_PERSISTENT_STORES")
        .unwrap_or_else(|_| "false".to_string())
        .parse::<bool>()
        .unwrap_or(false);

    if use_persistent {
        #[cfg(feature = "postgres")]
        {
            return build_persistent_services().await;
        }
        #[cfg(not(feature = "postgres"))]
        {
            tracing::warn!(
                "USE_PERSISTENT_STORES=true but postgres feature not enabled, falling back to in-memory"
            );
            return build_in_memory_services();
        }
    }

    build_in_memory_services()
}

fn build_in_memory_services() -> AppServices {
    AppServices::InMemory {
        stores: InMemoryStores::new(),
    }
}

#[cfg(feature = "postgres")]
async fn build_persistent_services() -> AppServices {
    let database_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set when USE_PERSISTENT_STORES=true");

    let pool = PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to Postgres");

    let stores = PostgresStores::new(pool);
    stores
        .migrate()
        .await
        .expect("Failed to run schema migration");

    AppServices::Persistent { stores }
}

impl AppServices {
    pub async fn users_find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<User>, StoreError> {
        match self {
            AppServices::InMemory { stores } => stores.users_find_by_username(username),
            #[cfg(feature = "postgres")]
            AppServices::Persistent { stores } => stores.users_find_by_username(username).await,
        }
    }

    pub async fn users_create(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<User, StoreError> {
        match self {
            AppServices::InMemory { stores } => stores.users_create(username, password_hash),
            #[cfg(feature = "postgres")]
            AppServices::Persistent { stores } => stores.users_create(username, password_hash).await,
        }
    }

    pub async fn items_create(&self, new: NewItem) -> Result<Item, StoreError> {
        match self {
            AppServices::InMemory { stores } => stores.items_create(new),
            #[cfg(feature = "postgres")]
            AppServices::Persistent { stores } => stores.items_create(new).await,
        }
    }

    pub async fn items_get(&self, id: ItemId) -> Result<Option<Item>, StoreError> {
        match self {
            AppServices::InMemory { stores } => stores.items_get(id),
            #[cfg(feature = "postgres")]
            AppServices::Persistent { stores } => stores.items_get(id).await,
        }
    }

    pub async fn items_list_for_owner(&self, owner: UserId) -> Result<Vec<Item>, StoreError> {
        match self {
            AppServices::InMemory { stores } => stores.items_list_for_owner(owner),
            #[cfg(feature = "postgres")]
            AppServices::Persistent { stores } => stores.items_list_for_owner(owner).await,
        }
    }

    pub async fn items_update(&self, id: ItemId, changes: ItemChanges) -> Result<Item, StoreError> {
        match self {
            AppServices::InMemory { stores } => stores.items_update(id, changes),
            #[cfg(feature = "postgres")]
            AppServices::Persistent { stores } => stores.items_update(id, changes).await,
        }
    }

    pub async fn items_delete(&self, id: ItemId) -> Result<(), StoreError> {
        match self {
            AppServices::InMemory { stores } => stores.items_delete(id),
            #[cfg(feature = "postgres")]
            AppServices::Persistent { stores } => stores.items_delete(id).await,
        }
    }

    pub async fn posts_create(&self, new: NewPost) -> Result<Post, StoreError> {
        match self {
            AppServices::InMemory { stores } => stores.posts_create(new),
            #[cfg(feature = "postgres")]
            AppServices::Persistent { stores } => stores.posts_create(new).await,
        }
    }

    pub async fn posts_get(&self, id: PostId) -> Result<Option<Post>, StoreError> {
        match self {
            AppServices::InMemory { stores } => stores.posts_get(id),
            #[cfg(feature = "postgres")]
            AppServices::Persistent { stores } => stores.posts_get(id).await,
        }
    }

    pub async fn posts_list_all(&self) -> Result<Vec<Post>, StoreError> {
        match self {
            AppServices::InMemory { stores } => stores.posts_list_all(),
            #[cfg(feature = "postgres")]
            AppServices::Persistent { stores } => stores.posts_list_all().await,
        }
    }

    pub async fn posts_update(&self, id: PostId, changes: PostChanges) -> Result<Post, StoreError> {
        match self {
            AppServices::InMemory { stores } => stores.posts_update(id, changes),
            #[cfg(feature = "postgres")]
            AppServices::Persistent { stores } => stores.posts_update(id, changes).await,
        }
    }

    pub async fn posts_delete(&self, id: PostId) -> Result<(), StoreError> {
        match self {
            AppServices::InMemory { stores } => stores.posts_delete(id),
            #[cfg(feature = "postgres")]
            AppServices::Persistent { stores } => stores.posts_delete(id).await,
        }
    }
}
