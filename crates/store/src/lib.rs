//! `stashpad-store`: persistence collaborators for users, items, and posts.
//!
//! The auth core treats these as external collaborators: credential lookup is
//! a case-sensitive exact match, creation enforces username uniqueness, and
//! owned-resource lookups return snapshots for the ownership decision.

pub mod in_memory;
pub mod records;

#[cfg(feature = "postgres")]
pub mod postgres;

pub use in_memory::InMemoryStores;
pub use records::{
    Item, ItemChanges, NewItem, NewPost, Post, PostChanges, PostStatus, StoreError, User,
};

#[cfg(feature = "postgres")]
pub use postgres::PostgresStores;
