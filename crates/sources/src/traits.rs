//! Collaborator interfaces for the recommendation engine.
//!
//! The engine never talks to the backing document store directly; hosts
//! hand it implementations of these traits. This crate ships an in-memory
//! implementation (`MemorySource`) used by the CLI, the harness and the
//! tests; production embeddings implement the same traits over the real
//! store client. Pagination, retries and backoff are the implementation's
//! concern: the `list_*` methods return complete record sets.

use anyhow::Result;
use async_trait::async_trait;
use catalog::{FoodlistRecord, ItemRecord, MenuRecord, RestaurantRecord, UserId};

/// Full-scan access to the catalog records.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Every restaurant record in the store.
    async fn list_restaurants(&self) -> Result<Vec<RestaurantRecord>>;

    /// Every menu record in the store.
    async fn list_menus(&self) -> Result<Vec<MenuRecord>>;

    /// Every item record in the store.
    async fn list_items(&self) -> Result<Vec<ItemRecord>>;
}

/// Access to user-owned foodlists.
#[async_trait]
pub trait ListSource: Send + Sync {
    /// The foodlists owned by `user_id`. A user with no lists yields an
    /// empty vec, not an error.
    async fn lists_for_user(&self, user_id: &str) -> Result<Vec<FoodlistRecord>>;
}

/// Resolution of the current session's user.
#[async_trait]
pub trait IdentitySource: Send + Sync {
    /// The signed-in user, or `None` when the session resolves to nobody.
    /// Unresolved identity is a valid state, not a failure; the engine
    /// answers it with an empty recommendation list.
    async fn current_user_id(&self) -> Result<Option<UserId>>;
}
