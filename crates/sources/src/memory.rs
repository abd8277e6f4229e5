//! In-memory source backed by a JSON fixture snapshot.

use crate::traits::{CatalogSource, IdentitySource, ListSource};
use anyhow::{Context, Result};
use async_trait::async_trait;
use catalog::{FoodlistRecord, ItemRecord, MenuRecord, RestaurantRecord, UserId};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// A complete snapshot of the document store as one JSON document.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CatalogFixture {
    pub restaurants: Vec<RestaurantRecord>,
    pub menus: Vec<MenuRecord>,
    pub items: Vec<ItemRecord>,
    pub foodlists: Vec<FoodlistRecord>,
}

/// Serves a `CatalogFixture` through all three collaborator traits.
///
/// Never mutated after construction, so one instance can back any number
/// of concurrent requests.
#[derive(Debug, Default, Clone)]
pub struct MemorySource {
    fixture: CatalogFixture,
    current_user: Option<UserId>,
}

impl MemorySource {
    pub fn new(fixture: CatalogFixture) -> Self {
        Self {
            fixture,
            current_user: None,
        }
    }

    /// Load a snapshot from a JSON file on disk.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read fixture {}", path.display()))?;
        let fixture: CatalogFixture = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse fixture {}", path.display()))?;

        info!(
            "Loaded fixture {}: {} restaurants, {} menus, {} items, {} foodlists",
            path.display(),
            fixture.restaurants.len(),
            fixture.menus.len(),
            fixture.items.len(),
            fixture.foodlists.len()
        );

        Ok(Self::new(fixture))
    }

    /// Pin the user this source's `IdentitySource` resolves to.
    pub fn with_current_user(mut self, user_id: impl Into<UserId>) -> Self {
        self.current_user = Some(user_id.into());
        self
    }

    /// The raw snapshot, for harnesses that want record-level stats.
    pub fn fixture(&self) -> &CatalogFixture {
        &self.fixture
    }

    /// Distinct foodlist owners, sorted. Handy for demo harnesses that
    /// need to pick a user with actual signal.
    pub fn known_users(&self) -> Vec<UserId> {
        let mut users: Vec<UserId> = self
            .fixture
            .foodlists
            .iter()
            .map(|list| list.owner_id.clone())
            .collect();
        users.sort();
        users.dedup();
        users
    }
}

#[async_trait]
impl CatalogSource for MemorySource {
    async fn list_restaurants(&self) -> Result<Vec<RestaurantRecord>> {
        Ok(self.fixture.restaurants.clone())
    }

    async fn list_menus(&self) -> Result<Vec<MenuRecord>> {
        Ok(self.fixture.menus.clone())
    }

    async fn list_items(&self) -> Result<Vec<ItemRecord>> {
        Ok(self.fixture.items.clone())
    }
}

#[async_trait]
impl ListSource for MemorySource {
    async fn lists_for_user(&self, user_id: &str) -> Result<Vec<FoodlistRecord>> {
        Ok(self
            .fixture
            .foodlists
            .iter()
            .filter(|list| list.owner_id == user_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl IdentitySource for MemorySource {
    async fn current_user_id(&self) -> Result<Option<UserId>> {
        Ok(self.current_user.clone())
    }
}
