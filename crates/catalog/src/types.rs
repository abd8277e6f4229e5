//! Core domain types for the restaurant catalog.
//!
//! Two families of types live here:
//! - **Wire records** (`RestaurantRecord`, `MenuRecord`, `ItemRecord`,
//!   `FoodlistRecord`): flat rows exactly as the backing document store
//!   returns them. Foreign keys are optional because records in the store
//!   can be partially filled in or point at entities that no longer exist.
//! - **Assembled entities** (`Restaurant`, `Menu`, `Item`): the nested
//!   graph produced by the catalog assembler, with menus attached to their
//!   restaurant and items attached to their menu.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// =============================================================================
// Id aliases
// =============================================================================
// The document store keys every entity by an opaque string id.

/// Unique identifier for a restaurant.
pub type RestaurantId = String;

/// Unique identifier for a menu.
pub type MenuId = String;

/// Unique identifier for a menu item.
pub type ItemId = String;

/// Unique identifier for a user.
pub type UserId = String;

/// Unique identifier for a foodlist.
pub type ListId = String;

// =============================================================================
// Wire records
// =============================================================================

/// A restaurant row as stored in the document store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantRecord {
    pub id: RestaurantId,
    #[serde(default)]
    pub name: String,
    /// Cuisine tags, e.g. "Thai", "Italian". Order carries no meaning.
    #[serde(default)]
    pub cuisines: Vec<String>,
    /// Ambience tags, e.g. "casual", "rooftop".
    #[serde(default)]
    pub ambiences: Vec<String>,
}

/// A menu row. `restaurant_id` is a back-reference only; nesting is
/// established by the assembler, not by this record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuRecord {
    pub id: MenuId,
    #[serde(default)]
    pub name: String,
    pub restaurant_id: Option<RestaurantId>,
}

/// An item row. Items are created and updated by the menu-management
/// screens; the recommender only ever reads them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRecord {
    pub id: ItemId,
    #[serde(default)]
    pub name: String,
    /// Category token, e.g. "meal", "drink", "dessert".
    #[serde(rename = "type")]
    pub item_type: Option<String>,
    pub cuisine: Option<String>,
    /// Free-form tags, e.g. "spicy", "vegan".
    #[serde(default)]
    pub tags: Vec<String>,
    pub price: Option<f64>,
    pub restaurant_id: Option<RestaurantId>,
    pub menu_id: Option<MenuId>,
}

/// A user-owned foodlist. Only read to derive positive labels; the
/// recommender never mutates one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodlistRecord {
    pub id: ListId,
    pub owner_id: UserId,
    #[serde(default)]
    pub item_ids: Vec<ItemId>,
}

// =============================================================================
// Assembled entities
// =============================================================================

/// A menu item once attached under its menu.
#[derive(Debug, Clone)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub item_type: Option<String>,
    pub cuisine: Option<String>,
    pub tags: Vec<String>,
    pub price: Option<f64>,
}

/// A menu attached to a restaurant.
///
/// Items whose declared menu id resolves to none of the restaurant's menus
/// are grouped under the `OrphanBucket` variant instead of being dropped.
/// The bucket displays as "Uncategorized" and exists only when at least
/// one orphan item does.
#[derive(Debug, Clone)]
pub enum Menu {
    /// A menu that exists as a record in the store.
    Listed {
        id: MenuId,
        name: String,
        items: Vec<Item>,
    },
    /// Synthetic container for items with no resolvable menu.
    OrphanBucket { items: Vec<Item> },
}

impl Menu {
    /// Display name; the orphan bucket renders as "Uncategorized".
    pub fn name(&self) -> &str {
        match self {
            Menu::Listed { name, .. } => name,
            Menu::OrphanBucket { .. } => "Uncategorized",
        }
    }

    /// Store id, if this menu exists as a record.
    pub fn id(&self) -> Option<&MenuId> {
        match self {
            Menu::Listed { id, .. } => Some(id),
            Menu::OrphanBucket { .. } => None,
        }
    }

    /// Items attached to this menu.
    pub fn items(&self) -> &[Item] {
        match self {
            Menu::Listed { items, .. } => items,
            Menu::OrphanBucket { items } => items,
        }
    }
}

/// A restaurant with its menus (and their items) attached.
#[derive(Debug, Clone)]
pub struct Restaurant {
    pub id: RestaurantId,
    pub name: String,
    pub cuisines: Vec<String>,
    pub ambiences: Vec<String>,
    pub menus: Vec<Menu>,
}

impl Restaurant {
    /// Iterate every item across every menu, the orphan bucket included.
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.menus.iter().flat_map(|menu| menu.items().iter())
    }
}

// =============================================================================
// CatalogIndex - the assembled catalog for one request
// =============================================================================

/// The assembled catalog: every restaurant with its nested menus, plus the
/// item -> restaurant index consumed by label derivation.
///
/// Restaurants iterate in the order their records arrived. Ranking breaks
/// probability ties by input order, so the index has to preserve it rather
/// than rely on hash-map iteration.
#[derive(Debug, Default)]
pub struct CatalogIndex {
    pub(crate) restaurants: HashMap<RestaurantId, Restaurant>,
    pub(crate) order: Vec<RestaurantId>,
    pub(crate) item_restaurants: HashMap<ItemId, RestaurantId>,
}

impl CatalogIndex {
    /// Creates a new, empty CatalogIndex.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a restaurant by id.
    pub fn get_restaurant(&self, id: &str) -> Option<&Restaurant> {
        self.restaurants.get(id)
    }

    /// Parent restaurant of an item, if the item was attached anywhere.
    pub fn restaurant_for_item(&self, item_id: &str) -> Option<&str> {
        self.item_restaurants.get(item_id).map(String::as_str)
    }

    /// All restaurants, in input order.
    pub fn restaurants(&self) -> impl Iterator<Item = &Restaurant> {
        self.order.iter().filter_map(|id| self.restaurants.get(id))
    }

    /// Number of restaurants in the catalog.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// (restaurants, menus, attached items) for logging and stats.
    pub fn counts(&self) -> (usize, usize, usize) {
        let menus = self.restaurants.values().map(|r| r.menus.len()).sum();
        (self.order.len(), menus, self.item_restaurants.len())
    }

    /// Insert an assembled restaurant and index its items.
    pub(crate) fn insert_restaurant(&mut self, restaurant: Restaurant) {
        for item in restaurant.items() {
            self.item_restaurants
                .insert(item.id.clone(), restaurant.id.clone());
        }
        self.order.push(restaurant.id.clone());
        self.restaurants.insert(restaurant.id.clone(), restaurant);
    }
}
