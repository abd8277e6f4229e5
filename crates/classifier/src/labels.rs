//! Positive-label derivation from user foodlists.
//!
//! The only supervision signal in the system is implicit: a user saving an
//! item to one of their foodlists marks the item's restaurant as liked.
//! There are no ratings and no dislike signal, so every restaurant outside
//! the derived set trains as a negative example.

use catalog::{CatalogIndex, FoodlistRecord, RestaurantId};
use std::collections::HashSet;
use tracing::debug;

/// Restaurants implicitly liked by `user_id`.
///
/// ## Algorithm
/// 1. Union the item ids across every foodlist owned by the user
/// 2. Map each item id through the catalog's item -> restaurant index
/// 3. Collect the distinct restaurant ids
///
/// Item ids that resolve to no restaurant (deleted items, items excluded
/// during assembly) are skipped. Lists owned by other users are ignored,
/// so callers may pass an unfiltered batch.
pub fn positive_restaurant_ids(
    user_id: &str,
    lists: &[FoodlistRecord],
    catalog: &CatalogIndex,
) -> HashSet<RestaurantId> {
    let mut liked_items: HashSet<&str> = HashSet::new();
    for list in lists.iter().filter(|list| list.owner_id == user_id) {
        liked_items.extend(list.item_ids.iter().map(String::as_str));
    }

    let mut positives = HashSet::new();
    let mut unresolved = 0usize;
    for item_id in &liked_items {
        match catalog.restaurant_for_item(item_id) {
            Some(restaurant_id) => {
                positives.insert(restaurant_id.to_string());
            }
            None => unresolved += 1,
        }
    }

    debug!(
        "Derived {} positive restaurants from {} listed items for user {} ({} unresolved)",
        positives.len(),
        liked_items.len(),
        user_id,
        unresolved
    );

    positives
}
