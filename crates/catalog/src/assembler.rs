//! Catalog assembly: flat store records in, nested restaurant graph out.
//!
//! The backing document store hands back three independent record streams
//! (restaurants, menus, items) whose foreign keys may be missing or stale.
//! Assembly resolves those keys once per request and never fails: records
//! that cannot be attached are excluded and counted, not raised.

use crate::types::{
    CatalogIndex, Item, ItemRecord, Menu, MenuRecord, Restaurant, RestaurantId, RestaurantRecord,
};
use std::collections::{HashMap, HashSet};
use tracing::debug;

impl CatalogIndex {
    /// Assemble flat store records into the nested catalog graph.
    ///
    /// ## Algorithm
    /// 1. Group menu records under their declared restaurant
    /// 2. Group item records under their declared restaurant
    /// 3. For each restaurant, in input order: attach each of its items to
    ///    the menu the item names; items naming no menu, or a menu that
    ///    belongs elsewhere, land in a synthetic "Uncategorized" bucket
    ///    appended after the listed menus
    ///
    /// Menus and items that reference a missing restaurant are excluded.
    /// The bucket is only created for restaurants that actually have
    /// orphan items.
    pub fn assemble(
        restaurants: Vec<RestaurantRecord>,
        menus: Vec<MenuRecord>,
        items: Vec<ItemRecord>,
    ) -> Self {
        let known_restaurants: HashSet<&str> =
            restaurants.iter().map(|r| r.id.as_str()).collect();

        let mut menus_by_restaurant: HashMap<RestaurantId, Vec<MenuRecord>> = HashMap::new();
        let mut dropped_menus = 0usize;
        for menu in menus {
            match &menu.restaurant_id {
                Some(id) if known_restaurants.contains(id.as_str()) => {
                    menus_by_restaurant.entry(id.clone()).or_default().push(menu);
                }
                _ => dropped_menus += 1,
            }
        }

        let mut items_by_restaurant: HashMap<RestaurantId, Vec<ItemRecord>> = HashMap::new();
        let mut excluded_items = 0usize;
        for item in items {
            match &item.restaurant_id {
                Some(id) if known_restaurants.contains(id.as_str()) => {
                    items_by_restaurant.entry(id.clone()).or_default().push(item);
                }
                _ => excluded_items += 1,
            }
        }

        let mut index = Self::new();
        let mut duplicate_restaurants = 0usize;
        for record in restaurants {
            if index.restaurants.contains_key(&record.id) {
                duplicate_restaurants += 1;
                continue;
            }
            let restaurant_menus = menus_by_restaurant.remove(&record.id).unwrap_or_default();
            let restaurant_items = items_by_restaurant.remove(&record.id).unwrap_or_default();
            index.insert_restaurant(build_restaurant(record, restaurant_menus, restaurant_items));
        }

        let (n_restaurants, n_menus, n_items) = index.counts();
        debug!(
            "Assembled catalog: {} restaurants, {} menus, {} items",
            n_restaurants, n_menus, n_items
        );
        if excluded_items > 0 || dropped_menus > 0 || duplicate_restaurants > 0 {
            debug!(
                "Assembly exclusions: {} items without a known restaurant, {} menus without a known restaurant, {} duplicate restaurant records",
                excluded_items, dropped_menus, duplicate_restaurants
            );
        }

        index
    }
}

/// Attach a restaurant's items to its menus; orphans go to the bucket.
fn build_restaurant(
    record: RestaurantRecord,
    menu_records: Vec<MenuRecord>,
    item_records: Vec<ItemRecord>,
) -> Restaurant {
    let menu_ids: HashSet<String> = menu_records.iter().map(|m| m.id.clone()).collect();

    let mut items_by_menu: HashMap<String, Vec<Item>> = HashMap::new();
    let mut orphans = Vec::new();
    for item_record in item_records {
        let ItemRecord {
            id,
            name,
            item_type,
            cuisine,
            tags,
            price,
            menu_id,
            ..
        } = item_record;
        let item = Item {
            id,
            name,
            item_type,
            cuisine,
            tags,
            price,
        };
        match menu_id {
            Some(menu_id) if menu_ids.contains(&menu_id) => {
                items_by_menu.entry(menu_id).or_default().push(item);
            }
            _ => orphans.push(item),
        }
    }

    let mut menus = Vec::with_capacity(menu_records.len() + 1);
    for menu in menu_records {
        let items = items_by_menu.remove(&menu.id).unwrap_or_default();
        menus.push(Menu::Listed {
            id: menu.id,
            name: menu.name,
            items,
        });
    }
    if !orphans.is_empty() {
        menus.push(Menu::OrphanBucket { items: orphans });
    }

    Restaurant {
        id: record.id,
        name: record.name,
        cuisines: record.cuisines,
        ambiences: record.ambiences,
        menus,
    }
}
