//! Feature extraction for restaurant classification.
//!
//! Each restaurant is reduced to a set of categorical tokens of the form
//! `kind:value`, with kind one of `cuisine`, `ambience`, `tag`, `type`,
//! `itemCuisine`. A token is either present or absent for a restaurant.
//! Duplicates collapse: a restaurant with ten spicy dishes carries
//! `tag:spicy` exactly once, so the downstream model reasons about
//! presence, not frequency.

use catalog::{CatalogIndex, Restaurant, RestaurantId};
use rayon::prelude::*;
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// Extract the feature set of a single restaurant.
///
/// Pure and order-independent: the same restaurant yields the same set no
/// matter how its attribute arrays happen to be ordered. Values are
/// lower-cased so "Thai" and "thai" collapse to one token; empty values
/// emit nothing.
pub fn extract_features(restaurant: &Restaurant) -> BTreeSet<String> {
    let mut features = BTreeSet::new();

    for cuisine in &restaurant.cuisines {
        push_token(&mut features, "cuisine", cuisine);
    }
    for ambience in &restaurant.ambiences {
        push_token(&mut features, "ambience", ambience);
    }
    for item in restaurant.items() {
        for tag in &item.tags {
            push_token(&mut features, "tag", tag);
        }
        if let Some(item_type) = &item.item_type {
            push_token(&mut features, "type", item_type);
        }
        if let Some(cuisine) = &item.cuisine {
            push_token(&mut features, "itemCuisine", cuisine);
        }
    }

    features
}

fn push_token(features: &mut BTreeSet<String>, kind: &str, value: &str) {
    if value.is_empty() {
        return;
    }
    features.insert(format!("{}:{}", kind, value.to_lowercase()));
}

/// Feature sets for every restaurant in one catalog snapshot.
///
/// Built once per recommendation request and shared by the model builder
/// (class counting) and the scorer (candidate lookup), so no restaurant is
/// extracted twice within a request. Nothing persists across requests:
/// the next request re-extracts from its own snapshot.
///
/// Feature sets are ordered (`BTreeSet`), which keeps every downstream
/// log-probability sum running in a fixed order. Identical inputs produce
/// bit-identical scores.
#[derive(Debug, Default)]
pub struct FeatureCache {
    features: HashMap<RestaurantId, BTreeSet<String>>,
    vocabulary: BTreeSet<String>,
}

impl FeatureCache {
    /// Extract every restaurant in the catalog, in parallel, and record
    /// the combined vocabulary.
    pub fn build(catalog: &CatalogIndex) -> Self {
        let restaurants: Vec<&Restaurant> = catalog.restaurants().collect();
        let features: HashMap<RestaurantId, BTreeSet<String>> = restaurants
            .par_iter()
            .map(|restaurant| (restaurant.id.clone(), extract_features(restaurant)))
            .collect();

        let mut vocabulary = BTreeSet::new();
        for set in features.values() {
            vocabulary.extend(set.iter().cloned());
        }

        debug!(
            "Built feature cache: {} restaurants, {} distinct features",
            features.len(),
            vocabulary.len()
        );

        Self {
            features,
            vocabulary,
        }
    }

    /// Feature set of a restaurant, if it was part of the build.
    pub fn get(&self, id: &str) -> Option<&BTreeSet<String>> {
        self.features.get(id)
    }

    /// Union of every restaurant's features.
    pub fn vocabulary(&self) -> &BTreeSet<String> {
        &self.vocabulary
    }

    /// Number of restaurants extracted.
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}
