//! # Recommendation Engine
//!
//! Coordinates one recommendation request end to end:
//!
//! ```text
//! CatalogSource + ListSource (concurrent fetch)
//!         |
//!         v
//! CatalogIndex::assemble  ->  FeatureCache::build
//!         |                         |
//!         v                         v
//! positive_restaurant_ids  ->  TasteModel::fit  ->  recommend
//! ```
//!
//! Fetches run concurrently on the async runtime; everything after them is
//! pure CPU work and runs on the blocking pool. Each request works off its
//! own snapshot, so concurrent requests for different users share nothing
//! mutable.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::info;

use catalog::{CatalogIndex, FoodlistRecord, ItemRecord, MenuRecord, RestaurantRecord};
use classifier::{positive_restaurant_ids, FeatureCache, Recommendation, TasteModel};
use sources::{CatalogSource, IdentitySource, ListSource};

/// Main engine coordinating the recommendation pipeline.
#[derive(Clone)]
pub struct RecommendationEngine {
    catalog_source: Arc<dyn CatalogSource>,
    list_source: Arc<dyn ListSource>,
    identity_source: Arc<dyn IdentitySource>,
}

impl RecommendationEngine {
    /// Create an engine from individually wired sources.
    pub fn new(
        catalog_source: Arc<dyn CatalogSource>,
        list_source: Arc<dyn ListSource>,
        identity_source: Arc<dyn IdentitySource>,
    ) -> Self {
        Self {
            catalog_source,
            list_source,
            identity_source,
        }
    }

    /// Create an engine from one backend implementing all three source
    /// traits, which is how the CLI and the tests wire `MemorySource`.
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: CatalogSource + ListSource + IdentitySource + 'static,
    {
        Self::new(store.clone(), store.clone(), store)
    }

    /// Main entry point: ranked recommendations for a user.
    ///
    /// The response excludes restaurants the user already likes and is
    /// sorted by descending liked-probability. Unknown users are served
    /// the cold-start ranking rather than an error.
    pub async fn get_recommendations_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<Recommendation>> {
        let start = Instant::now();
        let (restaurants, menus, items, lists) = self.fetch_snapshot(user_id).await?;

        // Assembly, extraction, fitting and ranking are CPU-bound; keep
        // them off the async executor.
        let owner = user_id.to_string();
        let recommendations = tokio::task::spawn_blocking(move || {
            let catalog = CatalogIndex::assemble(restaurants, menus, items);
            let cache = FeatureCache::build(&catalog);
            let positives = positive_restaurant_ids(&owner, &lists, &catalog);
            let model = TasteModel::fit(&catalog, &cache, positives)?;
            Ok::<_, anyhow::Error>(model.recommend(catalog.restaurants(), &cache))
        })
        .await
        .context("Recommendation task panicked")??;

        info!(
            "Ranked {} recommendations for user {} in {:?}",
            recommendations.len(),
            user_id,
            start.elapsed()
        );

        Ok(recommendations)
    }

    /// Ranked recommendations for whoever the session resolves to.
    ///
    /// No resolvable user means no personalization is possible; the
    /// answer is an empty list, not an error.
    pub async fn get_recommendations(&self) -> Result<Vec<Recommendation>> {
        let current = self
            .identity_source
            .current_user_id()
            .await
            .context("Failed to resolve current user")?;

        match current {
            Some(user_id) => self.get_recommendations_for_user(&user_id).await,
            None => {
                info!("No signed-in user resolved; returning empty recommendations");
                Ok(Vec::new())
            }
        }
    }

    /// Fit and return a user's model without ranking, for callers that
    /// want to inspect priors and feature weights or score candidates
    /// themselves.
    pub async fn build_model_for_user(&self, user_id: &str) -> Result<TasteModel> {
        let (restaurants, menus, items, lists) = self.fetch_snapshot(user_id).await?;

        let owner = user_id.to_string();
        let model = tokio::task::spawn_blocking(move || {
            let catalog = CatalogIndex::assemble(restaurants, menus, items);
            let cache = FeatureCache::build(&catalog);
            let positives = positive_restaurant_ids(&owner, &lists, &catalog);
            TasteModel::fit(&catalog, &cache, positives)
        })
        .await
        .context("Model fitting task panicked")??;

        Ok(model)
    }

    /// Fetch the four record streams for one request concurrently.
    async fn fetch_snapshot(
        &self,
        user_id: &str,
    ) -> Result<(
        Vec<RestaurantRecord>,
        Vec<MenuRecord>,
        Vec<ItemRecord>,
        Vec<FoodlistRecord>,
    )> {
        let (restaurants, menus, items, lists) = tokio::join!(
            self.catalog_source.list_restaurants(),
            self.catalog_source.list_menus(),
            self.catalog_source.list_items(),
            self.list_source.lists_for_user(user_id),
        );

        let restaurants = restaurants.context("Failed to fetch restaurants")?;
        let menus = menus.context("Failed to fetch menus")?;
        let items = items.context("Failed to fetch items")?;
        let lists = lists.context("Failed to fetch foodlists")?;

        info!(
            "Fetched snapshot for user {}: {} restaurants, {} menus, {} items, {} foodlists",
            user_id,
            restaurants.len(),
            menus.len(),
            items.len(),
            lists.len()
        );

        Ok((restaurants, menus, items, lists))
    }
}
