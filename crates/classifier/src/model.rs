//! Naive Bayes model fitting.
//!
//! Fits a binary liked / not-liked classifier over the full catalog with
//! Laplace (add-one) smoothing. A fitted model is an immutable snapshot:
//! it owns every table it scores with, never touches the catalog again,
//! and lives for the duration of one request because the label set is
//! user-specific.

use crate::features::FeatureCache;
use catalog::{CatalogIndex, Restaurant, RestaurantId};
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::{debug, instrument};

/// Floor for the not-liked prior, keeping its logarithm finite even when a
/// caller hands in at least as many positive ids as the catalog has
/// restaurants.
const PRIOR_FLOOR: f64 = 1e-12;

/// Errors surfaced by model fitting.
#[derive(Error, Debug)]
pub enum ModelError {
    /// The catalog holds no restaurants, so there is nothing to fit or
    /// rank. Callers surface this instead of returning a made-up list.
    #[error("cannot fit a model over an empty catalog")]
    EmptyCatalog,
}

/// A fitted Naive Bayes taste model for one user.
///
/// Holds log-space priors and per-feature conditionals for both classes,
/// plus the positive label set so the scorer can exclude already-liked
/// restaurants. All fields are fixed at `fit` time.
#[derive(Debug, Clone)]
pub struct TasteModel {
    pub(crate) log_prior_liked: f64,
    pub(crate) log_prior_not_liked: f64,
    pub(crate) liked_log_probs: HashMap<String, f64>,
    pub(crate) not_liked_log_probs: HashMap<String, f64>,
    /// Per-class fallback for features outside the fitted vocabulary.
    pub(crate) liked_default_log_prob: f64,
    pub(crate) not_liked_default_log_prob: f64,
    pub(crate) positive_ids: HashSet<RestaurantId>,
}

impl TasteModel {
    /// Fit a model over the catalog given the user's positive label set.
    ///
    /// ## Algorithm
    /// With N restaurants, P positive labels, Np = max(N - P, 0) negatives
    /// and vocabulary size V (floored at 1), everything add-one smoothed:
    /// - priors: P(liked) = (P + 1) / (N + 2), P(not liked) = 1 - P(liked)
    /// - conditionals: P(f | class) = (count(f, class) + 1) / (|class| + V),
    ///   precomputed in log space for every vocabulary feature
    /// - out-of-vocabulary fallback per class: log(1 / (|class| + V))
    ///
    /// A user with no positives still gets a valid, heavily
    /// negative-leaning model. Only an empty catalog is rejected.
    #[instrument(skip_all, fields(restaurants = catalog.len(), positives = positive_ids.len()))]
    pub fn fit(
        catalog: &CatalogIndex,
        cache: &FeatureCache,
        positive_ids: HashSet<RestaurantId>,
    ) -> Result<Self, ModelError> {
        let n = catalog.len();
        if n == 0 {
            return Err(ModelError::EmptyCatalog);
        }

        let p = positive_ids.len();
        let np = n.saturating_sub(p);
        let vocabulary = cache.vocabulary();
        let v = vocabulary.len().max(1);

        let prior_liked = (p as f64 + 1.0) / (n as f64 + 2.0);
        let prior_not_liked = (1.0 - prior_liked).max(PRIOR_FLOOR);

        // Per-class presence counts, aggregated in parallel.
        let restaurants: Vec<&Restaurant> = catalog.restaurants().collect();
        let (liked_counts, not_liked_counts) = restaurants
            .par_iter()
            .fold(
                || (HashMap::new(), HashMap::new()),
                |(mut liked, mut not_liked): (HashMap<String, u32>, HashMap<String, u32>),
                 restaurant| {
                    let counts = if positive_ids.contains(&restaurant.id) {
                        &mut liked
                    } else {
                        &mut not_liked
                    };
                    if let Some(features) = cache.get(&restaurant.id) {
                        for feature in features {
                            *counts.entry(feature.clone()).or_insert(0) += 1;
                        }
                    }
                    (liked, not_liked)
                },
            )
            .reduce(
                || (HashMap::new(), HashMap::new()),
                |(mut liked_acc, mut not_liked_acc), (liked, not_liked)| {
                    for (feature, count) in liked {
                        *liked_acc.entry(feature).or_insert(0) += count;
                    }
                    for (feature, count) in not_liked {
                        *not_liked_acc.entry(feature).or_insert(0) += count;
                    }
                    (liked_acc, not_liked_acc)
                },
            );

        let liked_denom = p as f64 + v as f64;
        let not_liked_denom = np as f64 + v as f64;

        let mut liked_log_probs = HashMap::with_capacity(vocabulary.len());
        let mut not_liked_log_probs = HashMap::with_capacity(vocabulary.len());
        for feature in vocabulary {
            let liked_count = liked_counts.get(feature).copied().unwrap_or(0) as f64;
            let not_liked_count = not_liked_counts.get(feature).copied().unwrap_or(0) as f64;
            liked_log_probs.insert(feature.clone(), ((liked_count + 1.0) / liked_denom).ln());
            not_liked_log_probs.insert(
                feature.clone(),
                ((not_liked_count + 1.0) / not_liked_denom).ln(),
            );
        }

        debug!(
            "Fitted model: {} restaurants ({} liked), vocabulary {}",
            n, p, v
        );

        Ok(Self {
            log_prior_liked: prior_liked.ln(),
            log_prior_not_liked: prior_not_liked.ln(),
            liked_log_probs,
            not_liked_log_probs,
            liked_default_log_prob: (1.0 / liked_denom).ln(),
            not_liked_default_log_prob: (1.0 / not_liked_denom).ln(),
            positive_ids,
        })
    }

    /// Natural log of the liked-class prior.
    pub fn log_prior_liked(&self) -> f64 {
        self.log_prior_liked
    }

    /// Natural log of the not-liked-class prior.
    pub fn log_prior_not_liked(&self) -> f64 {
        self.log_prior_not_liked
    }

    /// Number of distinct features the model was fitted over.
    pub fn vocabulary_len(&self) -> usize {
        self.liked_log_probs.len()
    }

    /// The label set the model was fitted with.
    pub fn positive_ids(&self) -> &HashSet<RestaurantId> {
        &self.positive_ids
    }

    /// Features most indicative of the liked class, ranked by the gap
    /// between their liked and not-liked log-probabilities. Ties break
    /// alphabetically so the output is reproducible.
    pub fn top_liked_features(&self, limit: usize) -> Vec<(String, f64)> {
        let mut ranked: Vec<(String, f64)> = self
            .liked_log_probs
            .iter()
            .map(|(feature, &liked)| {
                let not_liked = self
                    .not_liked_log_probs
                    .get(feature)
                    .copied()
                    .unwrap_or(self.not_liked_default_log_prob);
                (feature.clone(), liked - not_liked)
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        ranked.truncate(limit);
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::{ItemRecord, RestaurantRecord};

    fn record(id: &str, cuisine: &str) -> RestaurantRecord {
        RestaurantRecord {
            id: id.to_string(),
            name: format!("Restaurant {}", id),
            cuisines: vec![cuisine.to_string()],
            ambiences: vec![],
        }
    }

    fn spicy_item(id: &str, restaurant_id: &str) -> ItemRecord {
        ItemRecord {
            id: id.to_string(),
            name: "Dish".to_string(),
            item_type: Some("meal".to_string()),
            cuisine: None,
            tags: vec!["spicy".to_string()],
            price: None,
            restaurant_id: Some(restaurant_id.to_string()),
            menu_id: None,
        }
    }

    fn fit_over(
        restaurants: Vec<RestaurantRecord>,
        items: Vec<ItemRecord>,
        positives: &[&str],
    ) -> Result<TasteModel, ModelError> {
        let catalog = CatalogIndex::assemble(restaurants, vec![], items);
        let cache = FeatureCache::build(&catalog);
        let positives = positives.iter().map(|id| id.to_string()).collect();
        TasteModel::fit(&catalog, &cache, positives)
    }

    #[test]
    fn test_empty_catalog_rejected() {
        let result = fit_over(vec![], vec![], &[]);
        assert!(matches!(result, Err(ModelError::EmptyCatalog)));
    }

    #[test]
    fn test_priors_follow_label_counts() {
        // 3 restaurants, 1 positive: P(liked) = 2/5.
        let model = fit_over(
            vec![record("r1", "Thai"), record("r2", "Thai"), record("r3", "Italian")],
            vec![],
            &["r1"],
        )
        .unwrap();

        assert!((model.log_prior_liked().exp() - 0.4).abs() < 1e-12);
        assert!((model.log_prior_not_liked().exp() - 0.6).abs() < 1e-12);
        assert_eq!(model.vocabulary_len(), 2);
        assert_eq!(model.positive_ids().len(), 1);
    }

    #[test]
    fn test_no_positives_still_fits() {
        let model = fit_over(
            vec![record("r1", "Thai"), record("r2", "Italian")],
            vec![],
            &[],
        )
        .unwrap();

        // P(liked) = 1/4 from smoothing alone.
        assert!((model.log_prior_liked().exp() - 0.25).abs() < 1e-12);
        assert!(model.positive_ids().is_empty());
    }

    #[test]
    fn test_prior_strictly_increases_with_positives() {
        let catalog = vec![
            record("r1", "Thai"),
            record("r2", "Thai"),
            record("r3", "Italian"),
            record("r4", "Mexican"),
        ];
        let mut last = f64::NEG_INFINITY;
        for positives in [&[][..], &["r1"][..], &["r1", "r2"][..], &["r1", "r2", "r3"][..]] {
            let model = fit_over(catalog.clone(), vec![], positives).unwrap();
            assert!(
                model.log_prior_liked() > last,
                "prior did not grow at {} positives",
                positives.len()
            );
            last = model.log_prior_liked();
        }
    }

    #[test]
    fn test_all_positive_keeps_log_prior_finite() {
        let model = fit_over(
            vec![record("r1", "Thai"), record("r2", "Thai")],
            vec![],
            &["r1", "r2"],
        )
        .unwrap();

        assert!(model.log_prior_not_liked().is_finite());
        assert!(model.log_prior_not_liked() < model.log_prior_liked());
    }

    #[test]
    fn test_unknown_positive_ids_counted_literally() {
        // Labels for restaurants outside the catalog still widen the prior
        // (here P = 3 against N = 1, so P(liked) = 4/3 before flooring);
        // the negative class size saturates at zero instead of underflowing.
        let model = fit_over(
            vec![record("r1", "Thai")],
            vec![],
            &["r1", "ghost-a", "ghost-b"],
        )
        .unwrap();

        assert!((model.log_prior_liked().exp() - 4.0 / 3.0).abs() < 1e-9);
        assert!(model.log_prior_not_liked().is_finite());
        assert!(model.log_prior_not_liked() < -20.0);
    }

    #[test]
    fn test_empty_vocabulary_floored() {
        // Featureless restaurants leave V = 0; the denominators floor V at 1.
        let model = fit_over(
            vec![RestaurantRecord {
                id: "r1".to_string(),
                name: "Blank".to_string(),
                cuisines: vec![],
                ambiences: vec![],
            }],
            vec![],
            &[],
        )
        .unwrap();

        assert_eq!(model.vocabulary_len(), 0);
        assert!(model.liked_default_log_prob.is_finite());
        assert!(model.not_liked_default_log_prob.is_finite());
    }

    #[test]
    fn test_top_liked_features_ranked_by_log_odds() {
        let model = fit_over(
            vec![record("r1", "Thai"), record("r2", "Italian"), record("r3", "Italian")],
            vec![spicy_item("i1", "r1")],
            &["r1"],
        )
        .unwrap();

        let top = model.top_liked_features(10);
        assert_eq!(top.len(), model.vocabulary_len());
        // Every feature of the liked restaurant outranks the rest.
        let liked_only: HashSet<&str> = ["cuisine:thai", "tag:spicy", "type:meal"]
            .into_iter()
            .collect();
        for (feature, _) in &top[..3] {
            assert!(liked_only.contains(feature.as_str()));
        }
        assert!(top[0].1 >= top[1].1 && top[1].1 >= top[2].1);

        let truncated = model.top_liked_features(2);
        assert_eq!(truncated.len(), 2);
    }

    #[test]
    fn test_fit_is_deterministic() {
        let build = || {
            fit_over(
                vec![record("r1", "Thai"), record("r2", "Thai"), record("r3", "Italian")],
                vec![spicy_item("i1", "r1"), spicy_item("i2", "r3")],
                &["r1"],
            )
            .unwrap()
        };

        let a = build();
        let b = build();
        assert_eq!(a.log_prior_liked.to_bits(), b.log_prior_liked.to_bits());
        for (feature, log_prob) in &a.liked_log_probs {
            assert_eq!(
                log_prob.to_bits(),
                b.liked_log_probs[feature].to_bits(),
                "feature {} drifted between fits",
                feature
            );
        }
    }
}
