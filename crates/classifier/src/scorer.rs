//! Scoring and ranking against a fitted model.

use crate::features::{extract_features, FeatureCache};
use crate::model::TasteModel;
use catalog::{Restaurant, RestaurantId};
use std::collections::BTreeSet;
use tracing::debug;

/// One ranked entry of a recommendation response.
#[derive(Debug, Clone)]
pub struct Recommendation {
    pub restaurant_id: RestaurantId,
    pub name: String,
    pub cuisines: Vec<String>,
    /// Posterior probability of the liked class, in [0, 1].
    pub probability: f64,
}

impl TasteModel {
    /// Posterior probability that a restaurant with `features` is liked.
    ///
    /// ## Algorithm
    /// Log-likelihoods accumulate per class, substituting the class's
    /// out-of-vocabulary fallback for unseen features. The pair converts
    /// to a probability via the two-class softmax with the running maximum
    /// subtracted first, so long feature sets cannot underflow `exp`. An
    /// empty feature set scores on the priors alone.
    pub fn score(&self, features: &BTreeSet<String>) -> f64 {
        let mut log_liked = self.log_prior_liked;
        let mut log_not_liked = self.log_prior_not_liked;

        for feature in features {
            log_liked += self
                .liked_log_probs
                .get(feature)
                .copied()
                .unwrap_or(self.liked_default_log_prob);
            log_not_liked += self
                .not_liked_log_probs
                .get(feature)
                .copied()
                .unwrap_or(self.not_liked_default_log_prob);
        }

        let max = log_liked.max(log_not_liked);
        let liked = (log_liked - max).exp();
        let not_liked = (log_not_liked - max).exp();
        liked / (liked + not_liked)
    }

    /// Score and rank every candidate the user has not already liked.
    ///
    /// Restaurants in the model's positive set are excluded from the
    /// output, not merely ranked low. The sort is stable and descending,
    /// so equal probabilities keep their input order.
    pub fn recommend<'a, I>(&self, candidates: I, cache: &FeatureCache) -> Vec<Recommendation>
    where
        I: IntoIterator<Item = &'a Restaurant>,
    {
        let mut ranked: Vec<Recommendation> = candidates
            .into_iter()
            .filter(|restaurant| !self.positive_ids.contains(&restaurant.id))
            .map(|restaurant| {
                let probability = match cache.get(&restaurant.id) {
                    Some(features) => self.score(features),
                    // A candidate outside the cached snapshot gets a fresh
                    // extraction instead of a refusal.
                    None => self.score(&extract_features(restaurant)),
                };
                Recommendation {
                    restaurant_id: restaurant.id.clone(),
                    name: restaurant.name.clone(),
                    cuisines: restaurant.cuisines.clone(),
                    probability,
                }
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.probability
                .partial_cmp(&a.probability)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        debug!("Ranked {} candidates", ranked.len());
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::{CatalogIndex, RestaurantRecord};
    use std::collections::HashSet;

    fn record(id: &str, name: &str, cuisine: &str) -> RestaurantRecord {
        RestaurantRecord {
            id: id.to_string(),
            name: name.to_string(),
            cuisines: vec![cuisine.to_string()],
            ambiences: vec![],
        }
    }

    /// Three restaurants, two thai and one italian, with r1 liked.
    fn thai_leaning_fixture() -> (CatalogIndex, FeatureCache, TasteModel) {
        let catalog = CatalogIndex::assemble(
            vec![
                record("r1", "Thai Palace", "Thai"),
                record("r2", "Bangkok Corner", "Thai"),
                record("r3", "Roma", "Italian"),
            ],
            vec![],
            vec![],
        );
        let cache = FeatureCache::build(&catalog);
        let model =
            TasteModel::fit(&catalog, &cache, HashSet::from(["r1".to_string()])).unwrap();
        (catalog, cache, model)
    }

    #[test]
    fn test_liked_cuisine_outranks_other() {
        let (catalog, cache, model) = thai_leaning_fixture();

        let ranked = model.recommend(catalog.restaurants(), &cache);
        let ids: Vec<&str> = ranked.iter().map(|r| r.restaurant_id.as_str()).collect();
        assert_eq!(ids, vec!["r2", "r3"]);
        assert!(ranked[0].probability > ranked[1].probability);
        assert_eq!(ranked[0].name, "Bangkok Corner");
        assert_eq!(ranked[0].cuisines, vec!["Thai".to_string()]);
    }

    #[test]
    fn test_scores_match_hand_computation() {
        // N = 3, P = 1, V = 2: P(liked) = 2/5, P(thai|liked) = 2/3,
        // P(italian|liked) = 1/3, and both cuisines appear once in the
        // two-restaurant negative class, so P(thai|not) = P(italian|not) = 1/2.
        let (_, cache, model) = thai_leaning_fixture();

        let thai = model.score(cache.get("r2").unwrap());
        let italian = model.score(cache.get("r3").unwrap());
        // P(liked | thai) = (2/5)(2/3) / ((2/5)(2/3) + (3/5)(1/2)) = 8/17.
        assert!((thai - 8.0 / 17.0).abs() < 1e-9);
        // P(liked | italian) = (2/5)(1/3) / ((2/5)(1/3) + (3/5)(1/2)) = 4/13.
        assert!((italian - 4.0 / 13.0).abs() < 1e-9);
    }

    #[test]
    fn test_liked_restaurants_excluded() {
        let (catalog, cache, model) = thai_leaning_fixture();

        let ranked = model.recommend(catalog.restaurants(), &cache);
        assert!(ranked.iter().all(|r| r.restaurant_id != "r1"));
    }

    #[test]
    fn test_probabilities_in_unit_interval() {
        let (catalog, cache, model) = thai_leaning_fixture();

        for rec in model.recommend(catalog.restaurants(), &cache) {
            assert!(rec.probability >= 0.0 && rec.probability <= 1.0);
            assert!(rec.probability.is_finite());
        }
    }

    #[test]
    fn test_empty_feature_set_scores_prior() {
        let (_, _, model) = thai_leaning_fixture();

        let prior_only = model.score(&BTreeSet::new());
        assert!((prior_only - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_unseen_feature_uses_fallback() {
        let (_, _, model) = thai_leaning_fixture();

        let features: BTreeSet<String> = ["cuisine:thai", "ambience:spaceship"]
            .iter()
            .map(|f| f.to_string())
            .collect();
        let score = model.score(&features);
        assert!(score.is_finite());
        assert!(score > 0.0 && score < 1.0);
    }

    #[test]
    fn test_equal_scores_keep_input_order() {
        let catalog = CatalogIndex::assemble(
            vec![
                record("r1", "Twin A", "Thai"),
                record("r2", "Twin B", "Thai"),
                record("r3", "Twin C", "Thai"),
            ],
            vec![],
            vec![],
        );
        let cache = FeatureCache::build(&catalog);
        let model = TasteModel::fit(&catalog, &cache, HashSet::new()).unwrap();

        let ids: Vec<String> = model
            .recommend(catalog.restaurants(), &cache)
            .into_iter()
            .map(|r| r.restaurant_id)
            .collect();
        assert_eq!(ids, vec!["r1", "r2", "r3"]);
    }

    #[test]
    fn test_large_feature_sets_stay_stable() {
        // Hundreds of unseen tokens drive both log-likelihoods far negative
        // and push the class gap past f64 resolution. The max-subtraction
        // keeps the softmax away from 0/0, so the score saturates to the
        // boundary instead of going NaN.
        let (_, _, model) = thai_leaning_fixture();

        let features: BTreeSet<String> =
            (0..500).map(|i| format!("tag:synthetic-{}", i)).collect();
        let score = model.score(&features);
        assert!(score.is_finite());
        assert!((0.0..=1.0).contains(&score));
        // The liked class is smaller, so its per-token fallback ln(1/3)
        // beats the not-liked ln(1/4) and saturation lands on the high side.
        assert!(score > 0.5);
    }

    #[test]
    fn test_recommend_scores_uncached_candidate() {
        let (_, cache, model) = thai_leaning_fixture();

        let outsider = Restaurant {
            id: "r9".to_string(),
            name: "Pop-up".to_string(),
            cuisines: vec!["Thai".to_string()],
            ambiences: vec![],
            menus: vec![],
        };
        let ranked = model.recommend(std::iter::once(&outsider), &cache);
        assert_eq!(ranked.len(), 1);
        assert!(ranked[0].probability.is_finite());
    }
}
