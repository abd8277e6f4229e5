//! # Classifier
//!
//! Naive Bayes taste modeling for restaurant recommendations.
//!
//! ## Architecture
//! One recommendation request flows through four pure stages:
//! 1. `FeatureCache::build` reduces every restaurant in the assembled
//!    catalog to a set of `kind:value` presence tokens
//! 2. `positive_restaurant_ids` turns the user's foodlists into the
//!    positive label set (every other restaurant is a negative)
//! 3. `TasteModel::fit` fits add-one-smoothed priors and per-feature
//!    conditionals in log space
//! 4. `TasteModel::recommend` scores every unliked restaurant and returns
//!    them ranked by posterior probability
//!
//! Every stage works off a request-scoped snapshot. Models are never
//! cached across requests, and fitting the same snapshot twice produces
//! bit-identical scores.

pub mod features;
pub mod labels;
pub mod model;
pub mod scorer;

pub use features::{extract_features, FeatureCache};
pub use labels::positive_restaurant_ids;
pub use model::{ModelError, TasteModel};
pub use scorer::Recommendation;
