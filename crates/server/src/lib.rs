//! Server crate for the TableRecs recommendation engine.
//!
//! Hosts the engine that wires data sources to the classification
//! pipeline and exposes the user-facing entry points.

pub mod engine;

pub use engine::RecommendationEngine;
