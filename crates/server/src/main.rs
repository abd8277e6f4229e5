//! Test harness for the recommendation engine.
//!
//! Loads a fixture snapshot and prints ranked recommendations for one
//! user, so the end-to-end pipeline can be eyeballed without the CLI.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use server::RecommendationEngine;
use sources::MemorySource;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter("info,server=debug,classifier=debug,catalog=debug,sources=debug")
        .init();

    info!("Starting TableRecs engine harness");

    let fixture_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "data/demo-catalog.json".to_string());
    let store = Arc::new(MemorySource::from_json_file(Path::new(&fixture_path))?);

    let user_id = std::env::args().nth(2).or_else(|| {
        // No user given: pick the first one with foodlists in the fixture.
        store.known_users().into_iter().next()
    });
    let Some(user_id) = user_id else {
        info!("Fixture has no foodlist owners and no user was given; nothing to do");
        return Ok(());
    };

    let engine = RecommendationEngine::from_store(store);

    info!("Getting recommendations for user {}", user_id);
    let recommendations = engine.get_recommendations_for_user(&user_id).await?;

    info!("Received {} recommendations:", recommendations.len());
    for (i, rec) in recommendations.iter().enumerate() {
        info!(
            "{}. {} [{}] - liked probability {:.3}",
            i + 1,
            rec.name,
            rec.cuisines.join(", "),
            rec.probability
        );
    }

    Ok(())
}
