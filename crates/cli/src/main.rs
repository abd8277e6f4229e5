use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use catalog::CatalogIndex;
use classifier::Recommendation;
use server::RecommendationEngine;
use sources::MemorySource;

/// TableRecs - Restaurant Recommendation Engine
#[derive(Parser)]
#[command(name = "table-recs")]
#[command(about = "Personalized restaurant recommendations from foodlists", long_about = None)]
struct Cli {
    /// Path to the catalog fixture (JSON snapshot of the document store)
    #[arg(short, long, default_value = "data/demo-catalog.json")]
    fixture: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Get restaurant recommendations for a user
    Recommend {
        /// User ID to get recommendations for
        #[arg(long)]
        user_id: String,

        /// Number of recommendations to show
        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Inspect the fitted taste model for a user
    Model {
        /// User ID to fit the model for
        #[arg(long)]
        user_id: String,

        /// Number of top liked features to show
        #[arg(long, default_value = "10")]
        top: usize,
    },

    /// Show catalog assembly statistics
    Catalog,

    /// Run a concurrency benchmark against the engine
    Bench {
        /// Number of requests to make
        #[arg(long, default_value = "100")]
        requests: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    println!("Loading catalog fixture from {}...", cli.fixture.display());
    let start = Instant::now();
    let store = Arc::new(
        MemorySource::from_json_file(&cli.fixture).context("Failed to load catalog fixture")?,
    );
    println!("{} Loaded fixture in {:?}", "✓".green(), start.elapsed());

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Recommend { user_id, limit } => handle_recommend(store, user_id, limit).await?,
        Commands::Model { user_id, top } => handle_model(store, user_id, top).await?,
        Commands::Catalog => handle_catalog(store)?,
        Commands::Bench { requests } => handle_bench(store, requests).await?,
    }

    Ok(())
}

/// Handle the 'recommend' command
async fn handle_recommend(store: Arc<MemorySource>, user_id: String, limit: usize) -> Result<()> {
    let engine = RecommendationEngine::from_store(store);

    let start = Instant::now();
    let recommendations = engine.get_recommendations_for_user(&user_id).await?;
    let elapsed = start.elapsed();

    print_recommendations(&user_id, &recommendations, limit);
    println!("Ranked {} candidates in {:?}", recommendations.len(), elapsed);
    Ok(())
}

/// Handle the 'model' command
async fn handle_model(store: Arc<MemorySource>, user_id: String, top: usize) -> Result<()> {
    let engine = RecommendationEngine::from_store(store);
    let model = engine.build_model_for_user(&user_id).await?;

    print!("{}", format!("Taste model for {}\n", user_id).bold().blue());
    print!(
        "{}P(liked) prior: {:.4}\n",
        "• ".green(),
        model.log_prior_liked().exp()
    );
    print!(
        "{}P(not liked) prior: {:.4}\n",
        "• ".green(),
        model.log_prior_not_liked().exp()
    );
    print!(
        "{}Liked restaurants: {}\n",
        "• ".cyan(),
        model.positive_ids().len()
    );
    print!("{}Vocabulary size: {}\n", "• ".cyan(), model.vocabulary_len());

    if model.positive_ids().is_empty() {
        println!(
            "{}",
            "No foodlist signal for this user; the model is priors-only.".yellow()
        );
        return Ok(());
    }

    println!("Top liked features (log-odds vs not-liked):");
    for (feature, log_odds) in model.top_liked_features(top) {
        println!("  - {} ({:+.3})", feature, log_odds);
    }
    Ok(())
}

/// Handle the 'catalog' command
fn handle_catalog(store: Arc<MemorySource>) -> Result<()> {
    let fixture = store.fixture();
    let index = CatalogIndex::assemble(
        fixture.restaurants.clone(),
        fixture.menus.clone(),
        fixture.items.clone(),
    );

    let (restaurants, menus, items) = index.counts();
    let orphan_items: usize = index
        .restaurants()
        .flat_map(|r| r.menus.iter())
        .filter(|m| m.id().is_none())
        .map(|m| m.items().len())
        .sum();
    let excluded_items = fixture.items.len() - items;
    // Orphan buckets are synthetic, so listed menus = assembled - buckets.
    let orphan_buckets = index
        .restaurants()
        .filter(|r| r.menus.iter().any(|m| m.id().is_none()))
        .count();
    let dropped_menus = fixture.menus.len() - (menus - orphan_buckets);

    print!("{}", "Catalog summary\n".bold().blue());
    print!("{}Restaurants: {}\n", "• ".green(), restaurants);
    print!(
        "{}Menus: {} ({} dropped, {} synthetic buckets)\n",
        "• ".green(),
        menus,
        dropped_menus,
        orphan_buckets
    );
    print!(
        "{}Items: {} attached ({} excluded, {} uncategorized)\n",
        "• ".green(),
        items,
        excluded_items,
        orphan_items
    );
    print!("{}Foodlists: {}\n", "• ".green(), fixture.foodlists.len());

    // Cuisine histogram across assembled restaurants.
    let mut cuisines: HashMap<String, u32> = HashMap::new();
    for restaurant in index.restaurants() {
        for cuisine in &restaurant.cuisines {
            *cuisines.entry(cuisine.to_lowercase()).or_insert(0) += 1;
        }
    }
    let mut cuisines: Vec<(String, u32)> = cuisines.into_iter().collect();
    cuisines.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    println!("Cuisines:");
    for (cuisine, count) in cuisines {
        println!("  - {}: {} restaurants", cuisine, count);
    }
    Ok(())
}

/// Handle the 'bench' command
async fn handle_bench(store: Arc<MemorySource>, requests: usize) -> Result<()> {
    if requests == 0 {
        return Err(anyhow!("requests must be at least 1"));
    }
    let users = store.known_users();
    if users.is_empty() {
        return Err(anyhow!("Fixture has no foodlist owners to benchmark with"));
    }

    let engine = RecommendationEngine::from_store(store);

    // Spread requests over random fixture users.
    let user_ids: Vec<String> = (0..requests)
        .map(|_| users[rand::random::<u32>() as usize % users.len()].clone())
        .collect();

    let bench_start = Instant::now();
    let mut handles = vec![];
    for user_id in user_ids {
        let engine = engine.clone();
        let handle = tokio::spawn(async move {
            let start = Instant::now();
            engine.get_recommendations_for_user(&user_id).await?;
            Ok::<_, anyhow::Error>(start.elapsed())
        });
        handles.push(handle);
    }

    let mut timings = vec![];
    for handle in handles {
        let elapsed = handle.await??;
        timings.push(elapsed);
    }

    let wall_time = bench_start.elapsed();
    let total_time: std::time::Duration = timings.iter().sum();
    let avg_latency = total_time / (timings.len() as u32);
    timings.sort();
    let p50 = timings[timings.len() / 2];
    let p95 = timings[(timings.len() as f32 * 0.95) as usize];
    let p99 = timings[(timings.len() as f32 * 0.99) as usize];
    let throughput = requests as f32 / wall_time.as_secs_f32();

    println!("Benchmark results ({} requests):", requests);
    println!("Wall time: {:?}", wall_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", p50);
    println!("P95 latency: {:?}", p95);
    println!("P99 latency: {:?}", p99);
    println!("Throughput: {:.2} requests/second", throughput);

    Ok(())
}

/// Helper function to format and print recommendations
fn print_recommendations(user_id: &str, recommendations: &[Recommendation], limit: usize) {
    print!(
        "{}",
        format!("Restaurant recommendations for {}:\n", user_id)
            .bold()
            .blue()
    );
    if recommendations.is_empty() {
        println!("  (no unliked restaurants to rank)");
        return;
    }
    for (i, rec) in recommendations.iter().take(limit).enumerate() {
        println!(
            "{}. {} [{}] - liked probability {:.3}",
            (i + 1).to_string().green(),
            rec.name,
            rec.cuisines.join(", "),
            rec.probability
        );
    }
}
