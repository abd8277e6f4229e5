//! Benchmarks for the classification pipeline.
//!
//! Run with: cargo bench --package classifier

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::collections::HashSet;

use catalog::{CatalogIndex, ItemRecord, MenuRecord, RestaurantRecord};
use classifier::{FeatureCache, TasteModel};

const CUISINES: &[&str] = &[
    "Thai", "Italian", "Japanese", "Mexican", "Indian", "French", "Korean",
];
const AMBIENCES: &[&str] = &["casual", "romantic", "rooftop", "quiet", "lively"];
const TAGS: &[&str] = &[
    "spicy", "vegan", "vegetarian", "gluten-free", "seafood", "grilled", "sweet", "sour",
];

/// Deterministic synthetic catalog: `size` restaurants, one menu each,
/// four items each, attributes cycled from the pools above.
fn synthetic_records(
    size: usize,
) -> (Vec<RestaurantRecord>, Vec<MenuRecord>, Vec<ItemRecord>) {
    let mut restaurants = Vec::with_capacity(size);
    let mut menus = Vec::with_capacity(size);
    let mut items = Vec::with_capacity(size * 4);

    for i in 0..size {
        let restaurant_id = format!("r{}", i);
        restaurants.push(RestaurantRecord {
            id: restaurant_id.clone(),
            name: format!("Restaurant {}", i),
            cuisines: vec![CUISINES[i % CUISINES.len()].to_string()],
            ambiences: vec![AMBIENCES[i % AMBIENCES.len()].to_string()],
        });

        let menu_id = format!("m{}", i);
        menus.push(MenuRecord {
            id: menu_id.clone(),
            name: "All Day".to_string(),
            restaurant_id: Some(restaurant_id.clone()),
        });

        for j in 0..4 {
            items.push(ItemRecord {
                id: format!("i{}-{}", i, j),
                name: format!("Dish {}", j),
                item_type: Some(if j == 3 { "drink" } else { "meal" }.to_string()),
                cuisine: Some(CUISINES[(i + j) % CUISINES.len()].to_string()),
                tags: vec![
                    TAGS[(i + j) % TAGS.len()].to_string(),
                    TAGS[(i * 3 + j) % TAGS.len()].to_string(),
                ],
                price: Some(8.0 + (i % 20) as f64),
                restaurant_id: Some(restaurant_id.clone()),
                menu_id: Some(menu_id.clone()),
            });
        }
    }

    (restaurants, menus, items)
}

/// Every 10th restaurant liked.
fn synthetic_positives(size: usize) -> HashSet<String> {
    (0..size).step_by(10).map(|i| format!("r{}", i)).collect()
}

fn benchmark_feature_extraction(c: &mut Criterion) {
    let (restaurants, menus, items) = synthetic_records(1000);
    let catalog = CatalogIndex::assemble(restaurants, menus, items);

    c.bench_function("feature_cache_1000_restaurants", |b| {
        b.iter(|| black_box(FeatureCache::build(&catalog)))
    });
}

fn benchmark_model_fit(c: &mut Criterion) {
    let (restaurants, menus, items) = synthetic_records(1000);
    let catalog = CatalogIndex::assemble(restaurants, menus, items);
    let cache = FeatureCache::build(&catalog);
    let positives = synthetic_positives(1000);

    c.bench_function("model_fit_1000_restaurants", |b| {
        b.iter(|| black_box(TasteModel::fit(&catalog, &cache, positives.clone()).unwrap()))
    });
}

fn benchmark_full_request(c: &mut Criterion) {
    let (restaurants, menus, items) = synthetic_records(1000);

    c.bench_function("assemble_fit_rank_1000_restaurants", |b| {
        b.iter(|| {
            let catalog = CatalogIndex::assemble(
                restaurants.clone(),
                menus.clone(),
                items.clone(),
            );
            let cache = FeatureCache::build(&catalog);
            let model =
                TasteModel::fit(&catalog, &cache, synthetic_positives(1000)).unwrap();
            black_box(model.recommend(catalog.restaurants(), &cache))
        })
    });
}

criterion_group!(
    benches,
    benchmark_feature_extraction,
    benchmark_model_fit,
    benchmark_full_request
);
criterion_main!(benches);
