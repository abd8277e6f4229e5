//! # Catalog
//!
//! Domain types and assembly for the restaurant catalog.
//!
//! The backing document store holds restaurants, menus, items and
//! foodlists as flat records with string-id back-references. This crate
//! deserializes those records and assembles them into the nested graph
//! the recommender works on: restaurants containing menus containing
//! items, plus an item -> restaurant index for label derivation.
//!
//! Assembly is request-scoped and infallible: broken references degrade
//! (excluded items, an "Uncategorized" bucket for menu-less items) rather
//! than fail the request.

pub mod assembler;
pub mod types;

pub use types::{
    CatalogIndex, FoodlistRecord, Item, ItemId, ItemRecord, ListId, Menu, MenuId, MenuRecord,
    Restaurant, RestaurantId, RestaurantRecord, UserId,
};
