//! # Sources
//!
//! Data-source seams for the recommendation engine.
//!
//! Three narrow traits cover everything the engine reads: `CatalogSource`
//! (restaurants, menus, items), `ListSource` (a user's foodlists) and
//! `IdentitySource` (who the current session belongs to). `MemorySource`
//! implements all three over a JSON fixture snapshot and backs the CLI,
//! the demo harness and the tests; production embeddings implement the
//! traits over the real document store.

pub mod memory;
pub mod traits;

pub use memory::{CatalogFixture, MemorySource};
pub use traits::{CatalogSource, IdentitySource, ListSource};
