//! Catalog domain: locations, attraction listings, and bookable resources.
//!
//! Pure domain logic (no IO, no storage). Seed inputs are validated here;
//! duplicate detection and persistence live behind the store traits in
//! `stayledger-infra`.

pub mod entry;
pub mod location;
pub mod resource;
pub mod seed;

pub use entry::CatalogEntry;
pub use location::Location;
pub use resource::Resource;
pub use seed::{EntrySpec, ResourceSpec, SeedOutcome};
