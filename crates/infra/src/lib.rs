//! `stayledger-infra` — stores and the inventory ledger.
//!
//! This crate wires the pure domain crates to persistence:
//!
//! - [`store`]: the `CatalogStore`/`ReservationStore` traits, an in-memory
//!   implementation (tests/dev) and a Postgres implementation (production).
//! - [`ledger`]: `InventoryLedger`, the only mutation entry point the web
//!   layer is given. Composes the store traits; no ambient global state.
//! - [`seed`]: built-in sample catalog data and batch seed shapes.

pub mod ledger;
pub mod seed;
pub mod store;


pub use ledger::{InventoryLedger, RetryPolicy, SeedReport};
pub use store::in_memory::InMemoryStore;
pub use store::postgres::PostgresStore;
pub use store::{CatalogStore, ReservationStore, StoreError, UsageSnapshot};
