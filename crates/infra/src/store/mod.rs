//! Storage abstractions for the catalog and the reservation ledger.
//!
//! Two traits split the surface by concern: `CatalogStore` holds the
//! seedable, mostly-immutable side (locations, entries, resources) and
//! `ReservationStore` holds the contended write path. Both are object-safe
//! and implemented by [`in_memory::InMemoryStore`]; the Postgres backend
//! mirrors the same semantics with async inherent methods (see
//! [`postgres::PostgresStore`]).

pub mod in_memory;
pub mod postgres;

use chrono::NaiveDate;
use thiserror::Error;
use std::sync::Arc;

use stayledger_booking::Reservation;
use stayledger_catalog::{CatalogEntry, Location, Resource, SeedOutcome};
use stayledger_core::{DomainError, NormalizedKey, ResourceId};

/// Store operation error.
///
/// Infrastructure failures only; domain rules (capacity, quantity) are
/// enforced above the store in the ledger.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The usage-slot version moved between read and write; the caller
    /// should re-read and retry.
    #[error("optimistic concurrency check failed: {0}")]
    Conflict(String),

    /// Anything else the backend can fail with (IO, poisoned lock, SQL).
    #[error("store backend failure: {0}")]
    Backend(String),
}

impl StoreError {
    /// Map into the domain taxonomy at an operation boundary.
    ///
    /// A conflict reaching this path was not absorbed by the retry loop,
    /// so it surfaces as a storage failure rather than a retryable signal.
    pub fn into_domain(self) -> DomainError {
        match self {
            Self::Conflict(reason) => DomainError::storage(format!("unexpected conflict: {reason}")),
            Self::Backend(reason) => DomainError::storage(reason),
        }
    }
}

/// Point-in-time usage of one (resource, date) slot.
///
/// `version` increments on every successful append to the slot and is the
/// token `append_reservation` checks, so a capacity decision made against
/// a stale snapshot can never be persisted.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct UsageSnapshot {
    /// Sum of quantities of all reservations (both kinds) in the slot.
    pub used: u32,
    /// Slot version; 0 for a slot nothing was ever appended to.
    pub version: u64,
}

impl UsageSnapshot {
    pub const EMPTY: Self = Self { used: 0, version: 0 };
}

/// Seedable catalog storage.
///
/// All `insert_*` operations are atomic skip-or-create on the entity's
/// case-insensitive key, which is what makes seeding idempotent and safe
/// to run concurrently with bookings.
pub trait CatalogStore: Send + Sync {
    /// Create a location unless one with the same normalized name exists.
    fn insert_location(&self, name: &str) -> Result<SeedOutcome, StoreError>;

    /// Case-insensitive exact-match lookup, returning the location with
    /// its display name as originally seeded.
    fn get_location(&self, key: &NormalizedKey) -> Result<Option<Location>, StoreError>;

    /// Create an entry unless its (name, location) key is taken.
    fn insert_entry(&self, entry: CatalogEntry) -> Result<SeedOutcome, StoreError>;

    /// Create a resource unless its (name, location) key is taken.
    ///
    /// On skip the previously stored resource (and its id) stays; the
    /// candidate's freshly minted id is discarded.
    fn insert_resource(&self, resource: Resource) -> Result<SeedOutcome, StoreError>;

    fn get_resource(&self, id: ResourceId) -> Result<Option<Resource>, StoreError>;

    /// Resources whose location contains the fragment, case-insensitively.
    /// Used by the web layer to populate search results.
    fn find_resources(&self, location_fragment: &str) -> Result<Vec<Resource>, StoreError>;
}

/// Reservation storage with an optimistic-concurrency write path.
pub trait ReservationStore: Send + Sync {
    /// Current usage of the (resource, date) slot. Pure read.
    fn usage(&self, resource_id: ResourceId, date: NaiveDate) -> Result<UsageSnapshot, StoreError>;

    /// Append a reservation iff the slot version still equals
    /// `expected_version`; otherwise fail with [`StoreError::Conflict`]
    /// and persist nothing.
    fn append_reservation(
        &self,
        reservation: Reservation,
        expected_version: u64,
    ) -> Result<(), StoreError>;

    /// All reservations (both kinds) for the slot, used by the web layer
    /// to show bookings per date.
    fn reservations_for(
        &self,
        resource_id: ResourceId,
        date: NaiveDate,
    ) -> Result<Vec<Reservation>, StoreError>;
}

impl<S> CatalogStore for Arc<S>
where
    S: CatalogStore + ?Sized,
{
    fn insert_location(&self, name: &str) -> Result<SeedOutcome, StoreError> {
        (**self).insert_location(name)
    }

    fn get_location(&self, key: &NormalizedKey) -> Result<Option<Location>, StoreError> {
        (**self).get_location(key)
    }

    fn insert_entry(&self, entry: CatalogEntry) -> Result<SeedOutcome, StoreError> {
        (**self).insert_entry(entry)
    }

    fn insert_resource(&self, resource: Resource) -> Result<SeedOutcome, StoreError> {
        (**self).insert_resource(resource)
    }

    fn get_resource(&self, id: ResourceId) -> Result<Option<Resource>, StoreError> {
        (**self).get_resource(id)
    }

    fn find_resources(&self, location_fragment: &str) -> Result<Vec<Resource>, StoreError> {
        (**self).find_resources(location_fragment)
    }
}

impl<S> ReservationStore for Arc<S>
where
    S: ReservationStore + ?Sized,
{
    fn usage(&self, resource_id: ResourceId, date: NaiveDate) -> Result<UsageSnapshot, StoreError> {
        (**self).usage(resource_id, date)
    }

    fn append_reservation(
        &self,
        reservation: Reservation,
        expected_version: u64,
    ) -> Result<(), StoreError> {
        (**self).append_reservation(reservation, expected_version)
    }

    fn reservations_for(
        &self,
        resource_id: ResourceId,
        date: NaiveDate,
    ) -> Result<Vec<Reservation>, StoreError> {
        (**self).reservations_for(resource_id, date)
    }
}
