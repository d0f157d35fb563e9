//! `InventoryLedger` — the only mutation entry point.
//!
//! Composes a catalog store and a reservation store behind one handle the
//! web layer calls in-process. The ledger owns the two rules that matter:
//!
//! - **No oversell**: `reserve` validates against a usage snapshot and
//!   appends with the snapshot's version; a concurrent append moves the
//!   version and the write is rejected by the store, so the check and the
//!   insert are observed as one unit. Conflicts are retried with backoff a
//!   bounded number of times.
//! - **Seed idempotence**: seed operations validate, resolve the location
//!   case-insensitively, then delegate to the store's atomic
//!   skip-or-create. A skip has no side effect.

use std::time::Duration;

use chrono::NaiveDate;
use tracing::{error, info, warn};

use stayledger_booking::{remaining, Reservation, ReservationDraft, ReservationKind};
use stayledger_catalog::{EntrySpec, Resource, ResourceSpec, SeedOutcome};
use stayledger_core::{DomainError, DomainResult, NormalizedKey, OwnerId, ReservationId, ResourceId};

use crate::store::{CatalogStore, ReservationStore, StoreError};

/// Bounded-retry policy for the contended reserve path.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, first try included (0 is treated as 1).
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles each retry.
    pub base_delay: Duration,
    /// Cap on the per-retry delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(250),
        }
    }
}

impl RetryPolicy {
    /// Exponential backoff: base * 2^(attempt-1), capped. `attempt` is the
    /// attempt that just failed, starting at 1.
    pub(crate) fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32 << attempt.saturating_sub(1).min(16);
        self.base_delay
            .saturating_mul(factor)
            .min(self.max_delay)
    }

    pub(crate) fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

/// Totals for one batch seed run, mirroring the seed scripts' summary.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub created: u32,
    pub skipped: u32,
    pub missing_locations: u32,
}

impl SeedReport {
    fn record(&mut self, outcome: SeedOutcome) {
        match outcome {
            SeedOutcome::Created => self.created += 1,
            SeedOutcome::Skipped => self.skipped += 1,
        }
    }
}

/// The booking-availability and duplicate-prevention component.
///
/// Store handles are passed in at construction; there is no ambient global
/// state.
#[derive(Debug)]
pub struct InventoryLedger<S> {
    store: S,
    retry: RetryPolicy,
}

impl<S> InventoryLedger<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

impl<S> InventoryLedger<S>
where
    S: CatalogStore + ReservationStore,
{
    /// Idempotently create a location.
    pub fn seed_location(&self, name: &str) -> DomainResult<SeedOutcome> {
        if name.trim().is_empty() {
            return Err(DomainError::validation("location name cannot be empty"));
        }
        let outcome = self.store.insert_location(name).map_err(StoreError::into_domain)?;
        match outcome {
            SeedOutcome::Created => info!(location = name, "location created"),
            SeedOutcome::Skipped => info!(location = name, "location already exists"),
        }
        Ok(outcome)
    }

    /// Idempotently seed one catalog entry (attraction) under a location.
    ///
    /// Fails with `LocationNotFound` if the location is unknown; batch
    /// callers treat that as non-fatal and continue.
    pub fn seed_catalog_entry(&self, location: &str, spec: &EntrySpec) -> DomainResult<SeedOutcome> {
        spec.validate()?;
        let canonical = self.require_location(location)?;

        let outcome = self
            .store
            .insert_entry(spec.clone().into_entry(&canonical))
            .map_err(StoreError::into_domain)?;
        match outcome {
            SeedOutcome::Created => info!(entry = %spec.name, location, "catalog entry created"),
            SeedOutcome::Skipped => info!(entry = %spec.name, location, "already exists"),
        }
        Ok(outcome)
    }

    /// Idempotently seed one bookable resource under a location.
    pub fn seed_resource(&self, location: &str, spec: &ResourceSpec) -> DomainResult<SeedOutcome> {
        spec.validate()?;
        let canonical = self.require_location(location)?;

        let outcome = self
            .store
            .insert_resource(spec.clone().into_resource(&canonical))
            .map_err(StoreError::into_domain)?;
        match outcome {
            SeedOutcome::Created => {
                info!(resource = %spec.name, location, capacity = spec.total_capacity, "resource created")
            }
            SeedOutcome::Skipped => info!(resource = %spec.name, location, "already exists"),
        }
        Ok(outcome)
    }

    /// Seed a location-keyed batch of catalog entries, continuing past
    /// unknown locations.
    pub fn seed_catalog(&self, batch: &[(String, Vec<EntrySpec>)]) -> DomainResult<SeedReport> {
        let mut report = SeedReport::default();
        for (location, specs) in batch {
            for spec in specs {
                match self.seed_catalog_entry(location, spec) {
                    Ok(outcome) => report.record(outcome),
                    Err(DomainError::LocationNotFound(name)) => {
                        warn!(location = %name, "location not found, skipping entries");
                        report.missing_locations += 1;
                        break;
                    }
                    Err(err) => return Err(err),
                }
            }
        }
        info!(
            created = report.created,
            skipped = report.skipped,
            missing_locations = report.missing_locations,
            "catalog seed finished"
        );
        Ok(report)
    }

    /// Seed a location-keyed batch of resources, continuing past unknown
    /// locations.
    pub fn seed_resources(&self, batch: &[(String, Vec<ResourceSpec>)]) -> DomainResult<SeedReport> {
        let mut report = SeedReport::default();
        for (location, specs) in batch {
            for spec in specs {
                match self.seed_resource(location, spec) {
                    Ok(outcome) => report.record(outcome),
                    Err(DomainError::LocationNotFound(name)) => {
                        warn!(location = %name, "location not found, skipping resources");
                        report.missing_locations += 1;
                        break;
                    }
                    Err(err) => return Err(err),
                }
            }
        }
        info!(
            created = report.created,
            skipped = report.skipped,
            missing_locations = report.missing_locations,
            "resource seed finished"
        );
        Ok(report)
    }

    /// Atomically reserve `quantity` units of a resource on a date.
    ///
    /// Fails with `InvalidQuantity` (quantity 0), `ResourceNotFound`,
    /// `CapacityExceeded`, or — after exhausting retries against
    /// concurrent writers — `ConcurrentUpdateConflict`. Nothing is
    /// persisted on any failure path.
    pub fn reserve(
        &self,
        resource_id: ResourceId,
        date: NaiveDate,
        quantity: u32,
        owner: OwnerId,
        kind: ReservationKind,
    ) -> DomainResult<Reservation> {
        let draft = ReservationDraft::new(resource_id, date, quantity, owner, kind)?;
        let resource = self.require_resource(resource_id)?;

        let attempts = self.retry.attempts();
        for attempt in 1..=attempts {
            let snapshot = self
                .store
                .usage(resource_id, date)
                .map_err(StoreError::into_domain)?;

            let free = resource.total_capacity.saturating_sub(snapshot.used);
            if quantity > free {
                return Err(DomainError::CapacityExceeded {
                    requested: quantity,
                    remaining: free,
                });
            }

            let reservation = draft.clone().into_reservation(ReservationId::new());
            match self
                .store
                .append_reservation(reservation.clone(), snapshot.version)
            {
                Ok(()) => {
                    info!(
                        resource = %resource.name,
                        %date,
                        quantity,
                        kind = kind.as_str(),
                        "reservation created"
                    );
                    return Ok(reservation);
                }
                Err(StoreError::Conflict(reason)) => {
                    if attempt < attempts {
                        let delay = self.retry.delay_for(attempt);
                        warn!(attempt, %reason, delay_ms = delay.as_millis() as u64, "reserve conflict, retrying");
                        std::thread::sleep(delay);
                    }
                }
                Err(err) => return Err(err.into_domain()),
            }
        }

        Err(DomainError::ConcurrentUpdateConflict { attempts })
    }

    /// Sum of reserved quantities (both kinds) for a resource and date.
    pub fn current_usage(&self, resource_id: ResourceId, date: NaiveDate) -> DomainResult<u32> {
        self.require_resource(resource_id)?;
        let snapshot = self
            .store
            .usage(resource_id, date)
            .map_err(StoreError::into_domain)?;
        Ok(snapshot.used)
    }

    /// Total capacity minus current usage.
    ///
    /// Negative only if the oversell invariant was already violated by a
    /// bug; logged as a defect and returned as-is so callers can alarm.
    pub fn remaining_capacity(&self, resource_id: ResourceId, date: NaiveDate) -> DomainResult<i64> {
        let resource = self.require_resource(resource_id)?;
        let snapshot = self
            .store
            .usage(resource_id, date)
            .map_err(StoreError::into_domain)?;

        let left = remaining(resource.total_capacity, snapshot.used);
        if left < 0 {
            error!(
                resource = %resource.name,
                %date,
                capacity = resource.total_capacity,
                used = snapshot.used,
                "negative remaining capacity: oversell invariant violated"
            );
        }
        Ok(left)
    }

    /// Resources whose location contains the fragment, case-insensitively.
    pub fn find_resources(&self, location_fragment: &str) -> DomainResult<Vec<Resource>> {
        self.store
            .find_resources(location_fragment)
            .map_err(StoreError::into_domain)
    }

    /// Reservations for a resource on an exact date, both kinds.
    pub fn reservations_for(
        &self,
        resource_id: ResourceId,
        date: NaiveDate,
    ) -> DomainResult<Vec<Reservation>> {
        self.require_resource(resource_id)?;
        self.store
            .reservations_for(resource_id, date)
            .map_err(StoreError::into_domain)
    }

    /// Resolve a location to its stored display name, so seeded records
    /// carry the canonical casing regardless of how the caller spelled it.
    fn require_location(&self, name: &str) -> DomainResult<String> {
        let key = NormalizedKey::new(name);
        self.store
            .get_location(&key)
            .map_err(StoreError::into_domain)?
            .map(|location| location.name)
            .ok_or_else(|| DomainError::location_not_found(name))
    }

    fn require_resource(&self, id: ResourceId) -> DomainResult<Resource> {
        self.store
            .get_resource(id)
            .map_err(StoreError::into_domain)?
            .ok_or(DomainError::ResourceNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_and_caps() {
        let retry = RetryPolicy {
            max_attempts: 5,
            base_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(35),
        };
        assert_eq!(retry.delay_for(1), Duration::from_millis(10));
        assert_eq!(retry.delay_for(2), Duration::from_millis(20));
        assert_eq!(retry.delay_for(3), Duration::from_millis(35));
        assert_eq!(retry.delay_for(4), Duration::from_millis(35));
    }

    #[test]
    fn zero_max_attempts_still_tries_once() {
        let retry = RetryPolicy {
            max_attempts: 0,
            ..RetryPolicy::default()
        };
        assert_eq!(retry.attempts(), 1);
    }
}
