use std::collections::HashMap;
use std::sync::RwLock;

use chrono::NaiveDate;

use stayledger_booking::Reservation;
use stayledger_catalog::{CatalogEntry, Location, Resource, SeedOutcome};
use stayledger_core::{CatalogKey, NormalizedKey, ResourceId};

use super::{CatalogStore, ReservationStore, StoreError, UsageSnapshot};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SlotKey {
    resource_id: ResourceId,
    date: NaiveDate,
}

/// One (resource, date) booking slot.
#[derive(Debug, Default)]
struct Slot {
    version: u64,
    reservations: Vec<Reservation>,
}

impl Slot {
    fn used(&self) -> u32 {
        self.reservations.iter().map(|r| r.quantity).sum()
    }
}

/// In-memory store with normalized-key indexes.
///
/// Intended for tests/dev. Catalog lookups are O(1) hash probes on the
/// lower-cased key; only the location-substring search scans.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    locations: RwLock<HashMap<NormalizedKey, Location>>,
    entries: RwLock<HashMap<CatalogKey, CatalogEntry>>,
    resources: RwLock<HashMap<ResourceId, Resource>>,
    resource_index: RwLock<HashMap<CatalogKey, ResourceId>>,
    slots: RwLock<HashMap<SlotKey, Slot>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned() -> StoreError {
        StoreError::Backend("lock poisoned".to_string())
    }
}

impl CatalogStore for InMemoryStore {
    fn insert_location(&self, name: &str) -> Result<SeedOutcome, StoreError> {
        let location = Location::new(name);
        let key = location.key();
        let mut locations = self.locations.write().map_err(|_| Self::poisoned())?;
        if locations.contains_key(&key) {
            return Ok(SeedOutcome::Skipped);
        }
        locations.insert(key, location);
        Ok(SeedOutcome::Created)
    }

    fn get_location(&self, key: &NormalizedKey) -> Result<Option<Location>, StoreError> {
        let locations = self.locations.read().map_err(|_| Self::poisoned())?;
        Ok(locations.get(key).cloned())
    }

    fn insert_entry(&self, entry: CatalogEntry) -> Result<SeedOutcome, StoreError> {
        let key = entry.key();
        let mut entries = self.entries.write().map_err(|_| Self::poisoned())?;
        if entries.contains_key(&key) {
            return Ok(SeedOutcome::Skipped);
        }
        entries.insert(key, entry);
        Ok(SeedOutcome::Created)
    }

    fn insert_resource(&self, resource: Resource) -> Result<SeedOutcome, StoreError> {
        let key = resource.key();

        // Index and primary map are guarded by taking both write locks in a
        // fixed order (index first), matching every other writer.
        let mut index = self.resource_index.write().map_err(|_| Self::poisoned())?;
        if index.contains_key(&key) {
            return Ok(SeedOutcome::Skipped);
        }

        let mut resources = self.resources.write().map_err(|_| Self::poisoned())?;
        index.insert(key, resource.id);
        resources.insert(resource.id, resource);
        Ok(SeedOutcome::Created)
    }

    fn get_resource(&self, id: ResourceId) -> Result<Option<Resource>, StoreError> {
        let resources = self.resources.read().map_err(|_| Self::poisoned())?;
        Ok(resources.get(&id).cloned())
    }

    fn find_resources(&self, location_fragment: &str) -> Result<Vec<Resource>, StoreError> {
        let needle = location_fragment.trim().to_lowercase();
        let resources = self.resources.read().map_err(|_| Self::poisoned())?;
        let mut found: Vec<Resource> = resources
            .values()
            .filter(|r| r.location.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        // Stable output for callers and tests; the map iterates in arbitrary order.
        found.sort_by(|a, b| (&a.location, &a.name).cmp(&(&b.location, &b.name)));
        Ok(found)
    }
}

impl ReservationStore for InMemoryStore {
    fn usage(&self, resource_id: ResourceId, date: NaiveDate) -> Result<UsageSnapshot, StoreError> {
        let slots = self.slots.read().map_err(|_| Self::poisoned())?;
        Ok(slots
            .get(&SlotKey { resource_id, date })
            .map(|slot| UsageSnapshot {
                used: slot.used(),
                version: slot.version,
            })
            .unwrap_or(UsageSnapshot::EMPTY))
    }

    fn append_reservation(
        &self,
        reservation: Reservation,
        expected_version: u64,
    ) -> Result<(), StoreError> {
        let key = SlotKey {
            resource_id: reservation.resource_id,
            date: reservation.date,
        };
        let mut slots = self.slots.write().map_err(|_| Self::poisoned())?;
        let slot = slots.entry(key).or_default();

        if slot.version != expected_version {
            return Err(StoreError::Conflict(format!(
                "expected slot version {expected_version}, found {}",
                slot.version
            )));
        }

        slot.reservations.push(reservation);
        slot.version += 1;
        Ok(())
    }

    fn reservations_for(
        &self,
        resource_id: ResourceId,
        date: NaiveDate,
    ) -> Result<Vec<Reservation>, StoreError> {
        let slots = self.slots.read().map_err(|_| Self::poisoned())?;
        Ok(slots
            .get(&SlotKey { resource_id, date })
            .map(|slot| slot.reservations.clone())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stayledger_booking::ReservationKind;
    use stayledger_core::{OwnerId, ReservationId};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, 15).unwrap()
    }

    fn reservation(resource_id: ResourceId, quantity: u32) -> Reservation {
        Reservation {
            id: ReservationId::new(),
            resource_id,
            date: date(),
            quantity,
            owner: OwnerId::new(),
            kind: ReservationKind::Plain,
        }
    }

    #[test]
    fn locations_dedupe_case_insensitively() {
        let store = InMemoryStore::new();
        assert_eq!(store.insert_location("DELHI").unwrap(), SeedOutcome::Created);
        assert_eq!(store.insert_location("delhi").unwrap(), SeedOutcome::Skipped);
        let stored = store.get_location(&NormalizedKey::new("Delhi")).unwrap();
        assert_eq!(stored.map(|l| l.name), Some("DELHI".to_string()));
    }

    #[test]
    fn stale_version_append_is_rejected() {
        let store = InMemoryStore::new();
        let resource_id = ResourceId::new();

        store.append_reservation(reservation(resource_id, 1), 0).unwrap();

        // A second writer that read the slot before the first append.
        let err = store
            .append_reservation(reservation(resource_id, 1), 0)
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        let snapshot = store.usage(resource_id, date()).unwrap();
        assert_eq!(snapshot.used, 1);
        assert_eq!(snapshot.version, 1);
    }

    #[test]
    fn usage_of_untouched_slot_is_empty() {
        let store = InMemoryStore::new();
        let snapshot = store.usage(ResourceId::new(), date()).unwrap();
        assert_eq!(snapshot, UsageSnapshot::EMPTY);
    }
}
