//! Bookable resource: a capacity-bounded entity (hotel, flight).

use serde::{Deserialize, Serialize};
use stayledger_core::{CatalogKey, ResourceId};

/// A finite-capacity bookable entity.
///
/// `total_capacity` is the number of units (rooms, seats) available per
/// date and is immutable once seeded. Uniqueness at seed time is by
/// (name, location), case-insensitively; afterwards the `ResourceId` is the
/// handle bookings use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub id: ResourceId,
    /// Display name of the location this resource belongs to.
    pub location: String,
    pub name: String,
    pub address: String,
    /// Price per unit per date, in the catalog's minor currency unit.
    pub price: u32,
    /// Star rating, 0..=5.
    pub rating: u8,
    /// Free-form comma-separated amenity list (as seeded).
    pub amenities: String,
    /// Distance from the nearest airport, in kilometres.
    pub dist_from_airport_km: u32,
    /// Units available per date (rooms for a hotel, seats for a flight).
    pub total_capacity: u32,
}

impl Resource {
    pub fn key(&self) -> CatalogKey {
        CatalogKey::new(&self.location, &self.name)
    }
}
