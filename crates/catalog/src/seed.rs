//! Seed inputs and their validation rules.

use serde::{Deserialize, Serialize};
use stayledger_core::{DomainError, DomainResult, ResourceId};

use crate::{CatalogEntry, Resource};

/// Result of an idempotent seed operation.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SeedOutcome {
    /// A new entity was persisted.
    Created,
    /// An entity with the same (name, location) key already existed;
    /// nothing was written.
    Skipped,
}

impl SeedOutcome {
    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created)
    }
}

/// Seed input for a catalog entry (attraction).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntrySpec {
    pub name: String,
    pub description: String,
}

impl EntrySpec {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("entry name cannot be empty"));
        }
        Ok(())
    }

    /// Materialize the entry against a location's display name.
    pub fn into_entry(self, location: &str) -> CatalogEntry {
        CatalogEntry {
            location: location.to_string(),
            name: self.name,
            description: self.description,
        }
    }
}

/// Seed input for a bookable resource.
///
/// Field set mirrors what the travel catalog tracks for a hotel; a flight
/// uses the same shape with seats as capacity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSpec {
    pub name: String,
    pub address: String,
    pub price: u32,
    pub rating: u8,
    pub amenities: String,
    pub dist_from_airport_km: u32,
    pub total_capacity: u32,
}

impl ResourceSpec {
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("resource name cannot be empty"));
        }
        if self.rating > 5 {
            return Err(DomainError::validation("rating must be 0..=5"));
        }
        // Persisted as a signed 32-bit column.
        if i32::try_from(self.dist_from_airport_km).is_err() {
            return Err(DomainError::validation("dist_from_airport_km out of range"));
        }
        Ok(())
    }

    /// Materialize the resource with a fresh id against a location's
    /// display name.
    pub fn into_resource(self, location: &str) -> Resource {
        Resource {
            id: ResourceId::new(),
            location: location.to_string(),
            name: self.name,
            address: self.address,
            price: self.price,
            rating: self.rating,
            amenities: self.amenities,
            dist_from_airport_km: self.dist_from_airport_km,
            total_capacity: self.total_capacity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(name: &str) -> ResourceSpec {
        ResourceSpec {
            name: name.to_string(),
            address: "Taj Ganj, Agra".to_string(),
            price: 3500,
            rating: 4,
            amenities: "Free WiFi, Breakfast, Pool".to_string(),
            dist_from_airport_km: 13,
            total_capacity: 50,
        }
    }

    #[test]
    fn resource_spec_rejects_blank_name() {
        let err = spec("   ").validate().unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn resource_spec_rejects_out_of_range_rating() {
        let mut s = spec("Agra Grand Hotel");
        s.rating = 6;
        assert!(s.validate().is_err());
    }

    #[test]
    fn resource_spec_rejects_oversized_airport_distance() {
        let mut s = spec("Agra Grand Hotel");
        s.dist_from_airport_km = u32::MAX;
        let err = s.validate().unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn zero_capacity_is_a_valid_resource() {
        let mut s = spec("Agra Grand Hotel");
        s.total_capacity = 0;
        assert!(s.validate().is_ok());
    }

    #[test]
    fn entry_spec_materializes_with_location_display_name() {
        let entry = EntrySpec::new("Red Fort", "Historic fort complex and UNESCO site.")
            .into_entry("DELHI");
        assert_eq!(entry.location, "DELHI");
        assert_eq!(entry.key(), stayledger_core::CatalogKey::new("delhi", "red fort"));
    }
}
