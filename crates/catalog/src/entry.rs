//! Catalog entry: a named attraction tied to a location.

use serde::{Deserialize, Serialize};
use stayledger_core::CatalogKey;

/// A descriptive, non-bookable listing (famous place, landmark).
///
/// Unique per (name, location), case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Display name of the location this entry belongs to.
    pub location: String,
    pub name: String,
    pub description: String,
}

impl CatalogEntry {
    pub fn key(&self) -> CatalogKey {
        CatalogKey::new(&self.location, &self.name)
    }
}
