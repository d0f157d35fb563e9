//! Location record (city/region the catalog hangs off).

use serde::{Deserialize, Serialize};
use stayledger_core::NormalizedKey;

/// A city or region. Entries and resources can only be seeded against a
/// location that already exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Display name as originally seeded (e.g. `"DELHI"`).
    pub name: String,
}

impl Location {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Case-insensitive lookup key for this location.
    pub fn key(&self) -> NormalizedKey {
        NormalizedKey::new(&self.name)
    }
}
