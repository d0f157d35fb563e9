//! Case-insensitive lookup keys for catalog entities.
//!
//! All catalog lookups (location by name, entry/resource by name within a
//! location) are case-insensitive exact matches. Rather than scanning with a
//! per-call case fold, entities are indexed under a `NormalizedKey` so a
//! lookup is a single hash probe.

use serde::{Deserialize, Serialize};

/// A trimmed, lower-cased lookup key.
///
/// Two keys built from `"DELHI"` and `" delhi "` compare equal. The original
/// casing is not kept here; entities store their display form separately.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedKey(String);

impl NormalizedKey {
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl core::fmt::Display for NormalizedKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NormalizedKey {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// Composite key for entities that are unique per (name, location).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CatalogKey {
    pub location: NormalizedKey,
    pub name: NormalizedKey,
}

impl CatalogKey {
    pub fn new(location: &str, name: &str) -> Self {
        Self {
            location: NormalizedKey::new(location),
            name: NormalizedKey::new(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_case_insensitive() {
        assert_eq!(NormalizedKey::new("DELHI"), NormalizedKey::new("delhi"));
        assert_eq!(NormalizedKey::new("Red Fort"), NormalizedKey::new("red fort"));
    }

    #[test]
    fn key_trims_surrounding_whitespace() {
        assert_eq!(NormalizedKey::new(" Mumbai "), NormalizedKey::new("MUMBAI"));
    }

    #[test]
    fn catalog_key_distinguishes_same_name_in_different_locations() {
        let a = CatalogKey::new("DELHI", "Heritage Hotel");
        let b = CatalogKey::new("PUNJAB", "Heritage Hotel");
        assert_ne!(a, b);
        assert_eq!(a, CatalogKey::new("delhi", "HERITAGE HOTEL"));
    }
}
