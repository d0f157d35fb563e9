//! Built-in sample seed data and the JSON seed-file shape.
//!
//! The samples are the travel catalog the system shipped with: famous
//! places for eight cities and hotels for five states. Seeding is
//! idempotent, so loading them into a database that already has some of
//! the entries only fills the gaps.

use serde::{Deserialize, Serialize};
use stayledger_catalog::{EntrySpec, ResourceSpec};

/// Location-keyed batches, ready for `InventoryLedger::seed_catalog` /
/// `seed_resources` or their Postgres counterparts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub places: Vec<(String, Vec<EntrySpec>)>,
    #[serde(default)]
    pub hotels: Vec<(String, Vec<ResourceSpec>)>,
}

impl SeedFile {
    /// The built-in sample catalog.
    pub fn samples() -> Self {
        Self {
            locations: sample_locations(),
            places: sample_places(),
            hotels: sample_hotels(),
        }
    }
}

/// Every location the sample batches reference.
pub fn sample_locations() -> Vec<String> {
    [
        "DELHI",
        "MUMBAI",
        "DARJEELING",
        "LONDON",
        "NEW YORK",
        "ZURICH",
        "COCHIN",
        "SRINAGAR",
        "UTTAR PRADESH",
        "BIHAR",
        "PUNJAB",
        "HIMACHAL PRADESH",
        "RAJASTHAN",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

/// Famous-place entries keyed by city.
pub fn sample_places() -> Vec<(String, Vec<EntrySpec>)> {
    let place = EntrySpec::new;
    vec![
        (
            "DELHI".to_string(),
            vec![
                place("Red Fort", "Historic fort complex and UNESCO site."),
                place("Qutub Minar", "Tall minaret and archaeological complex."),
                place("India Gate", "War memorial in the heart of Delhi."),
            ],
        ),
        (
            "MUMBAI".to_string(),
            vec![
                place("Gateway of India", "Iconic arch on the waterfront."),
                place("Marine Drive", "Coastal promenade with skyline views."),
                place("Elephanta Caves", "Rock-cut temples on Elephanta Island."),
            ],
        ),
        (
            "DARJEELING".to_string(),
            vec![
                place("Tiger Hill", "Sunrise views over Kanchenjunga."),
                place("Batasia Loop", "Scenic railway loop and memorial garden."),
            ],
        ),
        (
            "LONDON".to_string(),
            vec![
                place("Tower of London", "Historic castle on the Thames."),
                place("British Museum", "Extensive collection of human history."),
            ],
        ),
        (
            "NEW YORK".to_string(),
            vec![
                place("Statue of Liberty", "Famous US national monument."),
                place("Central Park", "Large urban park in Manhattan."),
            ],
        ),
        (
            "ZURICH".to_string(),
            vec![place("Old Town", "Historic center with medieval buildings.")],
        ),
        (
            "COCHIN".to_string(),
            vec![place(
                "Fort Kochi",
                "Historic neighborhood with colonial buildings.",
            )],
        ),
        (
            "SRINAGAR".to_string(),
            vec![place(
                "Dal Lake",
                "Famous lake with houseboats and shikaras.",
            )],
        ),
    ]
}

/// Sample hotels keyed by state.
pub fn sample_hotels() -> Vec<(String, Vec<ResourceSpec>)> {
    vec![
        (
            "UTTAR PRADESH".to_string(),
            vec![
                hotel("Agra Grand Hotel", "Taj Ganj, Agra", 3500, 4, "Free WiFi, Breakfast, Pool", 13, 50),
                hotel("Varanasi Riverside Inn", "Dashashwamedh Ghat, Varanasi", 2500, 3, "River view, Breakfast", 30, 30),
            ],
        ),
        (
            "BIHAR".to_string(),
            vec![
                hotel("Bodh Heritage Hotel", "Near Mahabodhi Temple, Bodh Gaya", 2200, 3, "Garden, Breakfast", 12, 25),
                hotel("Nalanda Stay", "Nalanda Road, Nalanda", 1800, 3, "Parking, Guide Desk", 40, 20),
            ],
        ),
        (
            "PUNJAB".to_string(),
            vec![
                hotel("Amritsar Heritage Hotel", "Near Golden Temple, Amritsar", 3000, 4, "Pool, Free WiFi, Breakfast", 10, 60),
                hotel("Ludhiana Comfort Inn", "City Center, Ludhiana", 2000, 3, "Breakfast, Parking", 25, 35),
            ],
        ),
        (
            "HIMACHAL PRADESH".to_string(),
            vec![
                hotel("Shimla Pine Resort", "Mall Road, Shimla", 4000, 4, "Mountain view, Fireplace", 18, 40),
                hotel("Manali Valley Lodge", "Old Manali", 3200, 4, "Garden, Breakfast", 50, 30),
            ],
        ),
        (
            "RAJASTHAN".to_string(),
            vec![
                hotel("Jaipur Royal Palace Hotel", "Pink City, Jaipur", 4500, 5, "Heritage, Pool, Breakfast", 15, 45),
                hotel("Jaisalmer Desert Inn", "Near Jaisalmer Fort", 2800, 4, "Desert tours, Breakfast", 8, 28),
            ],
        ),
    ]
}

fn hotel(
    name: &str,
    address: &str,
    price: u32,
    rating: u8,
    amenities: &str,
    dist_from_airport_km: u32,
    total_capacity: u32,
) -> ResourceSpec {
    ResourceSpec {
        name: name.to_string(),
        address: address.to_string(),
        price,
        rating,
        amenities: amenities.to_string(),
        dist_from_airport_km,
        total_capacity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_sample_batch_location_is_listed() {
        let locations: HashSet<String> = sample_locations()
            .into_iter()
            .map(|l| l.to_lowercase())
            .collect();
        let batch_locations = sample_places()
            .into_iter()
            .map(|(l, _)| l)
            .chain(sample_hotels().into_iter().map(|(l, _)| l));
        for location in batch_locations {
            assert!(locations.contains(&location.to_lowercase()), "{location}");
        }
    }

    #[test]
    fn sample_specs_all_validate() {
        for (_, specs) in sample_hotels() {
            for spec in specs {
                spec.validate().unwrap();
            }
        }
        for (_, specs) in sample_places() {
            for spec in specs {
                spec.validate().unwrap();
            }
        }
    }

    #[test]
    fn seed_file_round_trips_through_json() {
        let samples = SeedFile::samples();
        let json = serde_json::to_string(&samples).unwrap();
        let back: SeedFile = serde_json::from_str(&json).unwrap();
        assert_eq!(back.locations, samples.locations);
        assert_eq!(back.hotels.len(), samples.hotels.len());
    }
}
