//! `stayledger-seed` — idempotent catalog seeding against Postgres.
//!
//! Seeds locations, famous places, and hotels. Safe to re-run: entries
//! that already exist (case-insensitive name + location) are skipped.
//!
//! Usage:
//!
//! ```text
//! DATABASE_URL=postgres://... stayledger-seed [seed-file.json]
//! ```
//!
//! Without an argument the built-in sample catalog is used.

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use stayledger_catalog::{EntrySpec, ResourceSpec};
use stayledger_core::DomainError;
use stayledger_infra::seed::SeedFile;
use stayledger_infra::{PostgresStore, SeedReport};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    stayledger_observability::init();

    let database_url =
        std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let seed = match std::env::args().nth(1) {
        Some(path) => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read seed file {path}"))?;
            serde_json::from_str::<SeedFile>(&raw)
                .with_context(|| format!("failed to parse seed file {path}"))?
        }
        None => SeedFile::samples(),
    };

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to database")?;

    let store = PostgresStore::new(pool);
    store.ensure_schema().await?;

    let mut locations_created = 0u32;
    for name in &seed.locations {
        if store.seed_location(name).await?.is_created() {
            locations_created += 1;
        }
    }
    tracing::info!(created = locations_created, total = seed.locations.len(), "locations seeded");

    let places = seed_places(&store, &seed.places).await?;
    tracing::info!(
        created = places.created,
        skipped = places.skipped,
        missing_locations = places.missing_locations,
        "famous places seeded"
    );

    let hotels = seed_hotels(&store, &seed.hotels).await?;
    tracing::info!(
        created = hotels.created,
        skipped = hotels.skipped,
        missing_locations = hotels.missing_locations,
        "hotels seeded"
    );

    Ok(())
}

async fn seed_places(
    store: &PostgresStore,
    batch: &[(String, Vec<EntrySpec>)],
) -> anyhow::Result<SeedReport> {
    let mut report = SeedReport::default();
    for (location, specs) in batch {
        for spec in specs {
            match store.seed_catalog_entry(location, spec).await {
                Ok(outcome) if outcome.is_created() => report.created += 1,
                Ok(_) => report.skipped += 1,
                Err(DomainError::LocationNotFound(name)) => {
                    tracing::warn!(location = %name, "location not found, skipping entries");
                    report.missing_locations += 1;
                    break;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
    Ok(report)
}

async fn seed_hotels(
    store: &PostgresStore,
    batch: &[(String, Vec<ResourceSpec>)],
) -> anyhow::Result<SeedReport> {
    let mut report = SeedReport::default();
    for (location, specs) in batch {
        for spec in specs {
            match store.seed_resource(location, spec).await {
                Ok(outcome) if outcome.is_created() => report.created += 1,
                Ok(_) => report.skipped += 1,
                Err(DomainError::LocationNotFound(name)) => {
                    tracing::warn!(location = %name, "location not found, skipping hotels");
                    report.missing_locations += 1;
                    break;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
    Ok(report)
}
