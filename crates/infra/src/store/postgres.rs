//! Postgres-backed store.
//!
//! Mirrors the ledger semantics with async inherent methods so the seeding
//! CLI and a production web layer can share one relational database. The
//! reserve path takes a row lock on the resource (`SELECT ... FOR UPDATE`)
//! so the capacity check and the insert commit as one unit; two concurrent
//! reserves on the last unit cannot both succeed.
//!
//! Error mapping: serialization/deadlock failures (SQLSTATE `40001`,
//! `40P01`) become [`StoreError::Conflict`] and are retried with the same
//! bounded policy as the in-memory path; everything else surfaces as
//! [`StoreError::Backend`].

use chrono::NaiveDate;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use stayledger_booking::{remaining, Reservation, ReservationDraft, ReservationKind};
use stayledger_catalog::{EntrySpec, Resource, ResourceSpec, SeedOutcome};
use stayledger_core::{DomainError, DomainResult, OwnerId, ReservationId, ResourceId};

use crate::ledger::RetryPolicy;
use crate::store::StoreError;

/// Postgres-backed catalog + reservation store.
///
/// Cloneable; `PgPool` is already an `Arc` internally.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
    retry: RetryPolicy,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Create the tables and their case-insensitive unique indexes if they
    /// do not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        let statements = [
            r#"
            CREATE TABLE IF NOT EXISTS locations (
                id UUID PRIMARY KEY,
                name TEXT NOT NULL
            )
            "#,
            r#"
            CREATE UNIQUE INDEX IF NOT EXISTS locations_name_key
                ON locations (lower(name))
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS catalog_entries (
                id UUID PRIMARY KEY,
                location_id UUID NOT NULL REFERENCES locations(id),
                name TEXT NOT NULL,
                description TEXT NOT NULL
            )
            "#,
            r#"
            CREATE UNIQUE INDEX IF NOT EXISTS catalog_entries_key
                ON catalog_entries (location_id, lower(name))
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS resources (
                id UUID PRIMARY KEY,
                location_id UUID NOT NULL REFERENCES locations(id),
                name TEXT NOT NULL,
                address TEXT NOT NULL,
                price BIGINT NOT NULL,
                rating SMALLINT NOT NULL,
                amenities TEXT NOT NULL,
                dist_from_airport_km INT NOT NULL,
                capacity BIGINT NOT NULL CHECK (capacity >= 0)
            )
            "#,
            r#"
            CREATE UNIQUE INDEX IF NOT EXISTS resources_key
                ON resources (location_id, lower(name))
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS reservations (
                id UUID PRIMARY KEY,
                resource_id UUID NOT NULL REFERENCES resources(id),
                date DATE NOT NULL,
                quantity INT NOT NULL CHECK (quantity >= 1),
                owner UUID NOT NULL,
                kind TEXT NOT NULL CHECK (kind IN ('plain', 'package'))
            )
            "#,
            r#"
            CREATE INDEX IF NOT EXISTS reservations_slot
                ON reservations (resource_id, date)
            "#,
        ];

        for statement in statements {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        }
        Ok(())
    }

    /// Idempotently create a location.
    #[instrument(skip(self))]
    pub async fn seed_location(&self, name: &str) -> DomainResult<SeedOutcome> {
        if name.trim().is_empty() {
            return Err(DomainError::validation("location name cannot be empty"));
        }

        let result = sqlx::query(
            "INSERT INTO locations (id, name) VALUES ($1, $2) \
             ON CONFLICT (lower(name)) DO NOTHING",
        )
        .bind(Uuid::now_v7())
        .bind(name)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("seed_location", e).into_domain())?;

        Ok(outcome_from_rows(result.rows_affected()))
    }

    /// Idempotently seed one catalog entry under a location.
    #[instrument(skip(self, spec), fields(entry = %spec.name))]
    pub async fn seed_catalog_entry(
        &self,
        location: &str,
        spec: &EntrySpec,
    ) -> DomainResult<SeedOutcome> {
        spec.validate()?;
        let location_id = self.require_location(location).await?;

        let result = sqlx::query(
            "INSERT INTO catalog_entries (id, location_id, name, description) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (location_id, lower(name)) DO NOTHING",
        )
        .bind(Uuid::now_v7())
        .bind(location_id)
        .bind(&spec.name)
        .bind(&spec.description)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("seed_catalog_entry", e).into_domain())?;

        let outcome = outcome_from_rows(result.rows_affected());
        match outcome {
            SeedOutcome::Created => info!(entry = %spec.name, location, "catalog entry created"),
            SeedOutcome::Skipped => info!(entry = %spec.name, location, "already exists"),
        }
        Ok(outcome)
    }

    /// Idempotently seed one bookable resource under a location.
    #[instrument(skip(self, spec), fields(resource = %spec.name))]
    pub async fn seed_resource(
        &self,
        location: &str,
        spec: &ResourceSpec,
    ) -> DomainResult<SeedOutcome> {
        spec.validate()?;
        let location_id = self.require_location(location).await?;
        let dist = i32::try_from(spec.dist_from_airport_km)
            .map_err(|_| DomainError::validation("dist_from_airport_km out of range"))?;

        let result = sqlx::query(
            "INSERT INTO resources \
               (id, location_id, name, address, price, rating, amenities, dist_from_airport_km, capacity) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             ON CONFLICT (location_id, lower(name)) DO NOTHING",
        )
        .bind(Uuid::now_v7())
        .bind(location_id)
        .bind(&spec.name)
        .bind(&spec.address)
        .bind(i64::from(spec.price))
        .bind(i16::from(spec.rating))
        .bind(&spec.amenities)
        .bind(dist)
        .bind(i64::from(spec.total_capacity))
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("seed_resource", e).into_domain())?;

        let outcome = outcome_from_rows(result.rows_affected());
        match outcome {
            SeedOutcome::Created => {
                info!(resource = %spec.name, location, capacity = spec.total_capacity, "resource created")
            }
            SeedOutcome::Skipped => info!(resource = %spec.name, location, "already exists"),
        }
        Ok(outcome)
    }

    /// Atomically reserve `quantity` units of a resource on a date.
    ///
    /// Same contract as the ledger's reserve: `InvalidQuantity`,
    /// `ResourceNotFound`, `CapacityExceeded`, or
    /// `ConcurrentUpdateConflict` after retry exhaustion; nothing is
    /// persisted on failure.
    #[instrument(skip(self), fields(resource_id = %resource_id, %date))]
    pub async fn reserve(
        &self,
        resource_id: ResourceId,
        date: NaiveDate,
        quantity: u32,
        owner: OwnerId,
        kind: ReservationKind,
    ) -> DomainResult<Reservation> {
        let draft = ReservationDraft::new(resource_id, date, quantity, owner, kind)?;

        let attempts = self.retry.attempts();
        for attempt in 1..=attempts {
            match self.try_reserve(&draft, kind).await {
                Ok(reservation) => return Ok(reservation),
                Err(StoreReserveError::Domain(err)) => return Err(err),
                Err(StoreReserveError::Conflict(reason)) => {
                    if attempt < attempts {
                        warn!(attempt, %reason, "reserve conflict, retrying");
                        tokio::time::sleep(self.retry.delay_for(attempt)).await;
                    }
                }
            }
        }

        Err(DomainError::ConcurrentUpdateConflict { attempts })
    }

    async fn try_reserve(
        &self,
        draft: &ReservationDraft,
        kind: ReservationKind,
    ) -> Result<Reservation, StoreReserveError> {
        let resource_id = draft.resource_id();
        let date = draft.date();
        let quantity = draft.quantity();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreReserveError::from_sqlx("begin", e))?;

        // Lock the resource row; concurrent reserves on the same resource
        // serialize here.
        let capacity_row = sqlx::query("SELECT capacity FROM resources WHERE id = $1 FOR UPDATE")
            .bind(resource_id.as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| StoreReserveError::from_sqlx("lock resource", e))?;

        let capacity: i64 = match capacity_row {
            Some(row) => row.get(0),
            None => return Err(StoreReserveError::Domain(DomainError::ResourceNotFound)),
        };

        let used: i64 = sqlx::query(
            "SELECT COALESCE(SUM(quantity), 0) FROM reservations \
             WHERE resource_id = $1 AND date = $2",
        )
        .bind(resource_id.as_uuid())
        .bind(date)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| StoreReserveError::from_sqlx("sum usage", e))?
        .get(0);

        let free = u32::try_from((capacity - used).max(0)).unwrap_or(u32::MAX);
        if quantity > free {
            return Err(StoreReserveError::Domain(DomainError::CapacityExceeded {
                requested: quantity,
                remaining: free,
            }));
        }

        let reservation = draft.clone().into_reservation(ReservationId::new());
        sqlx::query(
            "INSERT INTO reservations (id, resource_id, date, quantity, owner, kind) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(reservation.id.as_uuid())
        .bind(resource_id.as_uuid())
        .bind(date)
        .bind(i32::try_from(quantity).map_err(|_| {
            StoreReserveError::Domain(DomainError::validation("quantity out of range"))
        })?)
        .bind(reservation.owner.as_uuid())
        .bind(kind.as_str())
        .execute(&mut *tx)
        .await
        .map_err(|e| StoreReserveError::from_sqlx("insert reservation", e))?;

        tx.commit()
            .await
            .map_err(|e| StoreReserveError::from_sqlx("commit", e))?;

        info!(quantity, kind = kind.as_str(), "reservation created");
        Ok(reservation)
    }

    /// Sum of reserved quantities (both kinds) for a resource and date.
    pub async fn current_usage(
        &self,
        resource_id: ResourceId,
        date: NaiveDate,
    ) -> DomainResult<u32> {
        self.require_resource(resource_id).await?;

        let used: i64 = sqlx::query(
            "SELECT COALESCE(SUM(quantity), 0) FROM reservations \
             WHERE resource_id = $1 AND date = $2",
        )
        .bind(resource_id.as_uuid())
        .bind(date)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("current_usage", e).into_domain())?
        .get(0);

        u32::try_from(used).map_err(|_| DomainError::storage("usage sum out of range"))
    }

    /// Total capacity minus current usage; negative signals an oversell
    /// defect and is logged at error level.
    pub async fn remaining_capacity(
        &self,
        resource_id: ResourceId,
        date: NaiveDate,
    ) -> DomainResult<i64> {
        let resource = self.require_resource(resource_id).await?;
        let used = self.current_usage(resource_id, date).await?;

        let left = remaining(resource.total_capacity, used);
        if left < 0 {
            error!(
                resource = %resource.name,
                %date,
                capacity = resource.total_capacity,
                used,
                "negative remaining capacity: oversell invariant violated"
            );
        }
        Ok(left)
    }

    /// Resources whose location contains the fragment, case-insensitively.
    ///
    /// `position` keeps the match literal; an `ILIKE` pattern would let
    /// `%`, `_` and `\` in the fragment act as wildcards, diverging from
    /// the in-memory store's `contains` semantics.
    pub async fn find_resources(&self, location_fragment: &str) -> DomainResult<Vec<Resource>> {
        let rows = sqlx::query(
            "SELECT r.id, l.name AS location, r.name, r.address, r.price, r.rating, \
                    r.amenities, r.dist_from_airport_km, r.capacity \
             FROM resources r JOIN locations l ON l.id = r.location_id \
             WHERE position(lower($1) IN lower(l.name)) > 0 \
             ORDER BY l.name, r.name",
        )
        .bind(location_fragment.trim())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_resources", e).into_domain())?;

        rows.iter().map(resource_from_row).collect()
    }

    /// Reservations for a resource on an exact date, both kinds.
    pub async fn reservations_for(
        &self,
        resource_id: ResourceId,
        date: NaiveDate,
    ) -> DomainResult<Vec<Reservation>> {
        self.require_resource(resource_id).await?;

        let rows = sqlx::query(
            "SELECT id, resource_id, date, quantity, owner, kind FROM reservations \
             WHERE resource_id = $1 AND date = $2 ORDER BY id",
        )
        .bind(resource_id.as_uuid())
        .bind(date)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("reservations_for", e).into_domain())?;

        rows.iter().map(reservation_from_row).collect()
    }

    async fn require_location(&self, name: &str) -> DomainResult<Uuid> {
        let row = sqlx::query("SELECT id FROM locations WHERE lower(name) = lower($1)")
            .bind(name.trim())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("require_location", e).into_domain())?;

        row.map(|r| r.get(0))
            .ok_or_else(|| DomainError::location_not_found(name))
    }

    async fn require_resource(&self, id: ResourceId) -> DomainResult<Resource> {
        let row = sqlx::query(
            "SELECT r.id, l.name AS location, r.name, r.address, r.price, r.rating, \
                    r.amenities, r.dist_from_airport_km, r.capacity \
             FROM resources r JOIN locations l ON l.id = r.location_id \
             WHERE r.id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("require_resource", e).into_domain())?;

        match row {
            Some(row) => resource_from_row(&row),
            None => Err(DomainError::ResourceNotFound),
        }
    }
}

enum StoreReserveError {
    /// Deterministic, not worth retrying.
    Domain(DomainError),
    /// Transaction lost a race; retry with backoff.
    Conflict(String),
}

impl StoreReserveError {
    fn from_sqlx(context: &str, err: sqlx::Error) -> Self {
        match map_sqlx_error(context, err) {
            StoreError::Conflict(reason) => Self::Conflict(reason),
            StoreError::Backend(reason) => Self::Domain(DomainError::storage(reason)),
        }
    }
}

fn resource_from_row(row: &PgRow) -> DomainResult<Resource> {
    let price: i64 = row.get("price");
    let rating: i16 = row.get("rating");
    let dist: i32 = row.get("dist_from_airport_km");
    let capacity: i64 = row.get("capacity");

    Ok(Resource {
        id: ResourceId::from_uuid(row.get("id")),
        location: row.get("location"),
        name: row.get("name"),
        address: row.get("address"),
        price: u32::try_from(price).map_err(|_| DomainError::storage("price out of range"))?,
        rating: u8::try_from(rating).map_err(|_| DomainError::storage("rating out of range"))?,
        amenities: row.get("amenities"),
        dist_from_airport_km: u32::try_from(dist)
            .map_err(|_| DomainError::storage("distance out of range"))?,
        total_capacity: u32::try_from(capacity)
            .map_err(|_| DomainError::storage("capacity out of range"))?,
    })
}

fn reservation_from_row(row: &PgRow) -> DomainResult<Reservation> {
    let quantity: i32 = row.get("quantity");
    let kind: String = row.get("kind");

    Ok(Reservation {
        id: ReservationId::from_uuid(row.get("id")),
        resource_id: ResourceId::from_uuid(row.get("resource_id")),
        date: row.get("date"),
        quantity: u32::try_from(quantity)
            .map_err(|_| DomainError::storage("quantity out of range"))?,
        owner: OwnerId::from_uuid(row.get("owner")),
        kind: kind.parse()?,
    })
}

fn outcome_from_rows(rows_affected: u64) -> SeedOutcome {
    if rows_affected > 0 {
        SeedOutcome::Created
    } else {
        SeedOutcome::Skipped
    }
}

fn map_sqlx_error(context: &str, err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db) => match db.code().as_deref() {
            // serialization_failure / deadlock_detected: lost a race, retryable
            Some("40001") | Some("40P01") => {
                StoreError::Conflict(format!("{context}: {}", db.message()))
            }
            _ => StoreError::Backend(format!("{context}: {err}")),
        },
        _ => StoreError::Backend(format!("{context}: {err}")),
    }
}

