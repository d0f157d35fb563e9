//! Reservation records and quantity rules.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use stayledger_core::{DomainError, DomainResult, OwnerId, ReservationId, ResourceId};

/// How a reservation was made.
///
/// Package-bundled bookings consume the same capacity pool as plain ones;
/// availability math always sums both kinds together.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationKind {
    Plain,
    Package,
}

impl ReservationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::Package => "package",
        }
    }
}

impl core::str::FromStr for ReservationKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "plain" => Ok(Self::Plain),
            "package" => Ok(Self::Package),
            other => Err(DomainError::validation(format!(
                "unknown reservation kind: {other}"
            ))),
        }
    }
}

/// A confirmed consumption of capacity on a single calendar date.
///
/// Never mutated after creation. Dates compare by exact equality; there is
/// no stay-duration or range overlap semantics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: ReservationId,
    pub resource_id: ResourceId,
    pub date: NaiveDate,
    pub quantity: u32,
    pub owner: OwnerId,
    pub kind: ReservationKind,
}

/// A validated, not-yet-persisted reservation request.
///
/// Construction is the single place the quantity rule is enforced, so
/// nothing downstream has to re-check it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationDraft {
    resource_id: ResourceId,
    date: NaiveDate,
    quantity: u32,
    owner: OwnerId,
    kind: ReservationKind,
}

impl ReservationDraft {
    /// Validate a reservation request. Quantity zero is rejected outright,
    /// not treated as a no-op.
    pub fn new(
        resource_id: ResourceId,
        date: NaiveDate,
        quantity: u32,
        owner: OwnerId,
        kind: ReservationKind,
    ) -> DomainResult<Self> {
        if quantity == 0 {
            return Err(DomainError::InvalidQuantity);
        }
        Ok(Self {
            resource_id,
            date,
            quantity,
            owner,
            kind,
        })
    }

    pub fn resource_id(&self) -> ResourceId {
        self.resource_id
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Assign an identity, producing the persistable record.
    pub fn into_reservation(self, id: ReservationId) -> Reservation {
        Reservation {
            id,
            resource_id: self.resource_id,
            date: self.date,
            quantity: self.quantity,
            owner: self.owner,
            kind: self.kind,
        }
    }
}

/// Remaining capacity given total capacity and current usage.
///
/// Signed on purpose: a negative value means the oversell invariant was
/// already violated by a bug, and callers must treat it as a defect signal
/// rather than a valid answer.
pub fn remaining(total_capacity: u32, used: u32) -> i64 {
    i64::from(total_capacity) - i64::from(used)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, 15).unwrap()
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let err = ReservationDraft::new(
            ResourceId::new(),
            date(),
            0,
            OwnerId::new(),
            ReservationKind::Plain,
        )
        .unwrap_err();
        assert_eq!(err, DomainError::InvalidQuantity);
    }

    #[test]
    fn draft_carries_through_to_reservation() {
        let resource_id = ResourceId::new();
        let owner = OwnerId::new();
        let draft =
            ReservationDraft::new(resource_id, date(), 2, owner, ReservationKind::Package)
                .unwrap();
        let id = ReservationId::new();
        let rsvp = draft.into_reservation(id);
        assert_eq!(rsvp.id, id);
        assert_eq!(rsvp.resource_id, resource_id);
        assert_eq!(rsvp.quantity, 2);
        assert_eq!(rsvp.kind, ReservationKind::Package);
    }

    #[test]
    fn remaining_goes_negative_on_oversell() {
        assert_eq!(remaining(50, 48), 2);
        assert_eq!(remaining(50, 50), 0);
        assert_eq!(remaining(50, 53), -3);
    }

    #[test]
    fn kind_round_trips_through_str() {
        for kind in [ReservationKind::Plain, ReservationKind::Package] {
            assert_eq!(kind.as_str().parse::<ReservationKind>().unwrap(), kind);
        }
    }

    proptest! {
        /// Any positive quantity is accepted and preserved verbatim.
        #[test]
        fn positive_quantities_are_accepted(qty in 1u32..=10_000) {
            let draft = ReservationDraft::new(
                ResourceId::new(),
                date(),
                qty,
                OwnerId::new(),
                ReservationKind::Plain,
            ).unwrap();
            prop_assert_eq!(draft.quantity(), qty);
        }

        /// `remaining` never panics and is exact over the full u32 range.
        #[test]
        fn remaining_is_exact(capacity in 0u32..=u32::MAX, used in 0u32..=u32::MAX) {
            let r = remaining(capacity, used);
            prop_assert_eq!(r, i64::from(capacity) - i64::from(used));
        }
    }
}
