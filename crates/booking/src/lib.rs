//! Booking domain: reservations and capacity arithmetic.
//!
//! Pure domain logic (no IO, no storage). The atomic check-and-insert
//! discipline lives in `stayledger-infra`; this crate owns the shapes and
//! the deterministic rules.

pub mod reservation;

pub use reservation::{remaining, Reservation, ReservationDraft, ReservationKind};
