//! Domain model for appointments and recurring families.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//!
//! # Invariants
//! - Every stored appointment is identified by a stable `AppointmentId`.
//! - Deletion is represented by soft-delete tombstones.
//! - Recurring instances are linked only through a shared `GroupId`.

pub mod appointment;
