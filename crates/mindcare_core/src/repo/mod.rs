//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the storage primitives the services depend on.
//! - Isolate SQLite query details from use-case orchestration.
//!
//! # Invariants
//! - Repository writes enforce `Appointment::validate()` before persistence.
//! - Deletes are idempotent and report whether a row was removed.

pub mod appointment_repo;
