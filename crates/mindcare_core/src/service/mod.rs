//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate expansion and store calls into use-case level APIs.
//! - Keep FFI/CLI layers decoupled from storage details.

pub mod appointment_service;
