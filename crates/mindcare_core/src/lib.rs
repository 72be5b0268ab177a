//! Core domain logic for MindCare appointments.
//! This crate is the single source of truth for scheduling invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod recurrence;
pub mod repo;
pub mod service;

pub use config::{RecurrenceConfig, WeeklyGroupScope};
pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig};
pub use model::appointment::{
    format_date, parse_date, Appointment, AppointmentId, AppointmentKind, AppointmentStatus,
    AppointmentTemplate, AppointmentValidationError, GroupId,
};
pub use recurrence::{
    expand_monthly, expand_weekly, generate_repeat_appointments,
    try_generate_repeat_appointments, Expansion, GeneratedAppointment, RepeatKind, RepeatRule,
    RuleError,
};
pub use repo::appointment_repo::{AppointmentStore, RepoError, RepoResult, SqliteAppointmentStore};
pub use service::appointment_service::{
    AppointmentService, AppointmentServiceError, CreatedSeries, GroupDeleteError,
    GroupDeleteOutcome, GroupDeletePolicy, GroupDeleteRequest,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
