//! Appointment domain model.
//!
//! # Responsibility
//! - Define the stored appointment record and the template stamped onto
//!   recurring instances.
//! - Define the group identifier shared by one recurrence family.
//!
//! # Invariants
//! - `id` is stable, non-nil and never reused for another appointment.
//! - `user_id` and `title` are never blank.
//! - `end_time` is not earlier than `start_time` when both are set.
//! - Dates are naive local calendar dates (`YYYY-MM-DD` on the wire).

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for one stored appointment.
pub type AppointmentId = Uuid;

/// Category of an appointment as shown in the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentKind {
    /// Session with a counselor.
    Counseling,
    /// Self-care block (journaling, meditation, exercise).
    SelfCare,
    /// Medical visit or medication check.
    Medical,
    Other,
}

/// Lifecycle state of an appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    #[default]
    Scheduled,
    Completed,
    Cancelled,
}

/// Identifier shared by the base appointment and every instance derived
/// from the same repeat rule.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(String);

impl GroupId {
    /// Wraps a caller-supplied group identifier.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Group id for a weekly family.
    ///
    /// `weekday = Some(w)` keys the group per selected weekday
    /// (`weekly_<base>_<title>_<w>`); `None` keys it per rule
    /// (`weekly_<base>_<title>`).
    pub fn weekly(base_date: NaiveDate, title: &str, weekday: Option<u8>) -> Self {
        match weekday {
            Some(weekday) => Self(format!(
                "weekly_{}_{}_{}",
                format_date(base_date),
                title,
                weekday
            )),
            None => Self(format!("weekly_{}_{}", format_date(base_date), title)),
        }
    }

    /// Group id for a monthly family: `monthly_date_<base>_<title>`.
    pub fn monthly(base_date: NaiveDate, title: &str) -> Self {
        Self(format!("monthly_date_{}_{}", format_date(base_date), title))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for GroupId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validation errors for appointment records and templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppointmentValidationError {
    NilId,
    BlankUserId,
    BlankTitle,
    InvalidTimeWindow { start: NaiveTime, end: NaiveTime },
}

impl Display for AppointmentValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "appointment id must not be nil"),
            Self::BlankUserId => write!(f, "user_id must not be blank"),
            Self::BlankTitle => write!(f, "title must not be blank"),
            Self::InvalidTimeWindow { start, end } => {
                write!(f, "end_time ({end}) must be >= start_time ({start})")
            }
        }
    }
}

impl Error for AppointmentValidationError {}

/// Fields stamped onto every appointment created from one user request.
///
/// `date` is the base date of a repeat rule; the expander overwrites it per
/// generated instance and copies everything else verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentTemplate {
    pub user_id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: AppointmentKind,
    pub date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    /// Minutes before `start_time` to remind the user.
    pub reminder_minutes: Option<u32>,
    pub memo: Option<String>,
    #[serde(default)]
    pub status: AppointmentStatus,
}

impl AppointmentTemplate {
    /// Creates a template with optional fields unset and status `scheduled`.
    pub fn new(
        user_id: impl Into<String>,
        title: impl Into<String>,
        kind: AppointmentKind,
        date: NaiveDate,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            title: title.into(),
            kind,
            date,
            start_time: None,
            end_time: None,
            reminder_minutes: None,
            memo: None,
            status: AppointmentStatus::Scheduled,
        }
    }

    /// Sets the time window.
    pub fn with_time_window(mut self, start: NaiveTime, end: Option<NaiveTime>) -> Self {
        self.start_time = Some(start);
        self.end_time = end;
        self
    }

    /// Validates owner, title and time window.
    pub fn validate(&self) -> Result<(), AppointmentValidationError> {
        if self.user_id.trim().is_empty() {
            return Err(AppointmentValidationError::BlankUserId);
        }
        if self.title.trim().is_empty() {
            return Err(AppointmentValidationError::BlankTitle);
        }
        if let (Some(start), Some(end)) = (self.start_time, self.end_time) {
            if end < start {
                return Err(AppointmentValidationError::InvalidTimeWindow { start, end });
            }
        }
        Ok(())
    }

    /// Copies this template onto `date`.
    pub fn on_date(&self, date: NaiveDate) -> Self {
        Self {
            date,
            ..self.clone()
        }
    }
}

/// Stored appointment record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "AppointmentWire")]
pub struct Appointment {
    pub id: AppointmentId,
    pub user_id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: AppointmentKind,
    pub date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub reminder_minutes: Option<u32>,
    pub memo: Option<String>,
    pub status: AppointmentStatus,
    /// Set when the appointment belongs to a recurring family.
    pub group_id: Option<GroupId>,
    /// Soft delete tombstone.
    pub is_deleted: bool,
}

impl Appointment {
    /// Creates an appointment from a template with a generated id.
    pub fn from_template(template: AppointmentTemplate, group_id: Option<GroupId>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: template.user_id,
            title: template.title,
            kind: template.kind,
            date: template.date,
            start_time: template.start_time,
            end_time: template.end_time,
            reminder_minutes: template.reminder_minutes,
            memo: template.memo,
            status: template.status,
            group_id,
            is_deleted: false,
        }
    }

    /// Returns the template view of this appointment.
    pub fn template(&self) -> AppointmentTemplate {
        AppointmentTemplate {
            user_id: self.user_id.clone(),
            title: self.title.clone(),
            kind: self.kind,
            date: self.date,
            start_time: self.start_time,
            end_time: self.end_time,
            reminder_minutes: self.reminder_minutes,
            memo: self.memo.clone(),
            status: self.status,
        }
    }

    /// Validates all record invariants.
    pub fn validate(&self) -> Result<(), AppointmentValidationError> {
        if self.id.is_nil() {
            return Err(AppointmentValidationError::NilId);
        }
        self.template().validate()
    }

    pub fn belongs_to_group(&self, group_id: &GroupId) -> bool {
        self.group_id.as_ref() == Some(group_id)
    }

    pub fn is_active(&self) -> bool {
        !self.is_deleted
    }
}

#[derive(Deserialize)]
struct AppointmentWire {
    id: AppointmentId,
    user_id: String,
    title: String,
    #[serde(rename = "type")]
    kind: AppointmentKind,
    date: NaiveDate,
    start_time: Option<NaiveTime>,
    end_time: Option<NaiveTime>,
    reminder_minutes: Option<u32>,
    memo: Option<String>,
    #[serde(default)]
    status: AppointmentStatus,
    group_id: Option<GroupId>,
    #[serde(default)]
    is_deleted: bool,
}

impl TryFrom<AppointmentWire> for Appointment {
    type Error = AppointmentValidationError;

    fn try_from(wire: AppointmentWire) -> Result<Self, Self::Error> {
        let appointment = Appointment {
            id: wire.id,
            user_id: wire.user_id,
            title: wire.title,
            kind: wire.kind,
            date: wire.date,
            start_time: wire.start_time,
            end_time: wire.end_time,
            reminder_minutes: wire.reminder_minutes,
            memo: wire.memo,
            status: wire.status,
            group_id: wire.group_id,
            is_deleted: wire.is_deleted,
        };
        appointment.validate()?;
        Ok(appointment)
    }
}

/// Formats a date as ISO `YYYY-MM-DD`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parses an ISO `YYYY-MM-DD` date.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}
