//! Appointment store contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide the create/get/list/delete primitives the appointment services
//!   are built on.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths call `Appointment::validate()` before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - `delete_by_id` is idempotent: a missing or already deleted row yields
//!   `Ok(false)`, never an error.

use crate::db::DbError;
use crate::model::appointment::{
    format_date, parse_date, Appointment, AppointmentId, AppointmentKind, AppointmentStatus,
    AppointmentValidationError, GroupId,
};
use chrono::NaiveTime;
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const APPOINTMENT_SELECT_SQL: &str = "SELECT
    id,
    user_id,
    title,
    type,
    date,
    start_time,
    end_time,
    reminder_minutes,
    memo,
    status,
    group_id,
    is_deleted
FROM appointments";

const TIME_FORMAT: &str = "%H:%M:%S";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for appointment persistence and queries.
#[derive(Debug)]
pub enum RepoError {
    Validation(AppointmentValidationError),
    Db(DbError),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => {
                write!(f, "invalid persisted appointment data: {message}")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<AppointmentValidationError> for RepoError {
    fn from(value: AppointmentValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Storage primitives for appointments.
pub trait AppointmentStore {
    /// Persists a new appointment and returns its id.
    fn create_appointment(&self, appointment: &Appointment) -> RepoResult<AppointmentId>;
    /// Gets one active appointment by id.
    fn get_appointment(&self, id: AppointmentId) -> RepoResult<Option<Appointment>>;
    /// Lists the active appointments of one user, ordered by date.
    fn list_by_user(&self, user_id: &str) -> RepoResult<Vec<Appointment>>;
    /// Deletes one appointment; returns whether a row was removed.
    fn delete_by_id(&self, id: AppointmentId) -> RepoResult<bool>;
}

impl<S: AppointmentStore + ?Sized> AppointmentStore for &S {
    fn create_appointment(&self, appointment: &Appointment) -> RepoResult<AppointmentId> {
        (**self).create_appointment(appointment)
    }

    fn get_appointment(&self, id: AppointmentId) -> RepoResult<Option<Appointment>> {
        (**self).get_appointment(id)
    }

    fn list_by_user(&self, user_id: &str) -> RepoResult<Vec<Appointment>> {
        (**self).list_by_user(user_id)
    }

    fn delete_by_id(&self, id: AppointmentId) -> RepoResult<bool> {
        (**self).delete_by_id(id)
    }
}

/// SQLite-backed appointment store.
pub struct SqliteAppointmentStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAppointmentStore<'conn> {
    /// Wraps a connection returned by `open_db` / `open_db_in_memory`.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl AppointmentStore for SqliteAppointmentStore<'_> {
    fn create_appointment(&self, appointment: &Appointment) -> RepoResult<AppointmentId> {
        appointment.validate()?;

        self.conn.execute(
            "INSERT INTO appointments (
                id,
                user_id,
                title,
                type,
                date,
                start_time,
                end_time,
                reminder_minutes,
                memo,
                status,
                group_id,
                is_deleted
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12);",
            params![
                appointment.id.to_string(),
                appointment.user_id.as_str(),
                appointment.title.as_str(),
                kind_to_db(appointment.kind),
                format_date(appointment.date),
                appointment.start_time.map(format_time),
                appointment.end_time.map(format_time),
                appointment.reminder_minutes,
                appointment.memo.as_deref(),
                status_to_db(appointment.status),
                appointment.group_id.as_ref().map(GroupId::as_str),
                i64::from(appointment.is_deleted),
            ],
        )?;

        Ok(appointment.id)
    }

    fn get_appointment(&self, id: AppointmentId) -> RepoResult<Option<Appointment>> {
        let mut stmt = self.conn.prepare(&format!(
            "{APPOINTMENT_SELECT_SQL}
             WHERE id = ?1
               AND is_deleted = 0;"
        ))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_appointment_row(row)?));
        }

        Ok(None)
    }

    fn list_by_user(&self, user_id: &str) -> RepoResult<Vec<Appointment>> {
        let mut stmt = self.conn.prepare(&format!(
            "{APPOINTMENT_SELECT_SQL}
             WHERE user_id = ?1
               AND is_deleted = 0
             ORDER BY date ASC, start_time ASC, id ASC;"
        ))?;

        let mut rows = stmt.query([user_id])?;
        let mut appointments = Vec::new();
        while let Some(row) = rows.next()? {
            appointments.push(parse_appointment_row(row)?);
        }

        Ok(appointments)
    }

    fn delete_by_id(&self, id: AppointmentId) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "UPDATE appointments
             SET
                is_deleted = 1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1
               AND is_deleted = 0;",
            [id.to_string()],
        )?;

        Ok(changed > 0)
    }
}

fn parse_appointment_row(row: &Row<'_>) -> RepoResult<Appointment> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{id_text}` in appointments.id"))
    })?;

    let type_text: String = row.get("type")?;
    let kind = parse_kind(&type_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid appointment type `{type_text}` in appointments.type"
        ))
    })?;

    let date_text: String = row.get("date")?;
    let date = parse_date(&date_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid date `{date_text}` in appointments.date"))
    })?;

    let start_time = parse_optional_time(row, "start_time")?;
    let end_time = parse_optional_time(row, "end_time")?;

    let status_text: String = row.get("status")?;
    let status = parse_status(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid status `{status_text}` in appointments.status"
        ))
    })?;

    let is_deleted = match row.get::<_, i64>("is_deleted")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid is_deleted value `{other}` in appointments.is_deleted"
            )));
        }
    };

    let appointment = Appointment {
        id,
        user_id: row.get("user_id")?,
        title: row.get("title")?,
        kind,
        date,
        start_time,
        end_time,
        reminder_minutes: row.get("reminder_minutes")?,
        memo: row.get("memo")?,
        status,
        group_id: row.get::<_, Option<String>>("group_id")?.map(GroupId::new),
        is_deleted,
    };
    appointment.validate()?;
    Ok(appointment)
}

fn parse_optional_time(row: &Row<'_>, column: &str) -> RepoResult<Option<NaiveTime>> {
    match row.get::<_, Option<String>>(column)? {
        Some(value) => NaiveTime::parse_from_str(&value, TIME_FORMAT)
            .map(Some)
            .map_err(|_| {
                RepoError::InvalidData(format!(
                    "invalid time `{value}` in appointments.{column}"
                ))
            }),
        None => Ok(None),
    }
}

fn format_time(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

fn kind_to_db(kind: AppointmentKind) -> &'static str {
    match kind {
        AppointmentKind::Counseling => "counseling",
        AppointmentKind::SelfCare => "self_care",
        AppointmentKind::Medical => "medical",
        AppointmentKind::Other => "other",
    }
}

fn parse_kind(value: &str) -> Option<AppointmentKind> {
    match value {
        "counseling" => Some(AppointmentKind::Counseling),
        "self_care" => Some(AppointmentKind::SelfCare),
        "medical" => Some(AppointmentKind::Medical),
        "other" => Some(AppointmentKind::Other),
        _ => None,
    }
}

fn status_to_db(status: AppointmentStatus) -> &'static str {
    match status {
        AppointmentStatus::Scheduled => "scheduled",
        AppointmentStatus::Completed => "completed",
        AppointmentStatus::Cancelled => "cancelled",
    }
}

fn parse_status(value: &str) -> Option<AppointmentStatus> {
    match value {
        "scheduled" => Some(AppointmentStatus::Scheduled),
        "completed" => Some(AppointmentStatus::Completed),
        "cancelled" => Some(AppointmentStatus::Cancelled),
        _ => None,
    }
}
