//! Appointment use-case service.
//!
//! # Responsibility
//! - Create an appointment together with its recurring instances.
//! - Resolve group deletion policies into single-appointment deletes.
//!
//! # Invariants
//! - The service never bypasses store validation.
//! - A deletion batch never aborts on a single failed delete; every
//!   candidate is attempted and only successful deletes are counted.
//! - Deleting an already removed appointment is a no-op, not an error.
//! - Log lines carry ids and counts only, never titles or memos.

use crate::config::RecurrenceConfig;
use crate::model::appointment::{
    parse_date, Appointment, AppointmentId, AppointmentTemplate, AppointmentValidationError,
    GroupId,
};
use crate::recurrence::{generate_repeat_appointments, RepeatRule};
use crate::repo::appointment_repo::{AppointmentStore, RepoError};
use chrono::NaiveDate;
use log::{info, warn};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Which members of a group a deletion targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupDeletePolicy {
    /// Every appointment of the group.
    All,
    /// Group members dated on or after `from_date`.
    Future { from_date: NaiveDate },
    /// Exactly one appointment by id; the group id is not consulted.
    Single { appointment_id: AppointmentId },
}

impl GroupDeletePolicy {
    fn label(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Future { .. } => "future",
            Self::Single { .. } => "single",
        }
    }
}

/// Errors for turning a wire deletion request into a policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupDeleteError {
    UnknownPolicy(String),
    MissingFromDate,
    InvalidFromDate(String),
    MissingAppointmentId,
    InvalidAppointmentId(String),
}

impl Display for GroupDeleteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownPolicy(value) => {
                write!(f, "unknown delete policy `{value}`; expected single|future|all")
            }
            Self::MissingFromDate => write!(f, "policy `future` requires from_date"),
            Self::InvalidFromDate(value) => {
                write!(f, "from_date `{value}` is not a YYYY-MM-DD date")
            }
            Self::MissingAppointmentId => write!(f, "policy `single` requires appointment_id"),
            Self::InvalidAppointmentId(value) => {
                write!(f, "appointment_id `{value}` is not a valid id")
            }
        }
    }
}

impl Error for GroupDeleteError {}

/// Wire shape of a group deletion request.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct GroupDeleteRequest {
    pub group_id: String,
    pub policy: String,
    #[serde(default)]
    pub from_date: Option<String>,
    #[serde(default)]
    pub appointment_id: Option<String>,
}

impl GroupDeleteRequest {
    /// Resolves `policy` and its required companion field.
    pub fn resolve_policy(&self) -> Result<GroupDeletePolicy, GroupDeleteError> {
        match self.policy.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(GroupDeletePolicy::All),
            "future" => {
                let raw = non_blank(self.from_date.as_deref())
                    .ok_or(GroupDeleteError::MissingFromDate)?;
                let from_date = parse_date(raw)
                    .ok_or_else(|| GroupDeleteError::InvalidFromDate(raw.to_string()))?;
                Ok(GroupDeletePolicy::Future { from_date })
            }
            "single" => {
                let raw = non_blank(self.appointment_id.as_deref())
                    .ok_or(GroupDeleteError::MissingAppointmentId)?;
                let appointment_id = Uuid::parse_str(raw)
                    .map_err(|_| GroupDeleteError::InvalidAppointmentId(raw.to_string()))?;
                Ok(GroupDeletePolicy::Single { appointment_id })
            }
            other => Err(GroupDeleteError::UnknownPolicy(other.to_string())),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// Counts reported after a group deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GroupDeleteOutcome {
    pub deleted_count: usize,
    /// Deletes that failed at the store and were skipped.
    pub failed_count: usize,
}

impl GroupDeleteOutcome {
    /// Human-readable summary for the caller.
    pub fn message(&self) -> String {
        match (self.deleted_count, self.failed_count) {
            (0, 0) => "No appointments deleted.".to_string(),
            (deleted, 0) => format!("Deleted {deleted} appointment(s)."),
            (deleted, failed) => {
                format!("Deleted {deleted} appointment(s); {failed} could not be deleted.")
            }
        }
    }
}

/// Appointments persisted by one create call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedSeries {
    pub base: Appointment,
    /// Generated instances that were stored, ordered by date.
    pub instances: Vec<Appointment>,
    /// Generated instances the store rejected.
    pub failed_count: usize,
}

impl CreatedSeries {
    pub fn group_id(&self) -> Option<&GroupId> {
        self.base.group_id.as_ref()
    }

    /// Distinct groups of the stored series, sorted.
    pub fn group_ids(&self) -> Vec<&GroupId> {
        let mut ids: Vec<&GroupId> = self
            .base
            .group_id
            .iter()
            .chain(self.instances.iter().filter_map(|a| a.group_id.as_ref()))
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }
}

/// Errors from appointment service operations.
#[derive(Debug)]
pub enum AppointmentServiceError {
    InvalidTemplate(AppointmentValidationError),
    InvalidDeleteRequest(GroupDeleteError),
    Repo(RepoError),
}

impl Display for AppointmentServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTemplate(err) => write!(f, "invalid appointment: {err}"),
            Self::InvalidDeleteRequest(err) => write!(f, "invalid delete request: {err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AppointmentServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidTemplate(err) => Some(err),
            Self::InvalidDeleteRequest(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for AppointmentServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::InvalidTemplate(err),
            other => Self::Repo(other),
        }
    }
}

impl From<AppointmentValidationError> for AppointmentServiceError {
    fn from(value: AppointmentValidationError) -> Self {
        Self::InvalidTemplate(value)
    }
}

impl From<GroupDeleteError> for AppointmentServiceError {
    fn from(value: GroupDeleteError) -> Self {
        Self::InvalidDeleteRequest(value)
    }
}

/// Appointment service facade over an `AppointmentStore`.
pub struct AppointmentService<S: AppointmentStore> {
    store: S,
    config: RecurrenceConfig,
}

impl<S: AppointmentStore> AppointmentService<S> {
    /// Creates a service with the default recurrence policy.
    pub fn new(store: S) -> Self {
        Self::with_config(store, RecurrenceConfig::default())
    }

    pub fn with_config(store: S, config: RecurrenceConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &RecurrenceConfig {
        &self.config
    }

    /// Creates the base appointment and every instance its rule generates.
    ///
    /// # Contract
    /// - A malformed rule creates only the base appointment.
    /// - Base creation failure aborts; instance failures are counted.
    pub fn create_with_repeat(
        &self,
        template: &AppointmentTemplate,
        rule: &RepeatRule,
    ) -> Result<CreatedSeries, AppointmentServiceError> {
        template.validate()?;

        let expansion = generate_repeat_appointments(template, rule, &self.config);
        let base = Appointment::from_template(template.clone(), expansion.base_group_id.clone());
        self.store.create_appointment(&base)?;

        let mut instances = Vec::with_capacity(expansion.len());
        let mut failed_count = 0;
        for generated in expansion.instances {
            let appointment = generated.into_appointment();
            match self.store.create_appointment(&appointment) {
                Ok(_) => instances.push(appointment),
                Err(err) => {
                    failed_count += 1;
                    warn!(
                        "event=appointment_create module=service status=error appointment_id={} error={}",
                        appointment.id, err
                    );
                }
            }
        }

        info!(
            "event=appointment_create module=service status=ok base_id={} instances={} failed={}",
            base.id,
            instances.len(),
            failed_count
        );
        Ok(CreatedSeries {
            base,
            instances,
            failed_count,
        })
    }

    pub fn get_appointment(
        &self,
        id: AppointmentId,
    ) -> Result<Option<Appointment>, AppointmentServiceError> {
        Ok(self.store.get_appointment(id)?)
    }

    pub fn list_for_user(&self, user_id: &str) -> Result<Vec<Appointment>, AppointmentServiceError> {
        Ok(self.store.list_by_user(user_id)?)
    }

    /// Lists the active members of one group, ordered by date.
    pub fn list_group(
        &self,
        user_id: &str,
        group_id: &GroupId,
    ) -> Result<Vec<Appointment>, AppointmentServiceError> {
        let mut members: Vec<_> = self
            .store
            .list_by_user(user_id)?
            .into_iter()
            .filter(|appointment| appointment.belongs_to_group(group_id))
            .collect();
        members.sort_by_key(|appointment| (appointment.date, appointment.start_time));
        Ok(members)
    }

    /// Deletes group members of `user_id` selected by `policy`.
    ///
    /// Only a failure to list candidates is returned as an error.
    pub fn delete_group(
        &self,
        user_id: &str,
        group_id: &GroupId,
        policy: GroupDeletePolicy,
    ) -> Result<GroupDeleteOutcome, AppointmentServiceError> {
        let candidates: Vec<AppointmentId> = match policy {
            GroupDeletePolicy::Single { appointment_id } => self
                .store
                .get_appointment(appointment_id)?
                .filter(|appointment| appointment.user_id == user_id)
                .map(|appointment| vec![appointment.id])
                .unwrap_or_default(),
            GroupDeletePolicy::All => self
                .store
                .list_by_user(user_id)?
                .into_iter()
                .filter(|appointment| appointment.belongs_to_group(group_id))
                .map(|appointment| appointment.id)
                .collect(),
            GroupDeletePolicy::Future { from_date } => self
                .store
                .list_by_user(user_id)?
                .into_iter()
                .filter(|appointment| {
                    appointment.belongs_to_group(group_id) && appointment.date >= from_date
                })
                .map(|appointment| appointment.id)
                .collect(),
        };

        let mut outcome = GroupDeleteOutcome::default();
        for id in candidates {
            match self.store.delete_by_id(id) {
                Ok(true) => outcome.deleted_count += 1,
                Ok(false) => {}
                Err(err) => {
                    outcome.failed_count += 1;
                    warn!(
                        "event=group_delete module=service status=error appointment_id={id} error={err}"
                    );
                }
            }
        }

        info!(
            "event=group_delete module=service status=ok policy={} deleted={} failed={}",
            policy.label(),
            outcome.deleted_count,
            outcome.failed_count
        );
        Ok(outcome)
    }

    /// Resolves a wire request and runs `delete_group`.
    pub fn delete_group_request(
        &self,
        user_id: &str,
        request: &GroupDeleteRequest,
    ) -> Result<GroupDeleteOutcome, AppointmentServiceError> {
        let policy = request.resolve_policy()?;
        self.delete_group(user_id, &GroupId::new(request.group_id.trim()), policy)
    }
}
