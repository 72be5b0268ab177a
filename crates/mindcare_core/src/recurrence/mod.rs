//! Recurring-appointment expansion.
//!
//! # Responsibility
//! - Turn one base appointment plus a repeat rule into the additional
//!   appointment instances to persist.
//! - Tag every instance with the group id of its recurrence family.
//!
//! # Invariants
//! - Pure and synchronous: no I/O, no shared state.
//! - No generated instance falls on the base date.
//! - No two generated instances of one call share a date.
//! - Output size is bounded by `RecurrenceConfig` horizons times the number
//!   of selected weekdays or days of month.
//! - Malformed rules never loop or panic; the lenient entry point returns an
//!   empty expansion.

pub mod monthly;
pub mod rule;
pub mod weekly;

use crate::config::RecurrenceConfig;
use crate::model::appointment::{Appointment, AppointmentTemplate, GroupId};
use chrono::NaiveDate;
use log::{debug, warn};

pub use monthly::expand_monthly;
pub use rule::{RepeatKind, RepeatRule, RuleError};
pub use weekly::expand_weekly;

/// One appointment instance derived from a repeat rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedAppointment {
    /// Copy of the base template with `date` set to this occurrence.
    pub template: AppointmentTemplate,
    pub group_id: GroupId,
}

impl GeneratedAppointment {
    pub fn new(template: AppointmentTemplate, group_id: GroupId) -> Self {
        Self { template, group_id }
    }

    pub fn date(&self) -> NaiveDate {
        self.template.date
    }

    /// Mints a storable appointment with a fresh id.
    pub fn into_appointment(self) -> Appointment {
        Appointment::from_template(self.template, Some(self.group_id))
    }
}

/// Result of expanding one repeat rule.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Expansion {
    /// Group id to stamp on the base appointment; `None` for one-off
    /// appointments.
    pub base_group_id: Option<GroupId>,
    /// Additional instances, sorted by date.
    pub instances: Vec<GeneratedAppointment>,
}

impl Expansion {
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.instances.iter().map(GeneratedAppointment::date).collect()
    }
}

/// Expands `rule` relative to `template.date`, reporting malformed rules.
pub fn try_generate_repeat_appointments(
    template: &AppointmentTemplate,
    rule: &RepeatRule,
    config: &RecurrenceConfig,
) -> Result<Expansion, RuleError> {
    rule.validate()?;

    let expansion = match rule.kind {
        RepeatKind::None => Expansion::default(),
        RepeatKind::Weekly => Expansion {
            base_group_id: weekly::weekly_base_group_id(template, rule, config),
            instances: expand_weekly(template, rule, config),
        },
        RepeatKind::Monthly => Expansion {
            base_group_id: Some(GroupId::monthly(template.date, &template.title)),
            instances: expand_monthly(template, rule, config),
        },
    };

    debug!(
        "event=repeat_expand module=recurrence status=ok kind={} interval={} instances={}",
        kind_label(rule.kind),
        rule.interval,
        expansion.len()
    );
    Ok(expansion)
}

/// Expands `rule` relative to `template.date`.
///
/// Returns only the additional instances; the base appointment is persisted
/// by the caller. A malformed rule yields an empty expansion and a warning.
pub fn generate_repeat_appointments(
    template: &AppointmentTemplate,
    rule: &RepeatRule,
    config: &RecurrenceConfig,
) -> Expansion {
    match try_generate_repeat_appointments(template, rule, config) {
        Ok(expansion) => expansion,
        Err(err) => {
            warn!(
                "event=repeat_expand module=recurrence status=skipped kind={} error_code={}",
                kind_label(rule.kind),
                err.code()
            );
            Expansion::default()
        }
    }
}

fn kind_label(kind: RepeatKind) -> &'static str {
    match kind {
        RepeatKind::None => "none",
        RepeatKind::Weekly => "weekly",
        RepeatKind::Monthly => "monthly",
    }
}
