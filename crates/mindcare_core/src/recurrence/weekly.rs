//! Weekly expansion.

use crate::config::{RecurrenceConfig, WeeklyGroupScope};
use crate::model::appointment::{AppointmentTemplate, GroupId};
use crate::recurrence::rule::RepeatRule;
use crate::recurrence::GeneratedAppointment;
use chrono::{Datelike, Days, NaiveDate};
use std::collections::HashSet;

/// Expands a weekly rule into the additional instances after `template.date`.
///
/// Each selected weekday is walked independently: its first occurrence is the
/// next calendar day with that weekday, or one full interval later when the
/// base date already falls on it. Later occurrences are `7 * interval` days
/// apart, `config.weekly_occurrences` in total per weekday.
///
/// Expects a validated weekly rule. The result is sorted by date, holds no
/// duplicate dates and never contains the base date.
pub fn expand_weekly(
    template: &AppointmentTemplate,
    rule: &RepeatRule,
    config: &RecurrenceConfig,
) -> Vec<GeneratedAppointment> {
    let base = template.date;
    let base_weekday = weekday_index(base);
    let step_days = 7 * u64::from(rule.interval);
    let mut seen = HashSet::new();
    let mut instances = Vec::new();

    for &weekday in &rule.weekdays {
        let days_until = (u32::from(weekday) + 7 - base_weekday) % 7;
        let first_offset = if days_until == 0 {
            step_days
        } else {
            u64::from(days_until)
        };
        let group_id = weekly_group_id(template, config.weekly_group_scope, weekday);

        for step in 0..u64::from(config.weekly_occurrences) {
            let Some(offset) = step
                .checked_mul(step_days)
                .and_then(|days| days.checked_add(first_offset))
            else {
                break;
            };
            // Past the end of the representable calendar.
            let Some(date) = base.checked_add_days(Days::new(offset)) else {
                break;
            };
            if date == base || !seen.insert(date) {
                continue;
            }
            instances.push(GeneratedAppointment::new(
                template.on_date(date),
                group_id.clone(),
            ));
        }
    }

    instances.sort_by_key(GeneratedAppointment::date);
    instances
}

/// Group id the base appointment of a weekly rule is stamped with.
///
/// With per-weekday groups the base joins the series of its own weekday when
/// that weekday is selected, otherwise the series of the lowest selected one.
pub fn weekly_base_group_id(
    template: &AppointmentTemplate,
    rule: &RepeatRule,
    config: &RecurrenceConfig,
) -> Option<GroupId> {
    let base_weekday = weekday_index(template.date);
    let weekday = rule
        .weekdays
        .iter()
        .copied()
        .find(|weekday| u32::from(*weekday) == base_weekday)
        .or_else(|| rule.weekdays.first().copied())?;
    Some(weekly_group_id(template, config.weekly_group_scope, weekday))
}

fn weekly_group_id(
    template: &AppointmentTemplate,
    scope: WeeklyGroupScope,
    weekday: u8,
) -> GroupId {
    match scope {
        WeeklyGroupScope::PerWeekday => {
            GroupId::weekly(template.date, &template.title, Some(weekday))
        }
        WeeklyGroupScope::PerRule => GroupId::weekly(template.date, &template.title, None),
    }
}

/// 0 = Sunday .. 6 = Saturday.
fn weekday_index(date: NaiveDate) -> u32 {
    date.weekday().num_days_from_sunday()
}
